//! End-to-end runs of the pipeline against a temporary store

use approx::assert_relative_eq;
use std::fs;
use tempfile::tempdir;
use type_ratio::{
    EngineConfig, Level, Pipeline, PipelineConfig, Quality, Request, Sample, StoreConfig,
    WorkPartition,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config(root: &std::path::Path, budget: u64) -> PipelineConfig {
    PipelineConfig::default()
        .with_store(StoreConfig::at(root))
        .with_engine(EngineConfig::new(budget))
}

fn pairs(n: usize) -> Request<String> {
    Request::new(
        (0..n)
            .map(|i| Sample::new([format!("x{i}")], [format!("Y{i}")]))
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_single_sample_end_to_end() -> anyhow::Result<()> {
    init_tracing();
    let dir = tempdir()?;
    let mut pipeline = Pipeline::new(config(dir.path(), 100))?;
    let digest = pipeline.submit(&Request::new(vec![Sample::new(["a"], ["A"])])?)?;

    let report = pipeline.run()?;
    assert_eq!(report.computed.len(), 1);
    assert_eq!(report.computed[0].quality, Quality::Exact);
    assert_eq!(pipeline.cache().find_best(&digest), Some(report.computed[0]));

    let curve = pipeline.curve(&digest)?.unwrap();
    assert_eq!((curve.xx(), curve.yy()), (2, 1));
    assert_eq!(curve.row(2).unwrap(), &[0, 0, 1]);
    assert_relative_eq!(curve.median_pct(2).unwrap(), 50.0);

    // nothing left to do
    assert!(pipeline.run()?.computed.is_empty());
    Ok(())
}

#[test]
fn test_duplicate_requests_share_work() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let mut pipeline = Pipeline::new(config(dir.path(), 100))?;
    let a = pipeline.submit(&Request::new(vec![
        Sample::new(["a"], ["A"]),
        Sample::new(["b"], []),
    ])?)?;
    // same multiset of samples, relabelled and reordered
    let b = pipeline.submit(&Request::new(vec![
        Sample::new(["q"], []),
        Sample::new(["p"], ["P"]),
    ])?)?;
    assert_eq!(a, b);
    assert_eq!(pipeline.run()?.computed.len(), 1);
    Ok(())
}

#[test]
fn test_budget_increase_upgrades_approximation() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let strict = |budget| {
        config(dir.path(), budget)
            .with_engine(EngineConfig::new(budget).with_exact_preference(1))
    };

    // 6! = 720 orderings exceed a budget of 200
    let mut pipeline = Pipeline::new(strict(200))?;
    let digest = pipeline.submit(&pairs(6))?;
    let first = pipeline.run()?;
    assert_eq!(first.computed[0].quality, Quality::Approximate(200));

    let mut pipeline = Pipeline::new(strict(400))?;
    let second = pipeline.run()?;
    assert_eq!(second.computed[0].quality, Quality::Approximate(400));
    assert_eq!(second.reconcile.deleted, first.computed);

    // a smaller budget is already satisfied
    let mut pipeline = Pipeline::new(strict(300))?;
    assert!(pipeline.run()?.computed.is_empty());

    // a large enough budget switches to exact enumeration
    let mut pipeline = Pipeline::new(strict(720))?;
    let third = pipeline.run()?;
    assert_eq!(third.computed[0].quality, Quality::Exact);
    let best = pipeline.cache().find_best(&digest).unwrap();
    assert_eq!(best.quality, Quality::Exact);
    assert_eq!(
        pipeline.cache().load(&digest)?.unwrap().histogram.total(),
        6 * 720
    );
    Ok(())
}

#[test]
fn test_malformed_artifact_is_recomputed() -> anyhow::Result<()> {
    init_tracing();
    let dir = tempdir()?;
    let mut pipeline = Pipeline::new(config(dir.path(), 100))?;
    let digest = pipeline.submit(&pairs(3))?;
    let name = pipeline.run()?.computed[0];

    fs::write(pipeline.store().artifact_path(&name), "garbage\n")?;
    let report = pipeline.run()?;
    assert_eq!(report.computed, vec![name]);
    assert!(report.reconcile.malformed.is_empty());

    let curve = pipeline.curve(&digest)?.unwrap();
    assert_eq!(curve.total(6), Some(6));
    Ok(())
}

#[test]
fn test_partitions_cover_all_work() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let pipeline = Pipeline::new(config(dir.path(), 50))?;
    let mut digests = (1..=5)
        .map(|n| pipeline.submit(&pairs(n)))
        .collect::<type_ratio::Result<Vec<_>>>()?;
    digests.sort();

    // every process sees the same snapshot and takes a disjoint share
    let mut shares = Vec::new();
    for part in 1..=3 {
        shares.extend(pipeline.store().pending(50, WorkPartition::new(part, 3)?)?);
    }
    shares.sort();
    assert_eq!(shares, digests);

    let share = pipeline.store().pending(50, WorkPartition::new(1, 3)?)?;
    let mut worker =
        Pipeline::new(config(dir.path(), 50).with_partition(WorkPartition::new(1, 3)?))?;
    let computed: Vec<_> = worker.run()?.computed.iter().map(|n| n.digest).collect();
    assert_eq!(computed, share);

    // a fresh pipeline indexes what is already stored
    let reader = Pipeline::new(config(dir.path(), 50))?;
    for digest in &digests {
        assert_eq!(reader.curve(digest)?.is_some(), share.contains(digest));
    }
    Ok(())
}

#[test]
fn test_band_queries() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let mut pipeline = Pipeline::new(config(dir.path(), 1000))?;
    let digest = pipeline.submit(&pairs(4))?;
    pipeline.run()?;

    let curve = pipeline.curve(&digest)?.unwrap();
    let band = Level::central(0.95)?;
    // with one token from each universe per sample, even x is always half
    for x in [2, 4, 6, 8] {
        assert_relative_eq!(curve.low_pct(x, band).unwrap(), 50.0);
        assert_relative_eq!(curve.up_pct(x, band).unwrap(), 50.0);
        assert_relative_eq!(curve.mean_pct(x).unwrap(), 50.0);
    }
    assert_eq!(curve.low_pct(0, band), Some(0.0));
    assert_eq!(curve.up_pct(0, band), Some(100.0));
    assert_eq!(curve.mean_pct(1), None);
    Ok(())
}

#[test]
fn test_config_serde() -> anyhow::Result<()> {
    let config = PipelineConfig::default()
        .with_engine(EngineConfig::new(123).with_seed(9))
        .with_partition(WorkPartition::new(1, 2)?);
    let json = serde_json::to_string(&config)?;
    let back: PipelineConfig = serde_json::from_str(&json)?;
    assert_eq!(back, config);
    Ok(())
}

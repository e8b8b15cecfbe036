//! Sparse text codec for histogram rows
//!
//! Each row is written as `first last v_first ... v_{last-1}`: only the
//! half-open range `[first, last)` is stored and everything outside it is
//! zero. Writers trim leading and trailing zeros; an all-zero row is
//! `0 0`. An artifact is exactly `xx + 1` such lines.

use crate::{Error, JointHistogram, Result};
use std::io::{BufRead, Write};

/// One row in sparse form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRow {
    pub first: usize,
    pub last: usize,
    pub values: Vec<u64>,
}

/// Encode a row, trimming zeros at both ends
pub fn encode_row(row: &[u64]) -> EncodedRow {
    let first = row.iter().position(|&v| v != 0);
    match first {
        None => EncodedRow {
            first: 0,
            last: 0,
            values: Vec::new(),
        },
        Some(first) => {
            let last = row.iter().rposition(|&v| v != 0).unwrap_or(first) + 1;
            EncodedRow {
                first,
                last,
                values: row[first..last].to_vec(),
            }
        }
    }
}

impl EncodedRow {
    /// Check the range against a row of `width` entries
    fn check(&self, width: usize) -> std::result::Result<(), String> {
        if self.first > self.last {
            return Err(format!("first {} > last {}", self.first, self.last));
        }
        if self.last > width {
            return Err(format!("last {} exceeds row width {width}", self.last));
        }
        if self.values.len() != self.last - self.first {
            return Err(format!(
                "expected {} values, got {}",
                self.last - self.first,
                self.values.len()
            ));
        }
        Ok(())
    }

    /// Rebuild the full row of `width` entries
    pub fn decode(&self, width: usize) -> Result<Vec<u64>> {
        self.check(width).map_err(|reason| Error::malformed("row", reason))?;
        let mut row = vec![0; width];
        row[self.first..self.last].copy_from_slice(&self.values);
        Ok(row)
    }

    /// Parse one text line
    pub fn parse(line: &str) -> Result<Self> {
        let mut values = line.split_ascii_whitespace().map(|tok| {
            tok.parse::<u64>()
                .map_err(|e| Error::malformed("row", format!("bad integer {tok:?}: {e}")))
        });
        let mut bound = || -> Result<usize> {
            let v = values
                .next()
                .ok_or_else(|| Error::malformed("row", "missing range"))??;
            usize::try_from(v).map_err(|_| Error::malformed("row", format!("range {v} too large")))
        };
        let first = bound()?;
        let last = bound()?;
        let values = values.collect::<Result<Vec<u64>>>()?;
        Ok(Self {
            first,
            last,
            values,
        })
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        write!(out, "{} {}", self.first, self.last)?;
        for v in &self.values {
            write!(out, " {v}")?;
        }
        writeln!(out)
    }
}

/// Decode a row from its text line
pub fn decode_row(line: &str, width: usize) -> Result<Vec<u64>> {
    EncodedRow::parse(line)?.decode(width)
}

/// Write every row of the histogram in sparse form
pub fn write_histogram<W: Write>(histogram: &JointHistogram, out: &mut W) -> std::io::Result<()> {
    for row in histogram.rows() {
        encode_row(row).write_to(out)?;
    }
    Ok(())
}

/// Read a histogram written by [`write_histogram`]
///
/// With `shape = Some((xx, yy))` the row count and widths are checked
/// against the request; with `None` only the per-line invariants are
/// checked and the shape is inferred. Every failure is reported as
/// [`Error::MalformedArtifact`] naming `name`.
pub fn read_histogram<R: BufRead>(
    input: R,
    name: &str,
    shape: Option<(usize, usize)>,
) -> Result<JointHistogram> {
    let mut encoded = Vec::new();
    for (lineno, line) in input.lines().enumerate() {
        let line = line.map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => Error::malformed(name, "not valid UTF-8"),
            _ => Error::Io(e),
        })?;
        let row = EncodedRow::parse(&line).map_err(|e| match e {
            Error::MalformedArtifact { reason, .. } => {
                Error::malformed(name, format!("line {}: {reason}", lineno + 1))
            }
            other => other,
        })?;
        encoded.push(row);
    }

    let (xx, yy) = match shape {
        Some(shape) => shape,
        None => {
            if encoded.is_empty() {
                return Err(Error::malformed(name, "no rows"));
            }
            let widest = encoded.iter().map(|r| r.last).max().unwrap_or(0);
            (encoded.len() - 1, widest.saturating_sub(1))
        }
    };
    if encoded.len() != xx + 1 {
        return Err(Error::malformed(
            name,
            format!("expected {} rows, got {}", xx + 1, encoded.len()),
        ));
    }

    let rows = encoded
        .iter()
        .enumerate()
        .map(|(x, row)| {
            row.decode(yy + 1).map_err(|e| match e {
                Error::MalformedArtifact { reason, .. } => {
                    Error::malformed(name, format!("row {x}: {reason}"))
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    JointHistogram::from_rows(xx, yy, rows).map_err(|e| Error::malformed(name, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_trims() {
        let e = encode_row(&[0, 0, 3, 0, 5, 0]);
        assert_eq!(e.first, 2);
        assert_eq!(e.last, 5);
        assert_eq!(e.values, vec![3, 0, 5]);
        assert_eq!(e.decode(6).unwrap(), vec![0, 0, 3, 0, 5, 0]);
    }

    #[test]
    fn test_all_zero_row() {
        let e = encode_row(&[0, 0, 0]);
        assert_eq!((e.first, e.last), (0, 0));
        assert!(e.values.is_empty());
        assert_eq!(e.decode(3).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn test_text_line() {
        let mut buf = Vec::new();
        encode_row(&[0, 7, 1]).write_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "1 3 7 1\n");
        assert_eq!(decode_row("1 3 7 1", 3).unwrap(), vec![0, 7, 1]);
        // zeros inside the range are legal
        assert_eq!(decode_row("0 3 0 7 0", 3).unwrap(), vec![0, 7, 0]);
    }

    #[test]
    fn test_decode_rejects_bad_ranges() {
        assert!(decode_row("2 1", 3).is_err());
        assert!(decode_row("0 4 1 1 1 1", 3).is_err());
        assert!(decode_row("0 2 1", 3).is_err());
        assert!(decode_row("0", 3).is_err());
        assert!(decode_row("0 1 x", 3).is_err());
        assert!(decode_row("-1 1 0", 3).is_err());
    }

    #[test]
    fn test_histogram_roundtrip_text() {
        let mut h = JointHistogram::zeros(2, 1);
        h.increment(2, 1);
        let mut buf = Vec::new();
        write_histogram(&h, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf.clone()).unwrap(), "0 0\n0 0\n1 2 1\n");

        let back = read_histogram(&buf[..], "d", Some((2, 1))).unwrap();
        assert_eq!(back, h);
        let inferred = read_histogram(&buf[..], "d", None).unwrap();
        assert_eq!(inferred, h);
    }

    #[test]
    fn test_read_reports_name() {
        let err = read_histogram(&b"0 0\n"[..], "abc.5", Some((2, 1))).unwrap_err();
        match err {
            Error::MalformedArtifact { name, reason } => {
                assert_eq!(name, "abc.5");
                assert!(reason.contains("expected 3 rows"));
            }
            other => panic!("unexpected error {other:?}"),
        }

        let err = read_histogram(&b"0 0\n3 1\n"[..], "abc", Some((1, 1))).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("row 1"));
    }
}

//! Fortran unformatted sequential records.
//!
//! Each record is a 4-byte little-endian byte count, the payload, and the
//! same byte count again. A short read anywhere is reported as
//! [`TableError::Corrupt`], as is a trailing marker that disagrees with the
//! leading one.

use std::io::{self, Read};

use crate::error::TableError;

// ── Primitive readers ───────────────────────────────────────────

fn read_exact(r: &mut dyn Read, buf: &mut [u8], what: &str) -> Result<(), TableError> {
    r.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => TableError::Corrupt {
            reason: format!("unexpected end of file reading {what}"),
        },
        _ => TableError::Io(e),
    })
}

/// Read a little-endian u32 record marker.
fn read_marker(r: &mut dyn Read) -> Result<u32, TableError> {
    let mut buf = [0u8; 4];
    read_exact(r, &mut buf, "record marker")?;
    Ok(u32::from_le_bytes(buf))
}

/// Sequential reader over Fortran records.
pub struct FortranReader<R: Read> {
    inner: R,
    records: usize,
}

impl<R: Read> FortranReader<R> {
    /// Wrap a byte source.
    pub fn new(inner: R) -> Self {
        Self { inner, records: 0 }
    }

    /// Number of records read so far.
    pub fn records_read(&self) -> usize {
        self.records
    }

    /// Read one record's payload.
    pub fn read_record(&mut self) -> Result<Vec<u8>, TableError> {
        let index = self.records;
        let len = read_marker(&mut self.inner)? as usize;
        let mut payload = vec![0u8; len];
        read_exact(&mut self.inner, &mut payload, &format!("record {index}"))?;
        let trailer = read_marker(&mut self.inner)? as usize;
        if trailer != len {
            return Err(TableError::Corrupt {
                reason: format!("record {index}: leading length {len}, trailing length {trailer}"),
            });
        }
        self.records += 1;
        Ok(payload)
    }

    /// Read a record of little-endian `i32`s.
    pub fn read_i32s(&mut self) -> Result<Vec<i32>, TableError> {
        let payload = self.read_record()?;
        if payload.len() % 4 != 0 {
            return Err(TableError::Corrupt {
                reason: format!("record of {} bytes is not a vector of i32", payload.len()),
            });
        }
        Ok(payload
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// Read a record of little-endian `f64`s.
    pub fn read_f64s(&mut self) -> Result<Vec<f64>, TableError> {
        let payload = self.read_record()?;
        if payload.len() % 8 != 0 {
            return Err(TableError::Corrupt {
                reason: format!("record of {} bytes is not a vector of f64", payload.len()),
            });
        }
        Ok(payload
            .chunks_exact(8)
            .map(|c| {
                let mut b = [0u8; 8];
                b.copy_from_slice(c);
                f64::from_le_bytes(b)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ramfield_test_utils::fixtures::write_record;

    fn records(payloads: &[&[u8]]) -> Vec<u8> {
        let mut out = Vec::new();
        for p in payloads {
            write_record(&mut out, p).unwrap();
        }
        out
    }

    #[test]
    fn reads_typed_records() {
        let ints: Vec<u8> = [2i32, 3].iter().flat_map(|v| v.to_le_bytes()).collect();
        let reals: Vec<u8> = [0.5f64, -1.0].iter().flat_map(|v| v.to_le_bytes()).collect();
        let bytes = records(&[&ints, &reals]);
        let mut r = FortranReader::new(bytes.as_slice());
        assert_eq!(r.read_i32s().unwrap(), vec![2, 3]);
        assert_eq!(r.read_f64s().unwrap(), vec![0.5, -1.0]);
        assert_eq!(r.records_read(), 2);
        assert!(matches!(r.read_record(), Err(TableError::Corrupt { .. })));
    }

    #[test]
    fn truncated_payload_is_corrupt() {
        let mut bytes = records(&[&[1, 2, 3, 4, 5, 6, 7, 8]]);
        bytes.truncate(9);
        let mut r = FortranReader::new(bytes.as_slice());
        assert!(matches!(r.read_f64s(), Err(TableError::Corrupt { .. })));
    }

    #[test]
    fn mismatched_markers_are_corrupt() {
        let mut bytes = records(&[&[0; 8]]);
        let n = bytes.len();
        bytes[n - 4] = 9;
        let mut r = FortranReader::new(bytes.as_slice());
        let err = r.read_record().unwrap_err();
        assert!(err.to_string().contains("trailing length 9"), "{err}");
    }

    #[test]
    fn odd_sized_record_is_not_f64() {
        let bytes = records(&[&[0; 12]]);
        let mut r = FortranReader::new(bytes.as_slice());
        assert!(matches!(r.read_f64s(), Err(TableError::Corrupt { .. })));
    }
}

//! zlib compression for order data.
//!
//! EBICS compresses order data with zlib (RFC 1950) before encryption.
//! Decompression is bounded: a payload that inflates past the configured
//! limit is rejected rather than allowed to exhaust memory.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::error::PayloadError;

/// Compress `data` with the default zlib level.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, PayloadError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| PayloadError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| PayloadError::Compression(e.to_string()))
}

/// Inflate `data`, failing if the output would exceed `max_size` bytes.
pub fn decompress(data: &[u8], max_size: usize) -> Result<Vec<u8>, PayloadError> {
    let limit = (max_size as u64).saturating_add(1);
    let mut decoder = ZlibDecoder::new(data).take(limit);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| PayloadError::Decompression(e.to_string()))?;

    if out.len() > max_size {
        return Err(PayloadError::OrderDataTooLarge { limit: max_size });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let data = b"<Document><BkToCstmrStmt/></Document>".repeat(50);
        let packed = compress(&data).unwrap();
        assert!(packed.len() < data.len());
        assert_eq!(decompress(&packed, 1 << 20).unwrap(), data);
    }

    #[test]
    fn test_empty_input_roundtrip() {
        let packed = compress(b"").unwrap();
        assert!(!packed.is_empty());
        assert!(decompress(&packed, 16).unwrap().is_empty());
    }

    #[test]
    fn test_bound_is_enforced() {
        let packed = compress(&vec![0u8; 4096]).unwrap();
        assert_eq!(
            decompress(&packed, 4095),
            Err(PayloadError::OrderDataTooLarge { limit: 4095 })
        );
        assert_eq!(decompress(&packed, 4096).unwrap().len(), 4096);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            decompress(b"definitely not zlib", 1024),
            Err(PayloadError::Decompression(_))
        ));
    }
}

//! Decoding of base64-packed embedding vectors.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Bytes per packed `f32` component.
pub const BYTES_PER_COMPONENT: usize = 4;

/// Decode a base64 embedding into raw bytes.
pub fn decode_base64_bytes(encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| EmbeddingError::InvalidBase64(e.to_string()))
}

/// Decode a base64 embedding into little-endian `f32` components.
pub fn decode_base64_embedding(encoded: &str) -> Result<Embedding> {
    let bytes = decode_base64_bytes(encoded)?;
    if bytes.len() % BYTES_PER_COMPONENT != 0 {
        return Err(EmbeddingError::InvalidBase64(format!(
            "{} bytes is not a whole number of f32 components",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(BYTES_PER_COMPONENT)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn encode(values: &[f32]) -> String {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        STANDARD.encode(bytes)
    }

    #[test]
    fn test_decode_packed_floats() {
        let encoded = encode(&[1.0, -0.5, 0.125]);
        assert_eq!(decode_base64_embedding(&encoded).unwrap(), vec![1.0, -0.5, 0.125]);
    }

    #[test]
    fn test_decode_known_literal() {
        // 1.0f32 little-endian is 00 00 80 3f.
        assert_eq!(decode_base64_embedding("AACAPw==").unwrap(), vec![1.0]);
    }

    #[test]
    fn test_reject_invalid_base64() {
        assert!(matches!(
            decode_base64_embedding("not base64!"),
            Err(EmbeddingError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_reject_partial_component() {
        let encoded = STANDARD.encode([1u8, 2, 3, 4, 5, 6]);
        assert_eq!(decode_base64_bytes(&encoded).unwrap().len(), 6);
        assert!(decode_base64_embedding(&encoded).is_err());
    }
}

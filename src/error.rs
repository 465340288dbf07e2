//! Error taxonomy untuk codec
//!
//! Semua kegagalan dikembalikan ke caller sebagai `Result`,
//! tidak ada retry atau recovery internal.

use std::io;

use thiserror::Error;

/// Result alias untuk semua operasi codec
pub type Result<T> = std::result::Result<T, CodecError>;

/// Kegagalan pada operasi encode/decode
#[derive(Debug, Error)]
pub enum CodecError {
    /// Write melebihi sisa kapasitas buffer (caller salah menghitung size)
    #[error("buffer overflow: need {needed} bytes, {remaining} remaining")]
    BufferOverflow { needed: usize, remaining: usize },

    /// Byte range tidak konsisten saat read
    #[error("codec corruption: {0}")]
    CodecCorruption(#[from] Corruption),

    /// Buffer berakhir di tengah field envelope
    #[error("truncated message at `{field}`: need {needed} bytes, {remaining} remaining")]
    TruncatedMessage {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    /// Bytes yang ditulis berbeda dari hasil `size_of`
    #[error("encoding mismatch: size_of reported {expected} bytes, wrote {actual}")]
    EncodingMismatch { expected: usize, actual: usize },

    /// Versi wire format tidak dikenal
    #[error("unsupported wire format version {0}")]
    UnsupportedVersion(u8),

    /// Panjang tidak muat di prefix 4-byte
    #[error("length {0} does not fit a 4-byte length prefix")]
    LengthTooLarge(usize),

    /// Gagal mengalokasikan batch buffer
    #[error("failed to allocate batch buffer: {0}")]
    Allocation(#[from] io::Error),
}

impl CodecError {
    /// True jika error berasal dari data yang rusak/terpotong,
    /// bukan dari kesalahan sizing di sisi caller.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::CodecCorruption(_) | Self::TruncatedMessage { .. } | Self::UnsupportedVersion(_)
        )
    }
}

/// Detail korupsi pada level primitive
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Corruption {
    #[error("negative length prefix {0}")]
    NegativeLength(i32),

    #[error("length prefix {len} exceeds {remaining} remaining bytes")]
    LengthOutOfBounds { len: usize, remaining: usize },

    #[error("need {needed} bytes, {remaining} remaining")]
    Underflow { needed: usize, remaining: usize },

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    #[error("duplicate map key {0:?}")]
    DuplicateKey(String),

    #[error("bad magic {0:#010x}")]
    BadMagic(u32),

    /// Topic di wire valid secara byte, tapi kosong
    #[error("envelope topic is empty")]
    EmptyTopic,
}

/// Kegagalan saat membangun envelope
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    #[error("envelope topic must not be empty")]
    EmptyTopic,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corruption_classification() {
        let overflow = CodecError::BufferOverflow {
            needed: 8,
            remaining: 4,
        };
        assert!(!overflow.is_corruption());

        let truncated = CodecError::TruncatedMessage {
            field: "body",
            needed: 10,
            remaining: 3,
        };
        assert!(truncated.is_corruption());

        let corrupt: CodecError = Corruption::InvalidUtf8.into();
        assert!(corrupt.is_corruption());
    }

    #[test]
    fn test_error_messages() {
        let err = CodecError::EncodingMismatch {
            expected: 47,
            actual: 46,
        };
        assert_eq!(
            err.to_string(),
            "encoding mismatch: size_of reported 47 bytes, wrote 46"
        );
    }
}

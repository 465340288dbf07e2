//! Wire format versions
//!
//! Layout positional tidak punya margin kompatibilitas. `Versioned`
//! menambahkan marker di depan envelope:
//!
//! ```text
//! ┌────────────────┬───────────┬──────────────────────────┐
//! │ magic "HRME"   │ version   │ legacy positional layout │
//! │ 4 bytes        │ 1 byte    │ ...                      │
//! └────────────────┴───────────┴──────────────────────────┘
//! ```
//!
//! `Legacy` tetap default dan byte-compatible dengan producer lama.

use crate::core::PrimitiveCodec;
use crate::error::{CodecError, Corruption, Result};

pub const MAGIC: u32 = 0x4852_4D45; // "HRME"
pub const VERSION: u8 = 1;
pub const MARKER_SIZE: usize = 5;

/// Versi layout envelope yang dibaca/ditulis codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    /// Positional murni, tanpa marker
    #[default]
    Legacy,
    /// Magic + version byte, lalu layout legacy
    Versioned,
}

impl WireFormat {
    /// Bytes marker di depan envelope
    #[inline(always)]
    pub fn marker_size(self) -> usize {
        match self {
            Self::Legacy => 0,
            Self::Versioned => MARKER_SIZE,
        }
    }

    pub(crate) fn write_marker<B>(self, codec: &mut PrimitiveCodec<B>) -> Result<()>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        match self {
            Self::Legacy => Ok(()),
            Self::Versioned => {
                codec.write_i32(MAGIC as i32)?;
                codec.write_u8(VERSION)
            }
        }
    }

    pub(crate) fn read_marker<B: AsRef<[u8]>>(self, codec: &mut PrimitiveCodec<B>) -> Result<()> {
        match self {
            Self::Legacy => Ok(()),
            Self::Versioned => {
                let magic = codec.read_i32()? as u32;
                if magic != MAGIC {
                    return Err(Corruption::BadMagic(magic).into());
                }
                match codec.read_u8()? {
                    VERSION => Ok(()),
                    other => Err(CodecError::UnsupportedVersion(other)),
                }
            }
        }
    }
}

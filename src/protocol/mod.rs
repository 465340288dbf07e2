//! Protocol Layer: Message Envelope Encoding
//!
//! Prinsip desain:
//! - Positional layout: tidak ada field tag, urutan field = kontrak
//! - Exact sizing: `size_of` == bytes yang ditulis, buffer bisa pre-allocated
//! - All-or-nothing: decode gagal tanpa envelope setengah jadi

mod batch;
mod codec;
mod envelope;
mod wire;

pub use batch::{BatchDecoder, BatchEncoder, EncodedBatch};
pub use codec::EnvelopeCodec;
pub use envelope::{now_ms, Envelope, EnvelopeBuilder, EnvelopeParts, Properties};
pub use wire::{WireFormat, MAGIC, MARKER_SIZE, VERSION};

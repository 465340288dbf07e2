//! Hermes Codec - Zero-Allocation Message Envelope Encoding
//!
//! Arsitektur:
//! - Primitive Codec: typed cursor di atas satu byte buffer
//! - Envelope Codec: layout positional, exact `size_of`
//! - Batch: satu buffer pre-sized untuk N envelope
//!
//! ```
//! use hermes_codec::core::PrimitiveCodec;
//! use hermes_codec::protocol::{Envelope, EnvelopeCodec};
//!
//! let envelope = Envelope::builder("orders")
//!     .key("customer-42")
//!     .partition("p0")
//!     .born_time(1_000)
//!     .ack(true)
//!     .body(b"payload".to_vec())
//!     .property("trace", "abc")
//!     .build()
//!     .unwrap();
//!
//! let codec = EnvelopeCodec::legacy();
//! let mut buf = PrimitiveCodec::new(vec![0u8; codec.size_of(&envelope)]);
//! codec.write(&envelope, &mut buf).unwrap();
//!
//! buf.flip();
//! assert_eq!(codec.read(&mut buf).unwrap(), envelope);
//! ```

pub mod core;
pub mod error;
pub mod protocol;
#[doc(hidden)]
pub mod workload;

pub use error::{CodecError, Corruption, EnvelopeError, Result};

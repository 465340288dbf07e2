//! Core module: Primitive Codec dan pre-sized Batch Buffer
//!
//! Prinsip desain:
//! - No-Growth: kapasitas ditentukan sebelum write, tidak pernah resize
//! - Cursor-based: setiap operasi maju persis sebanyak bytes yang diproses
//! - Direct buffer: batch besar bisa di-back oleh anonymous mmap

mod batch_buffer;
pub mod primitive;

pub use batch_buffer::{BatchBuffer, BufferKind};
pub use primitive::PrimitiveCodec;

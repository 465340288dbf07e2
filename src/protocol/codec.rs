//! Message Envelope Codec
//!
//! Layout positional (tanpa field tag), urutan tetap:
//! ┌──────────────────────────────────────────────────────┐
//! │ [marker]       0 atau 5 bytes, tergantung WireFormat │
//! │ topic          i32 len + UTF-8                       │
//! │ key            i32 len + UTF-8                       │
//! │ partition      i32 len + UTF-8                       │
//! │ born_time      i64                                   │
//! │ ack            1 byte                                │
//! │ body           i32 len + raw bytes                   │
//! │ properties     i32 count + (key, value)*             │
//! └──────────────────────────────────────────────────────┘
//!
//! `size_of` selalu sama persis dengan jumlah bytes yang ditulis
//! `write`, sehingga caller bisa pre-allocate satu buffer untuk N
//! envelope tanpa resize.

use tracing::warn;

use super::envelope::{Envelope, EnvelopeParts};
use super::wire::WireFormat;
use crate::core::primitive::{self, PrimitiveCodec, BOOL_SIZE, I64_SIZE};
use crate::error::{CodecError, Corruption, Result};

/// Encoder/decoder envelope, stateless dan `Copy`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvelopeCodec {
    format: WireFormat,
}

impl EnvelopeCodec {
    pub const fn new(format: WireFormat) -> Self {
        Self { format }
    }

    /// Codec tanpa marker, kompatibel dengan producer lama
    pub const fn legacy() -> Self {
        Self::new(WireFormat::Legacy)
    }

    pub const fn versioned() -> Self {
        Self::new(WireFormat::Versioned)
    }

    #[inline(always)]
    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// Jumlah bytes persis yang akan ditulis `write` untuk envelope ini
    ///
    /// Pure: tidak menyentuh buffer apa pun, bisa dipanggil sebelum
    /// buffer dialokasikan.
    #[inline]
    pub fn size_of(&self, envelope: &Envelope) -> usize {
        self.size_of_parts(envelope, envelope.body())
    }

    /// Seperti [`size_of`](Self::size_of), dengan body yang diberikan
    /// terpisah dari metadata envelope
    pub fn size_of_parts(&self, envelope: &Envelope, body: &[u8]) -> usize {
        self.format.marker_size()
            + primitive::sized_str(envelope.topic())
            + primitive::sized_str(envelope.key())
            + primitive::sized_str(envelope.partition())
            + I64_SIZE
            + BOOL_SIZE
            + primitive::sized_bytes(body)
            + primitive::sized_string_map(envelope.properties())
    }

    /// Ukuran envelope terkecil yang mungkin ada di wire: semua string,
    /// body dan property map kosong
    #[inline(always)]
    pub fn min_size(&self) -> usize {
        self.format.marker_size()
            + 3 * primitive::LEN_PREFIX_SIZE
            + I64_SIZE
            + BOOL_SIZE
            + 2 * primitive::LEN_PREFIX_SIZE
    }

    /// Tulis envelope di posisi cursor. Returns bytes yang ditulis.
    ///
    /// Kapasitas dicek di depan: buffer yang terlalu kecil gagal dengan
    /// `BufferOverflow` tanpa menulis satu byte pun.
    #[inline]
    pub fn write<B>(&self, envelope: &Envelope, codec: &mut PrimitiveCodec<B>) -> Result<usize>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        self.write_parts(envelope, envelope.body(), codec)
    }

    /// Seperti [`write`](Self::write), dengan body terpisah
    pub fn write_parts<B>(
        &self,
        envelope: &Envelope,
        body: &[u8],
        codec: &mut PrimitiveCodec<B>,
    ) -> Result<usize>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        let expected = self.size_of_parts(envelope, body);
        codec.ensure_remaining(expected)?;

        let start = codec.position();
        if let Err(e) = self.write_fields(envelope, body, codec) {
            codec.restore(start);
            return Err(e);
        }

        let actual = codec.position() - start;
        if actual != expected {
            warn!(expected, actual, topic = envelope.topic(), "envelope size mismatch");
            codec.restore(start);
            return Err(CodecError::EncodingMismatch { expected, actual });
        }
        Ok(actual)
    }

    fn write_fields<B>(
        &self,
        envelope: &Envelope,
        body: &[u8],
        codec: &mut PrimitiveCodec<B>,
    ) -> Result<()>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        self.format.write_marker(codec)?;
        codec.write_str(envelope.topic())?;
        codec.write_str(envelope.key())?;
        codec.write_str(envelope.partition())?;
        codec.write_i64(envelope.born_time())?;
        codec.write_bool(envelope.ack())?;
        codec.write_bytes(body)?;
        codec.write_string_map(envelope.properties())
    }

    /// Baca satu envelope dari posisi cursor
    ///
    /// All-or-nothing: envelope hanya dirakit setelah semua field
    /// terbaca. Jika gagal, cursor kembali ke awal envelope.
    pub fn read<B: AsRef<[u8]>>(&self, codec: &mut PrimitiveCodec<B>) -> Result<Envelope> {
        let start = codec.position();
        match self.read_fields(codec) {
            Ok(parts) => Ok(Envelope::from_parts(parts)),
            Err(e) => {
                codec.restore(start);
                Err(e)
            }
        }
    }

    fn read_fields<B: AsRef<[u8]>>(&self, codec: &mut PrimitiveCodec<B>) -> Result<EnvelopeParts> {
        self.format
            .read_marker(codec)
            .map_err(|e| truncated("marker", e))?;
        let topic = codec.read_string().map_err(|e| truncated("topic", e))?;
        if topic.is_empty() {
            return Err(Corruption::EmptyTopic.into());
        }
        let key = codec.read_string().map_err(|e| truncated("key", e))?;
        let partition = codec.read_string().map_err(|e| truncated("partition", e))?;
        let born_time = codec.read_i64().map_err(|e| truncated("born_time", e))?;
        let ack = codec.read_bool().map_err(|e| truncated("ack", e))?;
        let body = codec.read_bytes().map_err(|e| truncated("body", e))?;
        let properties = codec
            .read_string_map()
            .map_err(|e| truncated("properties", e))?;

        Ok(EnvelopeParts {
            topic,
            key,
            partition,
            born_time,
            ack,
            body,
            properties,
        })
    }
}

/// Kekurangan bytes di tengah field = pesan terpotong
fn truncated(field: &'static str, err: CodecError) -> CodecError {
    match err {
        CodecError::CodecCorruption(Corruption::Underflow { needed, remaining }) => {
            CodecError::TruncatedMessage {
                field,
                needed,
                remaining,
            }
        }
        CodecError::CodecCorruption(Corruption::LengthOutOfBounds { len, remaining }) => {
            CodecError::TruncatedMessage {
                field,
                needed: len,
                remaining,
            }
        }
        other => other,
    }
}

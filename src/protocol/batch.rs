//! Batch encode/decode
//!
//! Format batch: `[Env1][Env2]...[EnvN]` back-to-back, tanpa header.
//! Encoder menjumlahkan `size_of` semua envelope, alokasi satu buffer
//! dengan ukuran persis, lalu menulis semua envelope secara sekuensial.
//! Decoder membaca N envelope dalam satu pass.

use tracing::debug;

use super::codec::EnvelopeCodec;
use super::envelope::Envelope;
use crate::core::{BatchBuffer, BufferKind, PrimitiveCodec};
use crate::error::{CodecError, Result};

/// Hasil encode batch: buffer dengan ukuran persis + jumlah envelope
#[derive(Debug)]
pub struct EncodedBatch {
    buffer: BatchBuffer,
    count: usize,
}

impl EncodedBatch {
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Jumlah envelope dalam batch
    #[inline(always)]
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn kind(&self) -> BufferKind {
        self.buffer.kind()
    }

    pub fn into_buffer(self) -> BatchBuffer {
        self.buffer
    }
}

/// Encoder untuk banyak envelope ke satu buffer
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchEncoder {
    codec: EnvelopeCodec,
}

impl BatchEncoder {
    pub fn new(codec: EnvelopeCodec) -> Self {
        Self { codec }
    }

    /// Total bytes untuk semua envelope
    pub fn encoded_len(&self, envelopes: &[Envelope]) -> usize {
        envelopes.iter().map(|e| self.codec.size_of(e)).sum()
    }

    /// Encode semua envelope ke buffer baru dengan ukuran persis
    pub fn encode(&self, envelopes: &[Envelope], kind: BufferKind) -> Result<EncodedBatch> {
        let expected = self.encoded_len(envelopes);
        let buffer = BatchBuffer::allocate(expected, kind)?;
        let mut codec = PrimitiveCodec::new(buffer);

        self.encode_into(envelopes, &mut codec)?;

        // Buffer harus terisi penuh, tidak kurang
        let actual = codec.position();
        if actual != expected {
            return Err(CodecError::EncodingMismatch { expected, actual });
        }

        let buffer = codec.into_inner();
        debug!(
            count = envelopes.len(),
            bytes = expected,
            kind = ?buffer.kind(),
            "encoded envelope batch"
        );
        Ok(EncodedBatch {
            buffer,
            count: envelopes.len(),
        })
    }

    /// Encode ke buffer milik caller, mulai dari posisi cursor
    ///
    /// Kapasitas dicek untuk seluruh batch sebelum menulis.
    /// Returns bytes yang ditulis.
    pub fn encode_into<B>(
        &self,
        envelopes: &[Envelope],
        codec: &mut PrimitiveCodec<B>,
    ) -> Result<usize>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        codec.ensure_remaining(self.encoded_len(envelopes))?;

        let start = codec.position();
        for envelope in envelopes {
            if let Err(e) = self.codec.write(envelope, codec) {
                codec.restore(start);
                return Err(e);
            }
        }
        Ok(codec.position() - start)
    }
}

/// Decoder sekuensial untuk batch envelope
///
/// Juga berfungsi sebagai iterator yang berhenti saat buffer habis
/// atau setelah error pertama.
pub struct BatchDecoder<'a> {
    codec: EnvelopeCodec,
    reader: PrimitiveCodec<&'a [u8]>,
    failed: bool,
}

impl<'a> BatchDecoder<'a> {
    pub fn new(codec: EnvelopeCodec, bytes: &'a [u8]) -> Self {
        Self {
            codec,
            reader: PrimitiveCodec::new(bytes),
            failed: false,
        }
    }

    /// Decode tepat `n` envelope
    ///
    /// `n` dari caller tidak dipercaya untuk alokasi: kapasitas awal
    /// dibatasi jumlah envelope yang muat di sisa buffer.
    pub fn decode(&mut self, n: usize) -> Result<Vec<Envelope>> {
        let fits = self.reader.remaining() / self.codec.min_size();
        let mut out = Vec::with_capacity(n.min(fits));
        for _ in 0..n {
            out.push(self.codec.read(&mut self.reader)?);
        }
        debug!(
            count = n,
            bytes = self.reader.position(),
            "decoded envelope batch"
        );
        Ok(out)
    }

    /// Bytes yang belum dibaca
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }

    #[inline(always)]
    pub fn position(&self) -> usize {
        self.reader.position()
    }
}

impl Iterator for BatchDecoder<'_> {
    type Item = Result<Envelope>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.remaining() == 0 {
            return None;
        }
        let result = self.codec.read(&mut self.reader);
        self.failed = result.is_err();
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelopes(n: usize) -> Vec<Envelope> {
        (0..n)
            .map(|i| {
                Envelope::builder(format!("topic.{i}"))
                    .key(format!("key.{i}"))
                    .partition(format!("p{}", i % 4))
                    .born_time(i as i64)
                    .ack(i % 2 == 0)
                    .body(vec![i as u8; i])
                    .property("seq", i.to_string())
                    .build()
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_encode_decode_batch() {
        let msgs = envelopes(10);
        let encoder = BatchEncoder::default();

        let batch = encoder.encode(&msgs, BufferKind::Heap).unwrap();
        assert_eq!(batch.len(), encoder.encoded_len(&msgs));
        assert_eq!(batch.count(), 10);

        let mut decoder = BatchDecoder::new(EnvelopeCodec::legacy(), batch.as_bytes());
        assert_eq!(decoder.decode(10).unwrap(), msgs);
        assert_eq!(decoder.remaining(), 0);
    }

    #[test]
    fn test_direct_batch() {
        let msgs = envelopes(5);
        let encoder = BatchEncoder::new(EnvelopeCodec::versioned());

        let batch = encoder.encode(&msgs, BufferKind::Direct).unwrap();
        assert_eq!(batch.kind(), BufferKind::Direct);

        let decoded: Vec<_> = BatchDecoder::new(EnvelopeCodec::versioned(), batch.as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(decoded, msgs);
    }

    #[test]
    fn test_empty_batch() {
        let batch = BatchEncoder::default()
            .encode(&[], BufferKind::Direct)
            .unwrap();
        assert!(batch.is_empty());
        assert_eq!(
            BatchDecoder::new(EnvelopeCodec::legacy(), batch.as_bytes()).count(),
            0
        );
    }

    #[test]
    fn test_encode_into_undersized_buffer() {
        let msgs = envelopes(3);
        let encoder = BatchEncoder::default();
        let mut codec = PrimitiveCodec::new(vec![0u8; encoder.encoded_len(&msgs) - 1]);

        assert!(matches!(
            encoder.encode_into(&msgs, &mut codec),
            Err(CodecError::BufferOverflow { .. })
        ));
        assert_eq!(codec.position(), 0);
    }

    #[test]
    fn test_decode_oversized_count_is_truncated() {
        let msgs = envelopes(1);
        let batch = BatchEncoder::default().encode(&msgs, BufferKind::Heap).unwrap();

        let mut decoder = BatchDecoder::new(EnvelopeCodec::legacy(), batch.as_bytes());
        assert!(matches!(
            decoder.decode(usize::MAX),
            Err(CodecError::TruncatedMessage { field: "topic", .. })
        ));
        // Envelope pertama sudah terbaca, cursor berhenti di akhirnya
        assert_eq!(decoder.remaining(), 0);
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let msgs = envelopes(3);
        let batch = BatchEncoder::default().encode(&msgs, BufferKind::Heap).unwrap();
        let bytes = &batch.as_bytes()[..batch.len() - 2];

        let results: Vec<_> = BatchDecoder::new(EnvelopeCodec::legacy(), bytes).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(matches!(
            results[2],
            Err(CodecError::TruncatedMessage { .. })
        ));
    }
}

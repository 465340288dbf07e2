//! Primitive Codec: typed cursor di atas satu byte buffer
//!
//! Layout setiap primitive (semua integer big-endian):
//! ┌──────────────┬──────────────────────────────────────────┐
//! │ i32 / i64    │ 4 / 8 bytes fixed                        │
//! │ bool         │ 1 byte (0 atau 1)                        │
//! │ str / bytes  │ i32 length prefix + raw bytes            │
//! │ string map   │ i32 entry count + (str key, str value)*  │
//! └──────────────┴──────────────────────────────────────────┘
//!
//! Tidak ada growth internal. Caller wajib menghitung size di depan,
//! operasi yang gagal tidak memajukan cursor.

use std::collections::BTreeMap;

use crate::error::{CodecError, Corruption, Result};

/// Ukuran length prefix / entry count
pub const LEN_PREFIX_SIZE: usize = 4;
pub const I32_SIZE: usize = 4;
pub const I64_SIZE: usize = 8;
pub const BOOL_SIZE: usize = 1;

/// Bytes yang dibutuhkan untuk length-prefixed string
#[inline(always)]
pub fn sized_str(s: &str) -> usize {
    LEN_PREFIX_SIZE + s.len()
}

/// Bytes yang dibutuhkan untuk length-prefixed byte sequence
#[inline(always)]
pub fn sized_bytes(b: &[u8]) -> usize {
    LEN_PREFIX_SIZE + b.len()
}

/// Bytes yang dibutuhkan untuk counted string map
pub fn sized_string_map<I, K, V>(entries: I) -> usize
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    entries
        .into_iter()
        .fold(LEN_PREFIX_SIZE, |acc, (k, v)| {
            acc + sized_str(k.as_ref()) + sized_str(v.as_ref())
        })
}

#[inline(always)]
fn length_prefix(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| CodecError::LengthTooLarge(len))
}

/// Cursor-based reader/writer untuk satu buffer
///
/// `B` bisa berupa `&mut [u8]`, `&[u8]`, `Vec<u8>`, `Box<[u8]>`
/// atau [`BatchBuffer`](crate::core::BatchBuffer). Operasi read hanya
/// butuh `AsRef<[u8]>`, operasi write butuh `AsMut<[u8]>` juga.
///
/// Satu instance = satu buffer + satu cursor. Tidak aman dipakai
/// bersamaan oleh beberapa writer/reader (dijamin oleh `&mut self`).
#[derive(Debug)]
pub struct PrimitiveCodec<B> {
    buffer: B,
    position: usize,
    limit: usize,
}

impl<B: AsRef<[u8]>> PrimitiveCodec<B> {
    /// Wrap buffer dengan cursor di 0 dan limit = kapasitas
    pub fn new(buffer: B) -> Self {
        let limit = buffer.as_ref().len();
        Self {
            buffer,
            position: 0,
            limit,
        }
    }

    /// Total kapasitas buffer
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.buffer.as_ref().len()
    }

    /// Posisi cursor saat ini
    #[inline(always)]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline(always)]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Bytes tersisa antara cursor dan limit
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    /// Pindahkan cursor. Posisi di luar limit ditolak.
    ///
    /// Error dilaporkan relatif ke cursor sekarang, sama seperti write:
    /// `needed` = jarak lompatan, `remaining` = sisa sampai limit.
    pub fn set_position(&mut self, position: usize) -> Result<()> {
        if position > self.limit {
            return Err(CodecError::BufferOverflow {
                needed: position - self.position,
                remaining: self.remaining(),
            });
        }
        self.position = position;
        Ok(())
    }

    /// Kembalikan cursor ke posisi yang sebelumnya valid
    #[inline(always)]
    pub(crate) fn restore(&mut self, position: usize) {
        debug_assert!(position <= self.limit);
        self.position = position;
    }

    /// Ubah buffer yang baru ditulis menjadi readable:
    /// limit = position, position = 0
    pub fn flip(&mut self) {
        self.limit = self.position;
        self.position = 0;
    }

    /// Reset cursor ke 0 tanpa mengubah limit
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Reset cursor dan limit untuk reuse buffer
    pub fn clear(&mut self) {
        self.position = 0;
        self.limit = self.capacity();
    }

    /// Bytes dari awal buffer sampai cursor
    #[inline(always)]
    pub fn written(&self) -> &[u8] {
        &self.buffer.as_ref()[..self.position]
    }

    /// Lepas buffer di bawahnya
    pub fn into_inner(self) -> B {
        self.buffer
    }

    /// Ambil `n` bytes berikutnya dan majukan cursor
    #[inline(always)]
    fn take(&mut self, n: usize) -> Result<&[u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(Corruption::Underflow {
                needed: n,
                remaining,
            }
            .into());
        }
        let start = self.position;
        self.position += n;
        Ok(&self.buffer.as_ref()[start..start + n])
    }

    #[inline(always)]
    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    #[inline(always)]
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    #[inline(always)]
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.take_array()?))
    }

    #[inline(always)]
    pub fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.take_array::<1>()?;
        Ok(b)
    }

    #[inline(always)]
    pub fn read_bool(&mut self) -> Result<bool> {
        let start = self.position;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => {
                self.position = start;
                Err(Corruption::InvalidBool(other).into())
            }
        }
    }

    /// Baca length prefix dan validasi terhadap sisa buffer
    ///
    /// Cursor hanya maju jika prefix valid.
    fn read_len(&mut self, unit: usize) -> Result<usize> {
        let start = self.position;
        let raw = self.read_i32()?;
        if raw < 0 {
            self.position = start;
            return Err(Corruption::NegativeLength(raw).into());
        }
        let len = raw as usize;
        let remaining = self.remaining();
        if len.saturating_mul(unit) > remaining {
            self.position = start;
            return Err(Corruption::LengthOutOfBounds {
                len: len.saturating_mul(unit),
                remaining,
            }
            .into());
        }
        Ok(len)
    }

    /// Baca length-prefixed bytes tanpa copy (zero-copy)
    pub fn read_bytes_ref(&mut self) -> Result<&[u8]> {
        let len = self.read_len(1)?;
        self.take(len)
    }

    /// Baca length-prefixed bytes ke `Vec` baru milik caller
    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        Ok(self.read_bytes_ref()?.to_vec())
    }

    pub fn read_string(&mut self) -> Result<String> {
        let start = self.position;
        let bytes = self.read_bytes_ref()?;
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_owned()),
            Err(_) => {
                self.position = start;
                Err(Corruption::InvalidUtf8.into())
            }
        }
    }

    /// Baca counted string map
    ///
    /// Setiap entry minimal butuh dua length prefix, sehingga count yang
    /// mustahil langsung ditolak sebelum membaca entry apa pun.
    pub fn read_string_map(&mut self) -> Result<BTreeMap<String, String>> {
        let start = self.position;
        let result = self.read_string_map_inner();
        if result.is_err() {
            self.position = start;
        }
        result
    }

    fn read_string_map_inner(&mut self) -> Result<BTreeMap<String, String>> {
        let count = self.read_len(2 * LEN_PREFIX_SIZE)?;
        let mut map = BTreeMap::new();
        for _ in 0..count {
            let key = self.read_string()?;
            let value = self.read_string()?;
            if map.contains_key(&key) {
                return Err(Corruption::DuplicateKey(key).into());
            }
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> PrimitiveCodec<B> {
    /// Copy raw bytes ke cursor, gagal jika melewati limit
    #[inline(always)]
    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        let remaining = self.remaining();
        if bytes.len() > remaining {
            return Err(CodecError::BufferOverflow {
                needed: bytes.len(),
                remaining,
            });
        }
        let start = self.position;
        self.buffer.as_mut()[start..start + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
        Ok(())
    }

    /// Pastikan `needed` bytes muat sebelum menulis apa pun
    #[inline(always)]
    pub fn ensure_remaining(&mut self, needed: usize) -> Result<()> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(CodecError::BufferOverflow { needed, remaining });
        }
        Ok(())
    }

    #[inline(always)]
    pub fn write_i32(&mut self, v: i32) -> Result<()> {
        self.put(&v.to_be_bytes())
    }

    #[inline(always)]
    pub fn write_i64(&mut self, v: i64) -> Result<()> {
        self.put(&v.to_be_bytes())
    }

    #[inline(always)]
    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        self.put(&[v])
    }

    #[inline(always)]
    pub fn write_bool(&mut self, v: bool) -> Result<()> {
        self.write_u8(v as u8)
    }

    /// Tulis length-prefixed bytes (atomic: prefix + payload atau tidak sama sekali)
    pub fn write_bytes(&mut self, b: &[u8]) -> Result<()> {
        let len = length_prefix(b.len())?;
        self.ensure_remaining(sized_bytes(b))?;
        self.write_i32(len)?;
        self.put(b)
    }

    #[inline(always)]
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_bytes(s.as_bytes())
    }

    /// Tulis counted string map sesuai urutan iterasi
    ///
    /// Jika gagal di tengah, cursor dikembalikan ke posisi awal.
    pub fn write_string_map<I, K, V>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        I::IntoIter: ExactSizeIterator,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let start = self.position;
        let result = self.write_string_map_inner(entries.into_iter());
        if result.is_err() {
            self.position = start;
        }
        result
    }

    fn write_string_map_inner<I, K, V>(&mut self, entries: I) -> Result<()>
    where
        I: ExactSizeIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.write_i32(length_prefix(entries.len())?)?;
        for (key, value) in entries {
            self.write_str(key.as_ref())?;
            self.write_str(value.as_ref())?;
        }
        Ok(())
    }
}

//! Pre-sized Batch Buffer
//!
//! Satu buffer dengan kapasitas tetap untuk satu batch envelope:
//! - Heap: `Box<[u8]>` biasa
//! - Direct: anonymous mmap, di luar heap allocator
//!
//! Buffer tidak pernah tumbuh. Kapasitas ditentukan dari `size_of`
//! sebelum encode dimulai.

use memmap2::{MmapMut, MmapOptions};

use crate::error::Result;

/// Jenis backing memory untuk batch buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferKind {
    /// Alokasi heap biasa
    #[default]
    Heap,
    /// Anonymous memory map (direct buffer)
    Direct,
}

#[derive(Debug)]
enum Backing {
    Heap(Box<[u8]>),
    Direct(MmapMut),
}

/// Buffer dengan kapasitas tetap, zero-filled saat alokasi
#[derive(Debug)]
pub struct BatchBuffer {
    backing: Backing,
}

impl BatchBuffer {
    /// Alokasi buffer sebesar `len` bytes
    ///
    /// Anonymous map butuh panjang > 0, jadi request Direct dengan
    /// `len == 0` jatuh ke heap.
    pub fn allocate(len: usize, kind: BufferKind) -> Result<Self> {
        let backing = match kind {
            BufferKind::Direct if len > 0 => {
                Backing::Direct(MmapOptions::new().len(len).map_anon()?)
            }
            _ => Backing::Heap(vec![0u8; len].into_boxed_slice()),
        };
        Ok(Self { backing })
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Jenis backing yang benar-benar dipakai
    pub fn kind(&self) -> BufferKind {
        match self.backing {
            Backing::Heap(_) => BufferKind::Heap,
            Backing::Direct(_) => BufferKind::Direct,
        }
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        match &self.backing {
            Backing::Heap(buf) => &buf[..],
            Backing::Direct(map) => &map[..],
        }
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match &mut self.backing {
            Backing::Heap(buf) => &mut buf[..],
            Backing::Direct(map) => &mut map[..],
        }
    }
}

impl AsRef<[u8]> for BatchBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsMut<[u8]> for BatchBuffer {
    fn as_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

use log::trace;
use thiserror::Error;

use crate::decoder::Size;

/// Read-only view of big-endian instruction memory.
///
/// Implementations must not have observable side effects: the decoder may
/// read the same address several times while rendering a listing.
pub trait MemoryReader {
    fn read16(&self, addr: u32) -> u16;
}

impl<F> MemoryReader for F
where
    F: Fn(u32) -> u16,
{
    fn read16(&self, addr: u32) -> u16 {
        self(addr)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySegment {
    pub base: u32,
    pub data: Vec<u8>,
}

impl MemorySegment {
    pub fn new(base: u32, data: Vec<u8>) -> Self {
        Self { base, data }
    }

    /// One past the last mapped address.
    pub fn end(&self) -> u64 {
        self.base as u64 + self.data.len() as u64
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryImage {
    segments: Vec<MemorySegment>,
}

impl MemoryImage {
    pub fn new(segments: Vec<MemorySegment>) -> Self {
        let mut image = Self { segments };
        image.segments.sort_by_key(|s| s.base);
        image
    }

    pub fn from_bytes(base: u32, data: Vec<u8>) -> Self {
        Self::new(vec![MemorySegment::new(base, data)])
    }

    /// Builds a single segment from big-endian words.
    pub fn from_words(base: u32, words: &[u16]) -> Self {
        let data = words.iter().flat_map(|w| w.to_be_bytes()).collect();
        Self::from_bytes(base, data)
    }

    pub fn read_word(&self, addr: u32) -> Result<u16, MemoryError> {
        let bytes = self.read_range(addr, 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Whether `size` bytes from `addr` lie inside one segment.
    pub fn covers_range(&self, addr: u32, size: usize) -> bool {
        self.segment_containing(addr as u64, addr as u64 + size as u64)
            .is_some()
    }

    fn read_range(&self, addr: u32, size: usize) -> Result<&[u8], MemoryError> {
        let start = addr as u64;
        let end = start + size as u64;
        if end > 1 << 32 {
            return Err(MemoryError::AddressOverflow { addr, size });
        }

        let segment = self
            .segment_containing(start, end)
            .ok_or(MemoryError::Unmapped { addr, size })?;

        let offset = (addr - segment.base) as usize;
        Ok(&segment.data[offset..offset + size])
    }

    fn segment_containing(&self, start: u64, end: u64) -> Option<&MemorySegment> {
        self.segments
            .iter()
            .find(|s| start >= s.base as u64 && end <= s.end())
    }
}

impl MemoryReader for MemoryImage {
    fn read16(&self, addr: u32) -> u16 {
        match self.read_word(addr) {
            Ok(word) => word,
            Err(err) => {
                trace!("{err}, reading as zero");
                0
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("address overflow at {addr:#x} (size {size})")]
    AddressOverflow { addr: u32, size: usize },
    #[error("no segment covers {size} bytes at {addr:#x}")]
    Unmapped { addr: u32, size: usize },
}

/// Read position over instruction memory for a single decode call.
///
/// Advances by two bytes per word fetch and four per long fetch.
pub struct Cursor<'m> {
    mem: &'m dyn MemoryReader,
    addr: u32,
}

impl<'m> Cursor<'m> {
    pub fn new(mem: &'m dyn MemoryReader, addr: u32) -> Self {
        Self { mem, addr }
    }

    pub fn addr(&self) -> u32 {
        self.addr
    }

    pub fn read16(&mut self) -> u16 {
        let word = self.mem.read16(self.addr);
        self.addr = self.addr.wrapping_add(2);
        word
    }

    /// High word first.
    pub fn read32(&mut self) -> u32 {
        let hi = self.read16() as u32;
        let lo = self.read16() as u32;
        hi << 16 | lo
    }

    /// Reads an operand of the given width. Byte operands occupy the low half
    /// of a full word.
    pub fn read(&mut self, size: Size) -> u32 {
        match size {
            Size::Byte => (self.read16() & 0xFF) as u32,
            Size::Word => self.read16() as u32,
            Size::Long => self.read32(),
        }
    }
}

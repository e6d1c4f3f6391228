//! Linear data memory.

use std::ops::Range;

/// Fixed-capacity, zero-initialized, byte-addressable memory.
///
/// Word access is little-endian and need not be aligned. Every access must
/// lie entirely inside `0..capacity`; out-of-range accesses return `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    bytes: Box<[u8]>,
}

impl Memory {
    /// Allocate `capacity` zeroed bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity].into_boxed_slice(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn read8(&self, addr: u64) -> Option<u8> {
        let range = self.range(addr, 1)?;
        Some(self.bytes[range.start])
    }

    pub fn read64(&self, addr: u64) -> Option<u64> {
        let bytes = self.slice(addr, 8)?;
        let mut word = [0u8; 8];
        word.copy_from_slice(bytes);
        Some(u64::from_le_bytes(word))
    }

    pub fn write8(&mut self, addr: u64, value: u8) -> Option<()> {
        let range = self.range(addr, 1)?;
        self.bytes[range.start] = value;
        Some(())
    }

    pub fn write64(&mut self, addr: u64, value: u64) -> Option<()> {
        let range = self.range(addr, 8)?;
        self.bytes[range].copy_from_slice(&value.to_le_bytes());
        Some(())
    }

    /// Borrow `len` bytes starting at `addr`.
    pub fn slice(&self, addr: u64, len: u64) -> Option<&[u8]> {
        let range = self.range(addr, len)?;
        Some(&self.bytes[range])
    }

    fn range(&self, addr: u64, width: u64) -> Option<Range<usize>> {
        let end = addr.checked_add(width)?;
        let start = usize::try_from(addr).ok()?;
        let end = usize::try_from(end).ok()?;
        (end <= self.bytes.len()).then_some(start..end)
    }
}

// ABOUTME: Bounds-checked read cursor over a borrowed DTB buffer
// ABOUTME: Tracks an absolute offset so alignment follows the blob layout

/// Round `offset` up to the next multiple of `align` (a power of two)
pub fn align_up(offset: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    (offset + align - 1) & !(align - 1)
}

/// Read a big-endian u32 at `offset`, if the buffer holds it
pub fn be_u32_at(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_be_bytes(bytes.try_into().ok()?))
}

/// Read a big-endian u64 at `offset`, if the buffer holds it
pub fn be_u64_at(data: &[u8], offset: usize) -> Option<u64> {
    let bytes = data.get(offset..offset.checked_add(8)?)?;
    Some(u64::from_be_bytes(bytes.try_into().ok()?))
}

/// Read a NUL-terminated string starting at `offset`.
///
/// Returns the bytes before the terminator; `None` when no terminator is
/// found before the end of `data`.
pub fn c_str_at(data: &[u8], offset: usize) -> Option<&[u8]> {
    let tail = data.get(offset..)?;
    let len = tail.iter().position(|&b| b == 0)?;
    Some(&tail[..len])
}

/// Read position inside a region of the blob.
///
/// The cursor never copies the blob. `pos` is an absolute offset from the
/// start of the blob and `end` bounds every read, so running off the region
/// yields `None` instead of reading out of bounds.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor over `data[start..end]`, clamping `end` to the buffer
    pub fn new(data: &'a [u8], start: usize, end: usize) -> Self {
        let end = end.min(data.len());
        Self {
            data,
            pos: start.min(end),
            end,
        }
    }

    /// Current absolute offset
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Bytes left before the end of the region
    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    /// Consume a big-endian u32
    pub fn read_u32(&mut self) -> Option<u32> {
        let bytes = self.take(4)?;
        Some(u32::from_be_bytes(bytes.try_into().ok()?))
    }

    /// Consume exactly `len` bytes
    pub fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        if self.remaining() < len {
            return None;
        }
        let data: &'a [u8] = self.data;
        let bytes = &data[self.pos..self.pos + len];
        self.pos += len;
        Some(bytes)
    }

    /// Consume a NUL-terminated string and its terminator
    pub fn read_c_str(&mut self) -> Option<&'a [u8]> {
        let data: &'a [u8] = self.data;
        let s = c_str_at(&data[..self.end], self.pos)?;
        self.pos += s.len() + 1;
        Some(s)
    }

    /// Move forward to the next multiple of `align`.
    ///
    /// Fails without moving when the aligned position would leave the region.
    pub fn align(&mut self, align: usize) -> Option<()> {
        let aligned = align_up(self.pos, align);
        if aligned > self.end {
            return None;
        }
        self.pos = aligned;
        Some(())
    }
}

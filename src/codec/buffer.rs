//! Bounds-checked buffer helpers for the reader.

use super::DecodeError;

/// Safe buffer read helper - returns error instead of panicking.
#[inline]
pub fn read_byte(buffer: &[u8], offset: usize) -> Result<u8, DecodeError> {
    buffer
        .get(offset)
        .copied()
        .ok_or(DecodeError::BufferTooSmall {
            needed: offset + 1,
            available: buffer.len(),
        })
}

/// Safe buffer slice read helper.
#[inline]
pub fn read_slice(buffer: &[u8], start: usize, len: usize) -> Result<&[u8], DecodeError> {
    let end = start.checked_add(len).ok_or(DecodeError::InvalidLength(len as i64))?;
    buffer.get(start..end).ok_or(DecodeError::BufferTooSmall {
        needed: end,
        available: buffer.len(),
    })
}

/// Read a fixed-size big-endian array starting at `start`.
#[inline]
pub fn read_array<const N: usize>(buffer: &[u8], start: usize) -> Result<[u8; N], DecodeError> {
    let bytes = read_slice(buffer, start, N)?;
    bytes.try_into().map_err(|_| DecodeError::BufferTooSmall {
        needed: start + N,
        available: buffer.len(),
    })
}

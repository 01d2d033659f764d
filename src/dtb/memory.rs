// ABOUTME: Memory reservation block parsing for device tree blobs
// ABOUTME: Reads (address, size) pairs up to the (0, 0) terminator

use super::cursor::be_u64_at;
use super::error::{DumpError, Result};

/// Memory reservation entry with address and size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryReservation {
    /// Physical address of reserved memory region
    pub address: u64,
    /// Size of reserved memory region
    pub size: u64,
}

impl MemoryReservation {
    /// Size of each reservation entry in bytes (address + size)
    pub const SIZE: usize = 16;

    /// Parse the reservation map that starts at `offset` in `blob`.
    ///
    /// Entries come back in declaration order. The terminating (0, 0) entry is
    /// not included and nothing after it is read.
    pub fn parse_all(blob: &[u8], offset: usize) -> Result<Vec<Self>> {
        let mut reservations = Vec::new();
        let mut entry = offset;

        loop {
            let address = be_u64_at(blob, entry);
            let size = entry.checked_add(8).and_then(|at| be_u64_at(blob, at));
            let (Some(address), Some(size)) = (address, size) else {
                return Err(DumpError::TruncatedReservationMap(offset));
            };

            if address == 0 && size == 0 {
                break;
            }

            reservations.push(MemoryReservation { address, size });
            entry += Self::SIZE;
        }

        Ok(reservations)
    }
}

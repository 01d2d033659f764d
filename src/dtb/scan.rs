// ABOUTME: Locates a flattened device tree embedded in a larger buffer
// ABOUTME: Scans for the magic signature and checks each hit for a plausible header

use log::debug;

use super::cursor::be_u32_at;
use super::error::{DumpError, Result};
use super::header::DtbHeader;

/// Highest format version a candidate header may declare
const MAX_VERSION: u32 = 17;

/// Find the offset of the first plausible FDT header in `buf`
pub fn locate_blob(buf: &[u8]) -> Result<usize> {
    locate_blob_with(buf, |_| {})
}

/// Like [`locate_blob`], calling `on_skip` with the offset of every magic
/// match that failed validation.
///
/// A rejected match only moves the scan forward by one byte, so a header
/// overlapping a false match is still found.
pub fn locate_blob_with(buf: &[u8], mut on_skip: impl FnMut(usize)) -> Result<usize> {
    let magic = DtbHeader::MAGIC.to_be_bytes();
    // Matches in the last four bytes are never considered
    let search_end = buf.len().saturating_sub(4);
    let mut pos = 0;

    while pos < search_end {
        let Some(hit) = buf[pos..search_end].iter().position(|&b| b == magic[0]) else {
            break;
        };
        pos += hit;

        if buf[pos..pos + 4] == magic {
            if is_plausible_header(&buf[pos..]) {
                debug!("found fdt magic at offset {pos:#x}");
                return Ok(pos);
            }
            debug!("skipping fdt magic at offset {pos:#x}");
            on_skip(pos);
        }
        pos += 1;
    }

    Err(DumpError::NoEmbeddedBlob)
}

/// Cheap sanity check of a header candidate.
///
/// Every size and offset must be strictly smaller than the bytes left from
/// the candidate on. There is no checksum, so a crafted buffer can pass.
fn is_plausible_header(candidate: &[u8]) -> bool {
    let field = |offset| be_u32_at(candidate, offset).map(|value| value as usize);
    let remaining = candidate.len();

    let (Some(totalsize), Some(off_dt_struct), Some(off_dt_strings), Some(version), Some(last_comp)) = (
        field(DtbHeader::OFF_TOTALSIZE),
        field(DtbHeader::OFF_DT_STRUCT),
        field(DtbHeader::OFF_DT_STRINGS),
        field(DtbHeader::OFF_VERSION),
        field(DtbHeader::OFF_LAST_COMP_VERSION),
    ) else {
        return false;
    };

    version <= MAX_VERSION as usize
        && last_comp < MAX_VERSION as usize
        && totalsize < remaining
        && off_dt_struct < remaining
        && off_dt_strings < remaining
}

// ABOUTME: Streaming DTB dumper: header, reservation map and structure block
// ABOUTME: Renders the tag stream as device tree source without building a tree

use std::borrow::Cow;
use std::io::Write;

use log::{debug, warn};

use super::cursor::{Cursor, c_str_at};
use super::error::{DumpError, Result};
use super::header::DtbHeader;
use super::memory::MemoryReservation;
use super::tokens::DtbToken;
use crate::render::{Renderer, alt_hex};

/// Format versions below this place values of 8 bytes or more on an 8-byte
/// boundary
const LEGACY_ALIGN_VERSION: u32 = 16;

/// Device tree blob dumper
#[derive(Debug)]
pub struct DeviceTreeDumper<'a> {
    data: &'a [u8],
}

impl<'a> DeviceTreeDumper<'a> {
    /// Create a new dumper over DTB data starting with the header
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Parse the DTB header
    pub fn parse_header(&self) -> Result<DtbHeader> {
        DtbHeader::parse(self.data)
    }

    /// Parse memory reservations
    pub fn parse_memory_reservations(&self) -> Result<Vec<MemoryReservation>> {
        let header = self.parse_header()?;
        MemoryReservation::parse_all(self.blob(&header), header.off_mem_rsvmap as usize)
    }

    /// Render the whole blob.
    ///
    /// Lines are written as they are decoded, so on error everything before
    /// the failing item has already reached `renderer`.
    pub fn dump<W: Write>(&self, renderer: &mut Renderer<W>) -> Result<()> {
        let header = self.parse_header()?;
        debug!(
            "dumping FDT version {} ({} bytes)",
            header.version, header.totalsize
        );
        let blob = self.blob(&header);

        renderer.version_tag()?;
        for (name, value) in header.describe() {
            renderer.debug(format_args!("{name}{value}"))?;
        }
        renderer.blank()?;

        for reservation in MemoryReservation::parse_all(blob, header.off_mem_rsvmap as usize)? {
            renderer.line(
                0,
                format_args!(
                    "/memreserve/ {} {};",
                    alt_hex(reservation.address),
                    alt_hex(reservation.size)
                ),
            )?;
        }

        dump_structure(blob, &header, renderer)
    }

    /// The bytes the header claims, or all of them if the buffer is short
    fn blob(&self, header: &DtbHeader) -> &'a [u8] {
        let total = header.totalsize as usize;
        if total > self.data.len() {
            warn!(
                "FDT totalsize 0x{:x} exceeds the 0x{:x} bytes available",
                total,
                self.data.len()
            );
            return self.data;
        }
        &self.data[..total]
    }
}

/// Walk the structure block tag by tag and render each item.
///
/// Depth is the only state: it starts at 0 and must be back at 0 exactly when
/// `FDT_END` is read.
fn dump_structure<W: Write>(
    blob: &[u8],
    header: &DtbHeader,
    renderer: &mut Renderer<W>,
) -> Result<()> {
    let struct_start = header.off_dt_struct as usize;
    let struct_end = header
        .size_dt_struct
        .map_or(blob.len(), |size| struct_start.saturating_add(size as usize));

    let strings_start = header.off_dt_strings as usize;
    let strings_end = header
        .size_dt_strings
        .map_or(blob.len(), |size| strings_start.saturating_add(size as usize))
        .min(blob.len());
    let strings = blob.get(strings_start..strings_end).unwrap_or_default();

    let mut cursor = Cursor::new(blob, struct_start, struct_end);
    let mut depth = 0usize;

    loop {
        let tag_offset = cursor.offset();
        let tag = cursor
            .read_u32()
            .ok_or(DumpError::TruncatedStructure(tag_offset))?;

        renderer.debug(format_args!(
            "{tag_offset:04x}: tag: 0x{tag:08x} ({})",
            DtbToken::tag_name(tag)
        ))?;

        let Some(token) = DtbToken::from_u32(tag) else {
            return Err(DumpError::UnknownTag {
                offset: tag_offset,
                tag,
            });
        };

        match token {
            DtbToken::BeginNode => {
                let name_offset = cursor.offset();
                let name = cursor
                    .read_c_str()
                    .ok_or(DumpError::TruncatedName(name_offset))?;
                cursor
                    .align(4)
                    .ok_or(DumpError::TruncatedStructure(cursor.offset()))?;

                renderer.begin_node(depth, &String::from_utf8_lossy(name))?;
                depth += 1;
            }
            DtbToken::EndNode => {
                depth = depth.checked_sub(1).ok_or(DumpError::UnbalancedNodes {
                    offset: tag_offset,
                    depth,
                })?;
                renderer.end_node(depth)?;
            }
            DtbToken::Nop => {
                renderer.comment(depth, format_args!("[NOP]"))?;
            }
            DtbToken::Property => {
                let header_offset = cursor.offset();
                let (Some(len), Some(name_offset)) = (cursor.read_u32(), cursor.read_u32()) else {
                    return Err(DumpError::TruncatedStructure(header_offset));
                };
                let len = len as usize;
                let name_offset = name_offset as usize;

                if header.version < LEGACY_ALIGN_VERSION && len >= 8 {
                    cursor.align(8).ok_or(DumpError::TruncatedProperty {
                        offset: cursor.offset(),
                        len,
                    })?;
                }
                let value_offset = cursor.offset();
                let value = cursor.take(len).ok_or(DumpError::TruncatedProperty {
                    offset: value_offset,
                    len,
                })?;
                cursor
                    .align(4)
                    .ok_or(DumpError::TruncatedStructure(cursor.offset()))?;

                let name = resolve_property_name(strings, name_offset)?;

                renderer.debug(format_args!(
                    "{:04x}: string: {name}",
                    strings_start + name_offset
                ))?;
                renderer.debug(format_args!("{value_offset:04x}: value"))?;
                renderer.property(depth, &name, value, false)?;
            }
            DtbToken::End => {
                if depth != 0 {
                    return Err(DumpError::UnbalancedNodes {
                        offset: tag_offset,
                        depth,
                    });
                }
                return Ok(());
            }
        }
    }
}

/// Resolve property name from strings block using offset
fn resolve_property_name(strings_block: &[u8], offset: usize) -> Result<Cow<'_, str>> {
    if offset >= strings_block.len() {
        return Err(DumpError::InvalidStringOffset {
            offset,
            size: strings_block.len(),
        });
    }

    let name = c_str_at(strings_block, offset).ok_or(DumpError::TruncatedString(offset))?;
    Ok(String::from_utf8_lossy(name))
}

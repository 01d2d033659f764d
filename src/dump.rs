// ABOUTME: Entry points that pick blob or live mode for an input
// ABOUTME: Handles embedded blob scanning before handing off to the dumper

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::dtb::error::{DumpError, Result};
use crate::dtb::{DeviceTreeDumper, locate_blob_with};
use crate::live;
use crate::render::{Renderer, alt_hex};

/// Switches shared by every dump
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DumpOptions {
    /// Emit `//` comment lines with offsets and raw tag values
    pub debug: bool,
    /// Search the input for an embedded blob instead of expecting one at
    /// offset 0
    pub scan: bool,
}

/// Dump `path`: a directory is walked as a live tree, anything else is read
/// as a blob.
pub fn dump_path<W: Write>(path: &Path, options: DumpOptions, out: W) -> Result<()> {
    let io_error = |source| DumpError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut renderer = Renderer::new(out, options.debug);
    if fs::metadata(path).map_err(io_error)?.is_dir() {
        return live::dump_live(path, &mut renderer);
    }

    let data = fs::read(path).map_err(io_error)?;
    dump_buffer(&data, &path.display().to_string(), options, &mut renderer)
}

/// Dump an in-memory buffer.
///
/// With `options.scan` set the blob is searched for first and `label` names
/// the input in the comment reporting where it was found.
pub fn dump_buffer<W: Write>(
    data: &[u8],
    label: &str,
    options: DumpOptions,
    renderer: &mut Renderer<W>,
) -> Result<()> {
    let mut blob = data;

    if options.scan {
        let mut skipped = Vec::new();
        let found = locate_blob_with(data, |offset| skipped.push(offset));
        for offset in skipped {
            renderer.debug(format_args!(
                "{label}: skipping fdt magic at offset {}",
                alt_hex(offset as u64)
            ))?;
        }

        let offset = found?;
        renderer.comment(
            0,
            format_args!("{label}: found fdt at offset {}", alt_hex(offset as u64)),
        )?;
        blob = &data[offset..];
    }

    DeviceTreeDumper::new(blob).dump(renderer)
}

/// Dump a blob that starts at offset 0 of `blob`
pub fn dump_blob<W: Write>(blob: &[u8], debug: bool, out: W) -> Result<()> {
    DeviceTreeDumper::new(blob).dump(&mut Renderer::new(out, debug))
}

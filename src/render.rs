// ABOUTME: Line renderer shared by the blob dumper and the live tree walker
// ABOUTME: Emits indentation-scoped device tree source one complete line at a time

use std::fmt;
use std::io::Write;

use crate::dtb::error::{DumpError, Result};
use crate::dtb::value::PropertyValue;

/// Spaces of indentation per nesting level
pub const INDENT_SHIFT: usize = 4;

/// Hex with a `0x` prefix, except zero which prints as `0`
pub fn alt_hex(value: u64) -> String {
    if value == 0 {
        "0".to_string()
    } else {
        format!("{value:#x}")
    }
}

/// Writes device tree source lines to an output stream.
///
/// Every call writes whole lines. Debug lines are dropped unless the renderer
/// was created with `debug` set, so they never change the remaining output.
pub struct Renderer<W: Write> {
    out: W,
    debug: bool,
}

impl<W: Write> Renderer<W> {
    /// Create a renderer writing to `out`
    pub fn new(out: W, debug: bool) -> Self {
        Self { out, debug }
    }

    /// Write one line indented to `depth`
    pub fn line(&mut self, depth: usize, text: fmt::Arguments<'_>) -> Result<()> {
        writeln!(self.out, "{:indent$}{}", "", text, indent = depth * INDENT_SHIFT)
            .map_err(DumpError::Output)
    }

    /// Write an empty line
    pub fn blank(&mut self) -> Result<()> {
        writeln!(self.out).map_err(DumpError::Output)
    }

    /// `/dts-v1/;`
    pub fn version_tag(&mut self) -> Result<()> {
        self.line(0, format_args!("/dts-v1/;"))
    }

    /// `<name> {`, with the empty root name shown as `/`
    pub fn begin_node(&mut self, depth: usize, name: &str) -> Result<()> {
        let name = if name.is_empty() { "/" } else { name };
        self.line(depth, format_args!("{name} {{"))
    }

    /// `};`
    pub fn end_node(&mut self, depth: usize) -> Result<()> {
        self.line(depth, format_args!("}};"))
    }

    /// `<name><value>;`, with ` (trunc)` after the name for a cut-off value
    pub fn property(
        &mut self,
        depth: usize,
        name: &str,
        value: &[u8],
        truncated: bool,
    ) -> Result<()> {
        let marker = if truncated { " (trunc)" } else { "" };
        let value = PropertyValue::from_bytes(value);
        self.line(depth, format_args!("{name}{marker}{value};"))
    }

    /// `// <text>` at `depth`
    pub fn comment(&mut self, depth: usize, text: fmt::Arguments<'_>) -> Result<()> {
        self.line(depth, format_args!("// {text}"))
    }

    /// `// <text>` at column zero, only in debug mode
    pub fn debug(&mut self, text: fmt::Arguments<'_>) -> Result<()> {
        if self.debug {
            self.comment(0, text)?;
        }
        Ok(())
    }
}

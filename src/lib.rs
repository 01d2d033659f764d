// ABOUTME: Device tree dumping library for flattened blobs and live trees
// ABOUTME: Renders both inputs as the same device tree source text

//! # FDT Dump
//!
//! Print a Flattened Device Tree (FDT) blob, or a live device tree exposed
//! as a directory hierarchy such as `/proc/device-tree`, as device tree
//! source.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # use fdt_dump::{DumpError, dump_blob};
//! # fn main() -> Result<(), DumpError> {
//! let dtb_data = std::fs::read("path/to/your.dtb").unwrap();
//!
//! // Write `/dts-v1/; ...` to stdout, without debug comments
//! dump_blob(&dtb_data, false, std::io::stdout().lock())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Streaming**: the tree is rendered while the structure block is read,
//!   it is never built in memory
//! - **Bounds-checked**: every read of the blob is checked, a corrupt image
//!   ends in a [`DumpError`] rather than a panic
//! - **Partial output**: everything decoded before an error stays written
//! - **Embedded blobs**: [`locate_blob`] finds an FDT inside a larger image
//! - **Live trees**: [`dump_live`] walks directories and files instead of tags
//!
//! ## Main Types
//!
//! - [`DeviceTreeDumper`] - Blob dumper
//! - [`Renderer`] - Output side shared by blob and live mode
//! - [`DtbHeader`] - DTB file header information
//! - [`MemoryReservation`] - Memory reservation entries
//! - [`PropertyValue`] - How a property value is rendered

pub mod dtb;
pub mod dump;
pub mod live;
pub mod render;

#[cfg(test)]
mod test_blob;

// Re-export main types
pub use dtb::{
    DeviceTreeDumper, DtbHeader, DtbToken, DumpError, MemoryReservation, PropertyValue, Result,
    locate_blob,
};
pub use dump::{DumpOptions, dump_blob, dump_buffer, dump_path};
pub use live::dump_live;
pub use render::Renderer;

// ABOUTME: Flattened device tree blob decoding module
// ABOUTME: Header, reservation map, structure block and embedded blob scanning

pub mod cursor;
pub mod dumper;
pub mod error;
pub mod header;
pub mod memory;
pub mod scan;
pub mod tokens;
pub mod value;

pub use dumper::DeviceTreeDumper;
pub use error::{DumpError, Result};
pub use header::DtbHeader;
pub use memory::MemoryReservation;
pub use scan::{locate_blob, locate_blob_with};
pub use tokens::DtbToken;
pub use value::PropertyValue;

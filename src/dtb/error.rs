// ABOUTME: Error types for device tree dumping
// ABOUTME: Covers blob decoding, embedded blob scanning and live tree I/O failures

use std::io;
use std::path::PathBuf;

use remain::sorted;
use thiserror::Error as ThisError;

/// Every condition that stops a dump.
///
/// None of these are recoverable for the current dump: the caller reports the
/// error and stops. Output written before the failure is left in place.
#[sorted]
#[derive(ThisError, Debug)]
pub enum DumpError {
    /// Magic number in the header is not 0xd00dfeed
    #[error("bad magic 0x{0:08x} in FDT header")]
    BadMagic(u32),
    /// Header fields contradict each other
    #[error("invalid FDT header: {0}")]
    InvalidHeader(&'static str),
    /// Property name offset points outside the strings block
    #[error("property name offset 0x{offset:x} is outside the strings block (size 0x{size:x})")]
    InvalidStringOffset { offset: usize, size: usize },
    /// Filesystem access failed while walking a live tree
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Scan mode found no plausible header in the buffer
    #[error("could not locate fdt magic")]
    NoEmbeddedBlob,
    /// Writing the rendered output failed
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
    /// Buffer is shorter than the header it claims to hold
    #[error("buffer too small for FDT header: need {needed} bytes, have {available}")]
    TruncatedHeader { needed: usize, available: usize },
    /// Node name runs off the end of the structure block
    #[error("node name at offset 0x{0:04x} is not terminated")]
    TruncatedName(usize),
    /// Property value runs off the end of the structure block
    #[error("property value at offset 0x{offset:04x} ({len} bytes) runs past the structure block")]
    TruncatedProperty { offset: usize, len: usize },
    /// Reservation map ends before its (0, 0) terminator
    #[error("memory reservation map at offset 0x{0:04x} is not terminated")]
    TruncatedReservationMap(usize),
    /// Property name in the strings block is not terminated
    #[error("property name at strings offset 0x{0:x} is not terminated")]
    TruncatedString(usize),
    /// Tag or property header runs off the end of the structure block
    #[error("structure block truncated at offset 0x{0:04x}")]
    TruncatedStructure(usize),
    /// End node without a matching begin node, or end of stream inside a node
    #[error("unbalanced nodes at offset 0x{offset:04x} (depth {depth})")]
    UnbalancedNodes { offset: usize, depth: usize },
    /// Tag value outside the known set
    #[error("unknown tag 0x{tag:08x} at offset 0x{offset:04x}")]
    UnknownTag { offset: usize, tag: u32 },
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, DumpError>;

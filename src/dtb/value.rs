// ABOUTME: Property value classification and formatting
// ABOUTME: Renders raw property bytes as strings, cells or a byte list

use core::fmt;

/// Property value as it will be rendered.
///
/// Borrows from the property bytes; classification never copies the value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue<'a> {
    /// Empty property
    Empty,
    /// One or more printable NUL-terminated strings
    Strings(Vec<&'a str>),
    /// Big-endian 32-bit cells
    Cells(Vec<u32>),
    /// Raw byte array
    Bytes(&'a [u8]),
}

impl<'a> PropertyValue<'a> {
    /// Classify raw property bytes
    pub fn from_bytes(data: &'a [u8]) -> Self {
        if data.is_empty() {
            return PropertyValue::Empty;
        }

        if let Some(strings) = parse_as_strings(data) {
            return PropertyValue::Strings(strings);
        }

        if data.len() % 4 == 0 {
            let cells = data
                .chunks_exact(4)
                .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect();
            return PropertyValue::Cells(cells);
        }

        PropertyValue::Bytes(data)
    }
}

/// Writes the value part of a property line, including the leading ` = `.
///
/// An empty value writes nothing so the line reads `name;`.
impl fmt::Display for PropertyValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Empty => Ok(()),
            PropertyValue::Strings(strings) => {
                f.write_str(" = ")?;
                for (i, s) in strings.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{s}\"")?;
                }
                Ok(())
            }
            PropertyValue::Cells(cells) => {
                f.write_str(" = <")?;
                for (i, cell) in cells.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "0x{cell:08x}")?;
                }
                f.write_str(">")
            }
            PropertyValue::Bytes(bytes) => {
                f.write_str(" = [")?;
                for (i, byte) in bytes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{byte:02x}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Split data into strings if it is a list of printable NUL-terminated strings.
///
/// The last byte must be NUL and every string must be non-empty, so `"a\0\0"`
/// or a lone `"\0"` are not string lists.
fn parse_as_strings(data: &[u8]) -> Option<Vec<&str>> {
    let body = data.strip_suffix(&[0])?;

    body.split(|&b| b == 0)
        .map(|s| {
            if s.is_empty() || !s.iter().all(|&b| (0x20..=0x7e).contains(&b)) {
                return None;
            }
            core::str::from_utf8(s).ok()
        })
        .collect()
}

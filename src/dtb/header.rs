// ABOUTME: DTB header structure definitions and parsing
// ABOUTME: Handles the version-dependent 28 to 40 byte device tree blob header

use super::cursor::be_u32_at;
use super::error::{DumpError, Result};

/// DTB header structure.
///
/// Fields past `last_comp_version` only exist from a given format version on
/// and are `None` for older blobs.
#[derive(Debug, Clone, PartialEq)]
pub struct DtbHeader {
    /// Magic number (should be 0xd00dfeed)
    pub magic: u32,
    /// Total size of the DTB
    pub totalsize: u32,
    /// Offset to structure block
    pub off_dt_struct: u32,
    /// Offset to strings block
    pub off_dt_strings: u32,
    /// Offset to memory reservation block
    pub off_mem_rsvmap: u32,
    /// Version of the DTB format
    pub version: u32,
    /// Last compatible version
    pub last_comp_version: u32,
    /// Boot CPU ID (version 2+)
    pub boot_cpuid_phys: Option<u32>,
    /// Size of strings block (version 3+)
    pub size_dt_strings: Option<u32>,
    /// Size of structure block (version 17+)
    pub size_dt_struct: Option<u32>,
}

impl DtbHeader {
    /// DTB magic number constant
    pub const MAGIC: u32 = 0xd00d_feed;

    /// Size of a version 1 header, the smallest there is
    pub const V1_SIZE: usize = 28;

    /// Size of a version 17 header
    pub const SIZE: usize = 40;

    /// Byte offsets of the header words
    pub(crate) const OFF_MAGIC: usize = 0;
    pub(crate) const OFF_TOTALSIZE: usize = 4;
    pub(crate) const OFF_DT_STRUCT: usize = 8;
    pub(crate) const OFF_DT_STRINGS: usize = 12;
    pub(crate) const OFF_MEM_RSVMAP: usize = 16;
    pub(crate) const OFF_VERSION: usize = 20;
    pub(crate) const OFF_LAST_COMP_VERSION: usize = 24;
    pub(crate) const OFF_BOOT_CPUID_PHYS: usize = 28;
    pub(crate) const OFF_SIZE_DT_STRINGS: usize = 32;
    pub(crate) const OFF_SIZE_DT_STRUCT: usize = 36;

    /// Header size declared by a given format version
    pub fn size_for_version(version: u32) -> usize {
        match version {
            0 | 1 => 28,
            2 => 32,
            3..=16 => 36,
            _ => Self::SIZE,
        }
    }

    /// Parse and validate the header at the start of `input`
    pub fn parse(input: &[u8]) -> Result<Self> {
        let word = |offset: usize| -> Result<u32> {
            be_u32_at(input, offset).ok_or(DumpError::TruncatedHeader {
                needed: offset + 4,
                available: input.len(),
            })
        };

        if input.len() < Self::V1_SIZE {
            return Err(DumpError::TruncatedHeader {
                needed: Self::V1_SIZE,
                available: input.len(),
            });
        }

        let magic = word(Self::OFF_MAGIC)?;
        if magic != Self::MAGIC {
            return Err(DumpError::BadMagic(magic));
        }

        let version = word(Self::OFF_VERSION)?;
        let needed = Self::size_for_version(version);
        if input.len() < needed {
            return Err(DumpError::TruncatedHeader {
                needed,
                available: input.len(),
            });
        }

        let header = DtbHeader {
            magic,
            totalsize: word(Self::OFF_TOTALSIZE)?,
            off_dt_struct: word(Self::OFF_DT_STRUCT)?,
            off_dt_strings: word(Self::OFF_DT_STRINGS)?,
            off_mem_rsvmap: word(Self::OFF_MEM_RSVMAP)?,
            version,
            last_comp_version: word(Self::OFF_LAST_COMP_VERSION)?,
            boot_cpuid_phys: (version >= 2)
                .then(|| word(Self::OFF_BOOT_CPUID_PHYS))
                .transpose()?,
            size_dt_strings: (version >= 3)
                .then(|| word(Self::OFF_SIZE_DT_STRINGS))
                .transpose()?,
            size_dt_struct: (version >= 17)
                .then(|| word(Self::OFF_SIZE_DT_STRUCT))
                .transpose()?,
        };
        header.validate()?;

        Ok(header)
    }

    /// Size of this header on disk
    pub fn header_size(&self) -> usize {
        Self::size_for_version(self.version)
    }

    /// Check that the offsets describe a layout that fits in `totalsize`
    fn validate(&self) -> Result<()> {
        let total = self.totalsize as usize;
        let header_size = self.header_size();

        if total < header_size {
            return Err(DumpError::InvalidHeader("totalsize is smaller than the header"));
        }
        if self.off_mem_rsvmap as usize >= total {
            return Err(DumpError::InvalidHeader(
                "memory reservation map offset is beyond totalsize",
            ));
        }
        if self.off_dt_struct as usize >= total {
            return Err(DumpError::InvalidHeader(
                "structure block offset is beyond totalsize",
            ));
        }
        // An empty strings block may start right at the end of the blob
        let strings_end_ok =
            self.size_dt_strings == Some(0) && self.off_dt_strings as usize == total;
        if self.off_dt_strings as usize >= total && !strings_end_ok {
            return Err(DumpError::InvalidHeader(
                "strings block offset is beyond totalsize",
            ));
        }
        if (self.off_dt_struct as usize) < header_size {
            return Err(DumpError::InvalidHeader(
                "structure block overlaps the header",
            ));
        }
        if (self.off_dt_strings as usize) < header_size {
            return Err(DumpError::InvalidHeader("strings block overlaps the header"));
        }

        Ok(())
    }

    /// Header fields as `name:\tvalue` pairs, in on-disk order.
    ///
    /// Optional fields only appear when the version carries them.
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("magic:\t\t", format!("0x{:x}", self.magic)),
            (
                "totalsize:\t\t",
                format!("0x{:x} ({})", self.totalsize, self.totalsize),
            ),
            ("off_dt_struct:\t", format!("0x{:x}", self.off_dt_struct)),
            ("off_dt_strings:\t", format!("0x{:x}", self.off_dt_strings)),
            ("off_mem_rsvmap:\t", format!("0x{:x}", self.off_mem_rsvmap)),
            ("version:\t\t", self.version.to_string()),
            ("last_comp_version:\t", self.last_comp_version.to_string()),
        ];
        if let Some(boot_cpuid_phys) = self.boot_cpuid_phys {
            fields.push(("boot_cpuid_phys:\t", format!("0x{boot_cpuid_phys:x}")));
        }
        if let Some(size_dt_strings) = self.size_dt_strings {
            fields.push(("size_dt_strings:\t", format!("0x{size_dt_strings:x}")));
        }
        if let Some(size_dt_struct) = self.size_dt_struct {
            fields.push(("size_dt_struct:\t", format!("0x{size_dt_struct:x}")));
        }
        fields
    }
}

// ABOUTME: Hand-assembled DTB images for tests
// ABOUTME: Lays out header, reservation map, structure and strings blocks

use crate::dtb::{DtbHeader, DtbToken};

enum Item {
    Word(u32),
    Name(String),
    Prop { name_offset: u32, value: Vec<u8> },
}

/// Builds a blob item by item.
///
/// The structure block is laid out when `build` is called, so property values
/// get the 8-byte alignment old format versions expect at their real offsets.
pub struct BlobBuilder {
    version: u32,
    reservations: Vec<(u64, u64)>,
    items: Vec<Item>,
    strings: Vec<u8>,
}

impl BlobBuilder {
    pub fn new() -> Self {
        Self::with_version(17)
    }

    pub fn with_version(version: u32) -> Self {
        Self {
            version,
            reservations: Vec::new(),
            items: Vec::new(),
            strings: Vec::new(),
        }
    }

    pub fn reserve(mut self, address: u64, size: u64) -> Self {
        self.reservations.push((address, size));
        self
    }

    pub fn begin_node(mut self, name: &str) -> Self {
        self.items.push(Item::Word(DtbToken::FDT_BEGIN_NODE));
        self.items.push(Item::Name(name.to_string()));
        self
    }

    pub fn end_node(self) -> Self {
        self.word(DtbToken::FDT_END_NODE)
    }

    pub fn nop(self) -> Self {
        self.word(DtbToken::FDT_NOP)
    }

    pub fn end(self) -> Self {
        self.word(DtbToken::FDT_END)
    }

    /// Raw word in the structure block, e.g. a bogus tag
    pub fn word(mut self, word: u32) -> Self {
        self.items.push(Item::Word(word));
        self
    }

    pub fn prop(mut self, name: &str, value: &[u8]) -> Self {
        let name_offset = self.intern(name);
        self.prop_at(name_offset, value)
    }

    /// Property whose name offset is taken as given
    pub fn prop_at(mut self, name_offset: u32, value: &[u8]) -> Self {
        self.items.push(Item::Prop {
            name_offset,
            value: value.to_vec(),
        });
        self
    }

    fn intern(&mut self, name: &str) -> u32 {
        let offset = self.strings.len() as u32;
        self.strings.extend_from_slice(name.as_bytes());
        self.strings.push(0);
        offset
    }

    /// Offset of the structure block in the built blob
    pub fn struct_offset(&self) -> usize {
        DtbHeader::SIZE + (self.reservations.len() + 1) * 16
    }

    pub fn build(self) -> Vec<u8> {
        let struct_offset = self.struct_offset();
        let mut blob = vec![0u8; struct_offset];

        let mut rsv = DtbHeader::SIZE;
        for (address, size) in &self.reservations {
            blob[rsv..rsv + 8].copy_from_slice(&address.to_be_bytes());
            blob[rsv + 8..rsv + 16].copy_from_slice(&size.to_be_bytes());
            rsv += 16;
        }

        for item in &self.items {
            match item {
                Item::Word(word) => blob.extend(word.to_be_bytes()),
                Item::Name(name) => {
                    blob.extend(name.as_bytes());
                    blob.push(0);
                    pad_to(&mut blob, 4);
                }
                Item::Prop { name_offset, value } => {
                    blob.extend(DtbToken::FDT_PROP.to_be_bytes());
                    blob.extend((value.len() as u32).to_be_bytes());
                    blob.extend(name_offset.to_be_bytes());
                    if self.version < 16 && value.len() >= 8 {
                        pad_to(&mut blob, 8);
                    }
                    blob.extend(value);
                    pad_to(&mut blob, 4);
                }
            }
        }
        let size_dt_struct = blob.len() - struct_offset;

        let strings_offset = blob.len();
        blob.extend(&self.strings);
        // Keep the strings block non-empty so its offset stays below totalsize
        if self.strings.is_empty() {
            blob.push(0);
        }
        let size_dt_strings = blob.len() - strings_offset;

        let words = [
            DtbHeader::MAGIC,
            blob.len() as u32,
            struct_offset as u32,
            strings_offset as u32,
            DtbHeader::SIZE as u32,
            self.version,
            16.min(self.version),
            0,
            size_dt_strings as u32,
            size_dt_struct as u32,
        ];
        for (chunk, word) in blob.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }

        blob
    }
}

fn pad_to(blob: &mut Vec<u8>, align: usize) {
    while blob.len() % align != 0 {
        blob.push(0);
    }
}

/// A small but complete tree used across tests
pub fn sample_blob() -> Vec<u8> {
    BlobBuilder::new()
        .reserve(0x8000_0000, 0x10_0000)
        .begin_node("")
        .prop("compatible", b"linux,dummy-virt\0")
        .prop("#address-cells", &2u32.to_be_bytes())
        .begin_node("chosen")
        .prop("bootargs", b"console=ttyS0\0")
        .end_node()
        .begin_node("uart@9000000")
        .prop("compatible", b"arm,pl011\0arm,primecell\0")
        .prop("reg", &[0, 0, 0, 0, 0x09, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x10, 0])
        .prop("dma-coherent", &[])
        .end_node()
        .end_node()
        .end()
        .build()
}

pub const SAMPLE_DTS: &str = "\
/dts-v1/;

/memreserve/ 0x80000000 0x100000;
/ {
    compatible = \"linux,dummy-virt\";
    #address-cells = <0x00000002>;
    chosen {
        bootargs = \"console=ttyS0\";
    };
    uart@9000000 {
        compatible = \"arm,pl011\", \"arm,primecell\";
        reg = <0x00000000 0x09000000 0x00000000 0x00001000>;
        dma-coherent;
    };
};
";

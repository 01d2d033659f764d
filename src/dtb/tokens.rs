// ABOUTME: DTB structure block token definitions
// ABOUTME: Maps the five structure block tags to and from their 32-bit codes

/// DTB token constants as defined in the device tree specification
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DtbToken {
    /// Begin node token (0x00000001)
    BeginNode,
    /// End node token (0x00000002)
    EndNode,
    /// Property token (0x00000003)
    Property,
    /// No-op token (0x00000004)
    Nop,
    /// End of structure token (0x00000009)
    End,
}

impl DtbToken {
    /// Begin node token constant
    pub const FDT_BEGIN_NODE: u32 = 0x00000001;
    /// End node token constant
    pub const FDT_END_NODE: u32 = 0x00000002;
    /// Property token constant
    pub const FDT_PROP: u32 = 0x00000003;
    /// No-op token constant
    pub const FDT_NOP: u32 = 0x00000004;
    /// End of structure token constant
    pub const FDT_END: u32 = 0x00000009;

    /// Convert u32 value to DtbToken
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            Self::FDT_BEGIN_NODE => Some(DtbToken::BeginNode),
            Self::FDT_END_NODE => Some(DtbToken::EndNode),
            Self::FDT_PROP => Some(DtbToken::Property),
            Self::FDT_NOP => Some(DtbToken::Nop),
            Self::FDT_END => Some(DtbToken::End),
            _ => None,
        }
    }

    /// Constant name of the token, as used in debug output
    pub fn name(self) -> &'static str {
        match self {
            DtbToken::BeginNode => "FDT_BEGIN_NODE",
            DtbToken::EndNode => "FDT_END_NODE",
            DtbToken::Property => "FDT_PROP",
            DtbToken::Nop => "FDT_NOP",
            DtbToken::End => "FDT_END",
        }
    }

    /// Name for a raw tag value, `FDT_???` when it is not a known token
    pub fn tag_name(value: u32) -> &'static str {
        Self::from_u32(value).map_or("FDT_???", Self::name)
    }
}

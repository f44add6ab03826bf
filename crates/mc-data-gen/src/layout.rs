//! Bit layout of the packed descriptor words.
//!
//! Property flags, one `u16` per property:
//!
//! ```text
//! bits 0-4   value count (1..=31)
//! bits 5-6   kind: 0 enum, 1 bool, 2 int from 0, 3 int from 1
//! bit  7     unused, always 0
//! bits 8-15  offset into `property::VALUES` (enum only, 0 otherwise)
//! ```
//!
//! Block properties, one `u16` per block:
//!
//! ```text
//! bits 0-10  offset into `block::PROPERTY_MAP`
//! bits 11-13 property count (0..=7)
//! bits 14-15 unused, always 0
//! ```
//!
//! Any decoder of the generated tables depends on this exact packing.

/// Dense index into the property tables.
pub type PropertyId = u8;
/// Dense index into the block tables.
pub type BlockId = u16;
/// Globally unique block state id.
pub type StateId = u16;

pub const PROPERTY_COUNT_MASK: u16 = 0x001f;
pub const PROPERTY_KIND_SHIFT: u32 = 5;
pub const PROPERTY_KIND_MASK: u16 = 0x0060;
pub const PROPERTY_OFFSET_SHIFT: u32 = 8;
pub const PROPERTY_OFFSET_MASK: u16 = 0xff00;

/// Largest value count of a single property.
pub const MAX_PROPERTY_VALUES: usize = 31;
/// Largest total of enum values across all properties.
pub const MAX_ENUM_VALUES: usize = 255;
/// Largest number of properties a [`PropertyId`] can address.
pub const MAX_PROPERTIES: usize = 256;

pub const BLOCK_OFFSET_MASK: u16 = 0x07ff;
pub const BLOCK_COUNT_SHIFT: u32 = 11;
pub const BLOCK_COUNT_MASK: u16 = 0x3800;

/// Largest number of properties on one block.
pub const MAX_BLOCK_PROPERTIES: usize = 7;
/// Largest starting offset of a block into the property map.
pub const MAX_PROPERTY_OFFSET: usize = 2047;
/// Number of distinct ids a [`StateId`] or [`BlockId`] can hold.
pub const MAX_IDS: usize = 1 << 16;

/// Value domain of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PropertyKind {
    /// String valued, looked up in `property::VALUES`.
    Enum = 0,
    /// `true` then `false`.
    Boolean = 1,
    /// `0..count`
    IntFrom0 = 2,
    /// `1..=count`
    IntFrom1 = 3,
}

impl PropertyKind {
    #[inline]
    pub const fn tag(self) -> u16 {
        self as u16
    }

    #[inline]
    pub const fn from_tag(tag: u16) -> Self {
        match tag & 0b11 {
            0 => Self::Enum,
            1 => Self::Boolean,
            2 => Self::IntFrom0,
            _ => Self::IntFrom1,
        }
    }

    #[inline]
    pub const fn is_int(self) -> bool {
        matches!(self, Self::IntFrom0 | Self::IntFrom1)
    }
}

/// Packed per-property descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct PropertyFlags(pub u16);

impl PropertyFlags {
    /// Packs a descriptor. The offset is only stored for [`PropertyKind::Enum`].
    ///
    /// Callers keep `count <= 31`; out of range bits are masked off.
    #[inline]
    pub const fn new(kind: PropertyKind, count: u8, enum_offset: u8) -> Self {
        let offset = match kind {
            PropertyKind::Enum => (enum_offset as u16) << PROPERTY_OFFSET_SHIFT,
            _ => 0,
        };
        Self(
            (count as u16 & PROPERTY_COUNT_MASK)
                | (kind.tag() << PROPERTY_KIND_SHIFT)
                | offset,
        )
    }

    #[inline]
    pub const fn count(self) -> u8 {
        (self.0 & PROPERTY_COUNT_MASK) as u8
    }

    #[inline]
    pub const fn kind(self) -> PropertyKind {
        PropertyKind::from_tag((self.0 & PROPERTY_KIND_MASK) >> PROPERTY_KIND_SHIFT)
    }

    /// Offset into the value string table, for enum properties.
    #[inline]
    pub const fn value_offset(self) -> Option<u8> {
        match self.kind() {
            PropertyKind::Enum => Some(((self.0 & PROPERTY_OFFSET_MASK) >> PROPERTY_OFFSET_SHIFT) as u8),
            _ => None,
        }
    }

    /// First value of an integer property.
    #[inline]
    pub const fn int_start(self) -> Option<u8> {
        match self.kind() {
            PropertyKind::IntFrom0 => Some(0),
            PropertyKind::IntFrom1 => Some(1),
            _ => None,
        }
    }
}

/// Packed per-block slice of the property map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct BlockProperties(pub u16);

impl BlockProperties {
    /// Callers keep `offset <= 2047` and `count <= 7`.
    #[inline]
    pub const fn new(offset: u16, count: u8) -> Self {
        Self((offset & BLOCK_OFFSET_MASK) | (((count as u16) << BLOCK_COUNT_SHIFT) & BLOCK_COUNT_MASK))
    }

    #[inline]
    pub const fn offset(self) -> u16 {
        self.0 & BLOCK_OFFSET_MASK
    }

    #[inline]
    pub const fn count(self) -> u8 {
        ((self.0 & BLOCK_COUNT_MASK) >> BLOCK_COUNT_SHIFT) as u8
    }

    /// Range of this block's entries in the property map.
    #[inline]
    pub fn range(self) -> std::ops::Range<usize> {
        let start = self.offset() as usize;
        start..start + self.count() as usize
    }
}

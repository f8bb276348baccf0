use bitflags::bitflags;

bitflags! {
    /// Flip flags stored in the high bits of a [`Gid`].
    #[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
    pub struct Flip: u32 {
        const HORIZONTAL = Gid::FLIPPED_HORIZONTALLY;
        const VERTICAL = Gid::FLIPPED_VERTICALLY;
        const DIAGONAL = Gid::FLIPPED_DIAGONALLY;
    }
}

/// Global tile id as stored in map layers.
/// 0 is an empty cell.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug, Hash, Ord, PartialOrd)]
pub struct Gid(pub u32);

impl Gid {
    pub const FLIPPED_HORIZONTALLY: u32 = 0x8000_0000;
    pub const FLIPPED_VERTICALLY: u32 = 0x4000_0000;
    pub const FLIPPED_DIAGONALLY: u32 = 0x2000_0000;
    const FLAGS: u32 = Self::FLIPPED_HORIZONTALLY | Self::FLIPPED_VERTICALLY | Self::FLIPPED_DIAGONALLY;

    /// Id with flip flags cleared.
    pub fn id(self) -> u32 {
        self.0 & !Self::FLAGS
    }

    pub fn flip(self) -> Flip {
        Flip::from_bits_truncate(self.0)
    }

    pub fn is_empty(self) -> bool {
        self.id() == 0
    }

    /// Flip flags expressed as a clockwise rotation in degrees, and whether the tile
    /// is mirrored horizontally before rotating.
    pub fn rotation(self) -> (u32, bool) {
        let flip = self.flip();
        let diagonal = flip.contains(Flip::DIAGONAL);
        let horizontal = flip.contains(Flip::HORIZONTAL);
        let vertical = flip.contains(Flip::VERTICAL);
        match (diagonal, horizontal, vertical) {
            (false, false, false) => (0, false),
            (false, true, false) => (0, true),
            (false, false, true) => (180, true),
            (false, true, true) => (180, false),
            (true, true, false) => (90, false),
            (true, false, true) => (270, false),
            (true, false, false) => (270, true),
            (true, true, true) => (90, true),
        }
    }
}

impl From<u32> for Gid {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

use rand::Rng;
use smallvec::SmallVec;
use crate::Tile;

/// Lower and upper factors applied to a scrambled delay.
pub const SCRAMBLE_RANGE: (f32, f32) = (0.6, 1.4);

/// One tile of an entity's animation.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct Frame {
    pub tile_id: u32,
    pub keyframe: Option<u32>,
    /// Duration in milliseconds
    pub delay: Option<u32>,
    pub scramble_delay: bool,
}

impl Frame {
    pub fn from_tile(tile: &Tile) -> Self {
        Self {
            tile_id: tile.id,
            keyframe: tile.meta.keyframe,
            delay: tile.meta.delay,
            scramble_delay: tile.meta.is_scrambled(),
        }
    }

    /// Delay to use for one showing of this frame.
    /// Scrambled delays are drawn from [0.6 * delay, 1.4 * delay).
    pub fn effective_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<u32> {
        let delay = self.delay?;
        if !self.scramble_delay || delay == 0 {
            return Some(delay);
        }
        let (low, high) = SCRAMBLE_RANGE;
        let delay = delay as f32;
        Some(rng.gen_range(delay * low..delay * high) as u32)
    }
}

/// Frames sharing an entity, ordered by keyframe.
/// Frames without a keyframe go last.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AnimationSequence {
    pub entity: String,
    pub frames: SmallVec<[Frame; 4]>,
}

impl AnimationSequence {

    pub fn new(entity: impl Into<String>, frames: impl IntoIterator<Item = Frame>) -> Self {
        let mut frames: SmallVec<[Frame; 4]> = frames.into_iter().collect();
        frames.sort_by_key(|frame| (frame.keyframe.is_none(), frame.keyframe, frame.tile_id));
        Self { entity: entity.into(), frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, keyframe: u32) -> Option<&Frame> {
        self.frames.iter().find(|frame| frame.keyframe == Some(keyframe))
    }

    pub fn keyframes(&self) -> impl Iterator<Item = u32> + '_ {
        self.frames.iter().filter_map(|frame| frame.keyframe)
    }

    /// True when keyframes are exactly 0..len.
    pub fn is_contiguous(&self) -> bool {
        self.frames
            .iter()
            .enumerate()
            .all(|(i, frame)| frame.keyframe == Some(i as u32))
    }

    /// Sum of unscrambled delays, in milliseconds.
    pub fn total_delay(&self) -> u32 {
        self.frames.iter().filter_map(|frame| frame.delay).sum()
    }
}

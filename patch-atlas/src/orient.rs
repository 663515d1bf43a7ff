//! [`TileTransform`]: the eight ways a square tile image can be rotated and mirrored, and
//! the table choosing one for a face's orientation, rotation, and flip.

use image::{RgbaImage, imageops};

use crate::Orientation;

/// One of the eight axis-aligned transformations of a square image.
///
/// The discriminant is `2 * q + m`, where `q` is the number of clockwise quarter turns and
/// `m` is 1 if the rotated image is then mirrored horizontally.
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, exhaust::Exhaust)]
#[repr(u8)]
pub enum TileTransform {
    /// Draw the tile unmodified.
    Identity = 0,
    /// Mirror horizontally.
    Mirror = 1,
    /// Rotate 90° clockwise.
    Clockwise = 2,
    /// Rotate 90° clockwise, then mirror.
    ClockwiseMirror = 3,
    /// Rotate 180°. Drawn as a point reflection of the source rather than via a
    /// transformed copy.
    Rotate180 = 4,
    /// Rotate 180°, then mirror.
    Rotate180Mirror = 5,
    /// Rotate 90° counterclockwise.
    Counterclockwise = 6,
    /// Rotate 90° counterclockwise, then mirror.
    CounterclockwiseMirror = 7,
}

/// How the flip flag of a face becomes the low bit of the transform index.
#[derive(Clone, Copy, Debug)]
enum FlipBit {
    /// flipped → 1, not flipped → 0.
    Direct,
    /// flipped → 0, not flipped → 1; these orientations have a mirrored axis convention.
    Inverted,
}

/// Per-orientation rule: the quarter-turn count is `(sign * rotation + offset) mod 4`.
#[derive(Clone, Copy, Debug)]
struct Rule {
    sign: i8,
    offset: i8,
    flip: FlipBit,
}

/// Indexed by orientation. Values beyond the table use the last rule.
#[rustfmt::skip]
const RULES: [Rule; 6] = [
    Rule { sign: -1, offset: 3, flip: FlipBit::Inverted },
    Rule { sign: 1, offset: 3, flip: FlipBit::Direct },
    Rule { sign: 1, offset: 2, flip: FlipBit::Direct },
    Rule { sign: -1, offset: 6, flip: FlipBit::Inverted },
    Rule { sign: -1, offset: 4, flip: FlipBit::Inverted },
    Rule { sign: 1, offset: 0, flip: FlipBit::Direct },
];

impl TileTransform {
    /// All transforms, in discriminant order.
    pub const ALL: [Self; 8] = [
        Self::Identity,
        Self::Mirror,
        Self::Clockwise,
        Self::ClockwiseMirror,
        Self::Rotate180,
        Self::Rotate180Mirror,
        Self::Counterclockwise,
        Self::CounterclockwiseMirror,
    ];

    /// Chooses the transform to draw a face's tile with, given the orientation of the patch
    /// and the rotation (quarter turns, taken modulo 4) and flip recorded on the face.
    ///
    /// This is a total function: orientations outside `0..=5` use the rule for 5.
    pub fn resolve(orientation: Orientation, rotation: u8, flip: bool) -> Self {
        let rule = RULES[orientation.index().unwrap_or(RULES.len() - 1)];
        let quarter_turns = (i16::from(rule.sign) * i16::from(rotation % 4)
            + i16::from(rule.offset))
        .rem_euclid(4) as u8;
        let flip_bit = match (rule.flip, flip) {
            (FlipBit::Direct, true) | (FlipBit::Inverted, false) => 1,
            (FlipBit::Direct, false) | (FlipBit::Inverted, true) => 0,
        };
        Self::ALL[usize::from(quarter_turns * 2 + flip_bit)]
    }

    /// Inverse of `transform as u8`.
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 8 {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }

    /// Returns the transform index, `0..=7`.
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Number of clockwise quarter turns applied before mirroring.
    #[inline]
    pub const fn quarter_turns(self) -> u8 {
        self as u8 / 2
    }

    /// Whether the image is mirrored horizontally after rotating.
    #[inline]
    pub const fn is_mirrored(self) -> bool {
        self as u8 % 2 == 1
    }

    /// Produces a transformed copy of `image`.
    ///
    /// This is the default source of pre-rotated tile variants; see
    /// [`TileStore::transformed_tile`](crate::TileStore::transformed_tile).
    pub fn apply(self, image: &RgbaImage) -> RgbaImage {
        let rotated = match self.quarter_turns() {
            0 => image.clone(),
            1 => imageops::rotate90(image),
            2 => imageops::rotate180(image),
            _ => imageops::rotate270(image),
        };
        if self.is_mirrored() {
            imageops::flip_horizontal(&rotated)
        } else {
            rotated
        }
    }
}

impl From<TileTransform> for u8 {
    #[inline]
    fn from(value: TileTransform) -> Self {
        value as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exhaust::Exhaust as _;
    use image::Rgba;
    use pretty_assertions::assert_eq;

    /// Expected transform indices, `[orientation][rotation] = (not flipped, flipped)`.
    const EXPECTED: [[(u8, u8); 4]; 6] = [
        [(7, 6), (5, 4), (3, 2), (1, 0)],
        [(6, 7), (0, 1), (2, 3), (4, 5)],
        [(4, 5), (6, 7), (0, 1), (2, 3)],
        [(5, 4), (3, 2), (1, 0), (7, 6)],
        [(1, 0), (7, 6), (5, 4), (3, 2)],
        [(0, 1), (2, 3), (4, 5), (6, 7)],
    ];

    #[test]
    fn resolve_all_combinations() {
        for (o, row) in EXPECTED.iter().enumerate() {
            for (r, &(plain, flipped)) in row.iter().enumerate() {
                let orientation = Orientation::new(o as u8);
                assert_eq!(
                    TileTransform::resolve(orientation, r as u8, false).index(),
                    plain,
                    "orientation {o} rotation {r} not flipped"
                );
                assert_eq!(
                    TileTransform::resolve(orientation, r as u8, true).index(),
                    flipped,
                    "orientation {o} rotation {r} flipped"
                );
            }
        }
    }

    #[test]
    fn flip_polarity_by_orientation_group() {
        for o in [0, 3, 4] {
            for r in 0..4 {
                assert!(!TileTransform::resolve(Orientation::new(o), r, true).is_mirrored());
                assert!(TileTransform::resolve(Orientation::new(o), r, false).is_mirrored());
            }
        }
        for o in [1, 2, 5] {
            for r in 0..4 {
                assert!(TileTransform::resolve(Orientation::new(o), r, true).is_mirrored());
                assert!(!TileTransform::resolve(Orientation::new(o), r, false).is_mirrored());
            }
        }
    }

    #[test]
    fn out_of_range_orientation_uses_last_rule() {
        for (o, r, flip) in itertools::iproduct!([6, 7, 200, 255], 0..4, [false, true]) {
            assert_eq!(
                TileTransform::resolve(Orientation::new(o), r, flip),
                TileTransform::resolve(Orientation::new(5), r, flip),
            );
        }
    }

    #[test]
    fn rotation_is_modulo_4() {
        for o in Orientation::ALL {
            assert_eq!(
                TileTransform::resolve(o, 6, true),
                TileTransform::resolve(o, 2, true)
            );
        }
    }

    #[test]
    fn index_round_trip() {
        for t in TileTransform::exhaust() {
            assert_eq!(TileTransform::from_index(t.index()), Some(t));
        }
        assert_eq!(TileTransform::from_index(8), None);
    }

    /// 2×2 image with a distinct color in each corner, for checking where they end up.
    fn corners() -> RgbaImage {
        RgbaImage::from_fn(2, 2, |x, y| Rgba([x as u8, y as u8, 0, 255]))
    }

    fn corner(image: &RgbaImage, x: u32, y: u32) -> [u8; 2] {
        let p = image.get_pixel(x, y).0;
        [p[0], p[1]]
    }

    #[test]
    fn apply_identity_and_mirror() {
        let image = corners();
        assert_eq!(TileTransform::Identity.apply(&image), image);
        let mirrored = TileTransform::Mirror.apply(&image);
        assert_eq!(corner(&mirrored, 0, 0), [1, 0]);
        assert_eq!(corner(&mirrored, 1, 1), [0, 1]);
    }

    #[test]
    fn apply_rotations() {
        let image = corners();
        // Clockwise: the bottom-left source corner moves to the top-left.
        assert_eq!(corner(&TileTransform::Clockwise.apply(&image), 0, 0), [0, 1]);
        assert_eq!(corner(&TileTransform::Rotate180.apply(&image), 0, 0), [1, 1]);
        // Counterclockwise: the top-right source corner moves to the top-left.
        assert_eq!(
            corner(&TileTransform::Counterclockwise.apply(&image), 0, 0),
            [1, 0]
        );
        // Clockwise then mirror is a transpose.
        assert_eq!(
            corner(&TileTransform::ClockwiseMirror.apply(&image), 1, 0),
            [0, 1]
        );
    }
}

//! Data structures for parsed ANI documents
//!
//! An ANI file identifies parts only by their declaration order. Every index
//! read from the file is wrapped in a [`PartIndex`] that was checked against
//! the declared part count, so a raw integer never indexes into a scene
//! object list unchecked.

use std::fmt;

use glam::Vec3;

use crate::error::{AniError, Result};

/// Index of a body part, in declaration order
///
/// Doubles as the index into the scene object list supplied at import time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-support", serde(transparent))]
pub struct PartIndex(u32);

impl PartIndex {
    /// The root part, always the first declared part
    pub const ROOT: Self = Self(0);

    /// Create a part index checked against the number of declared parts
    ///
    /// # Examples
    ///
    /// ```
    /// use re2mv_ani::PartIndex;
    ///
    /// assert!(PartIndex::new(2, 3).is_ok());
    /// assert!(PartIndex::new(3, 3).is_err());
    /// assert!(PartIndex::new(-1, 3).is_err());
    /// ```
    pub fn new(raw: i64, part_count: usize) -> Result<Self> {
        if let Ok(index) = u32::try_from(raw)
            && (index as usize) < part_count
        {
            return Ok(Self(index));
        }

        Err(AniError::IndexOutOfRange {
            context: "part index".to_string(),
            index: raw,
            bound: part_count,
        })
    }

    /// Iterate over every index in `0..part_count`
    pub fn all(part_count: usize) -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
        (0..part_count as u32).map(Self)
    }

    /// The raw index value
    pub fn get(self) -> u32 {
        self.0
    }

    /// The index as a `usize`, for slice access
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Whether this is the root part
    pub fn is_root(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for PartIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The hierarchy line of one part: the children it declares
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct PartDeclaration {
    /// Children in the order they appear on the line
    pub children: Vec<PartIndex>,
}

/// One animation frame
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    /// Root translation in native file convention
    pub root_translation: Vec3,
    /// Euler rotation triples in degrees, indexed by part
    ///
    /// The file stores these lines in reverse part order; the reader
    /// restores part order so `rotations[i]` belongs to part `i`.
    pub rotations: Vec<Vec3>,
}

impl Frame {
    /// Rotation triple for a part, in degrees
    pub fn rotation(&self, part: PartIndex) -> Option<Vec3> {
        self.rotations.get(part.as_usize()).copied()
    }

    /// Rotations in on-disk order: last part first, counting down to the root
    pub fn rotations_in_file_order(&self) -> impl Iterator<Item = (PartIndex, Vec3)> + '_ {
        PartIndex::all(self.rotations.len())
            .rev()
            .map(|part| (part, self.rotations[part.as_usize()]))
    }
}

/// A parsed ANI document
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct AniFile {
    /// Hierarchy table, one entry per part
    pub parts: Vec<PartDeclaration>,
    /// Rest position per part, native convention
    pub rest_positions: Vec<Vec3>,
    /// Animation frames in file order
    pub frames: Vec<Frame>,
}

impl AniFile {
    /// Number of declared parts
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Number of animation frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Children declared for a part
    pub fn children(&self, part: PartIndex) -> &[PartIndex] {
        self.parts
            .get(part.as_usize())
            .map_or(&[], |decl| decl.children.as_slice())
    }

    /// The parent of a part, if any part declares it as a child
    ///
    /// When several parts declare the same child the last declaration wins,
    /// which is how the parent links end up in the scene.
    pub fn parent_of(&self, part: PartIndex) -> Option<PartIndex> {
        PartIndex::all(self.part_count())
            .rev()
            .find(|&parent| self.children(parent).contains(&part))
    }

    /// Parts without a parent, in declaration order
    pub fn roots(&self) -> Vec<PartIndex> {
        PartIndex::all(self.part_count())
            .filter(|&part| self.parent_of(part).is_none())
            .collect()
    }

    /// Rest position of a part in native convention
    pub fn rest_position(&self, part: PartIndex) -> Option<Vec3> {
        self.rest_positions.get(part.as_usize()).copied()
    }

    /// Total number of child declarations in the hierarchy table
    pub fn link_count(&self) -> usize {
        self.parts.iter().map(|decl| decl.children.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(raw: i64) -> PartIndex {
        PartIndex::new(raw, 8).unwrap()
    }

    fn chain() -> AniFile {
        AniFile {
            parts: vec![
                PartDeclaration {
                    children: vec![idx(1), idx(2)],
                },
                PartDeclaration {
                    children: vec![idx(3)],
                },
                PartDeclaration::default(),
                PartDeclaration::default(),
            ],
            rest_positions: vec![Vec3::ZERO; 4],
            frames: Vec::new(),
        }
    }

    #[test]
    fn test_part_index_bounds() {
        assert_eq!(PartIndex::new(0, 1).unwrap(), PartIndex::ROOT);
        assert!(PartIndex::new(1, 1).is_err());
        assert!(PartIndex::new(0, 0).is_err());
        assert!(matches!(
            PartIndex::new(-4, 10),
            Err(AniError::IndexOutOfRange { index: -4, bound: 10, .. })
        ));
    }

    #[test]
    fn test_parent_lookup() {
        let file = chain();
        assert_eq!(file.parent_of(idx(0)), None);
        assert_eq!(file.parent_of(idx(1)), Some(idx(0)));
        assert_eq!(file.parent_of(idx(3)), Some(idx(1)));
        assert_eq!(file.roots(), vec![PartIndex::ROOT]);
        assert_eq!(file.link_count(), 3);
    }

    #[test]
    fn test_parent_lookup_last_declaration_wins() {
        let mut file = chain();
        file.parts[2].children.push(idx(3));
        assert_eq!(file.parent_of(idx(3)), Some(idx(2)));
    }

    #[test]
    fn test_rotations_in_file_order() {
        let frame = Frame {
            root_translation: Vec3::ZERO,
            rotations: vec![Vec3::X, Vec3::Y, Vec3::Z],
        };
        let order: Vec<_> = frame.rotations_in_file_order().collect();
        assert_eq!(
            order,
            vec![(idx(2), Vec3::Z), (idx(1), Vec3::Y), (idx(0), Vec3::X)]
        );
    }
}

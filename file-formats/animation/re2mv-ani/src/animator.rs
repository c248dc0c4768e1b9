//! Per-frame animation and keyframe recording
//!
//! Each frame moves the root, resets every part to the baseline rotation and
//! then applies the frame's rotation triples one part at a time as three
//! successive world-axis rotations: X by `-rx`, then Y by `-ry`, then Z by
//! `-rz`. Rotations do not commute, so the order and the negation are part
//! of the format.

use glam::Vec3;

use crate::builder::{check_import, reset_rotations};
use crate::error::Result;
use crate::scene::{Axis, Channel, SceneProvider};
use crate::types::{AniFile, Frame, PartIndex};

/// Counts of what an animation pass recorded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationStats {
    /// Frames applied
    pub frames: usize,
    /// Location keyframes recorded (root only)
    pub location_keys: usize,
    /// Rotation keyframes recorded (every part, every frame)
    pub rotation_keys: usize,
}

/// Applies the frames of a document to a scene
#[derive(Debug)]
pub struct Animator<'a> {
    file: &'a AniFile,
}

impl<'a> Animator<'a> {
    /// Create an animator for a parsed document
    pub fn new(file: &'a AniFile) -> Self {
        Self { file }
    }

    /// Apply every frame in order, recording keyframes at the frame index
    ///
    /// The scene must already hold the skeleton built by
    /// [`SkeletonBuilder`](crate::builder::SkeletonBuilder).
    pub fn animate<S: SceneProvider + ?Sized>(&self, scene: &mut S) -> Result<AnimationStats> {
        check_import(self.file, scene)?;

        let mut stats = AnimationStats::default();
        for (index, frame) in self.file.frames.iter().enumerate() {
            let frame_index = u32::try_from(index).unwrap_or(u32::MAX);
            stats.rotation_keys += self.apply_frame(scene, frame_index, frame);
            stats.location_keys += 1;
            stats.frames += 1;
        }

        log::debug!(
            "Animated {} frames ({} location keys, {} rotation keys)",
            stats.frames,
            stats.location_keys,
            stats.rotation_keys
        );
        Ok(stats)
    }

    /// Apply a single frame and record its keyframes
    ///
    /// Rotations start from the reset baseline, so applying the same frame
    /// twice leaves the scene in the same pose. Returns the number of
    /// rotation keyframes recorded.
    pub fn apply_frame<S: SceneProvider + ?Sized>(
        &self,
        scene: &mut S,
        frame_index: u32,
        frame: &Frame,
    ) -> usize {
        log::trace!("Applying frame {frame_index}");

        if self.file.part_count() > 0 {
            scene.set_local_position(PartIndex::ROOT, frame.root_translation);
            scene.record_keyframe(PartIndex::ROOT, Channel::Location, frame_index);
        }

        reset_rotations(scene);

        let mut recorded = 0;
        for (part, degrees) in frame.rotations_in_file_order() {
            rotate_part(scene, part, degrees);
            scene.record_keyframe(part, Channel::RotationEuler, frame_index);
            recorded += 1;
        }
        recorded
    }
}

/// Apply one rotation triple (degrees) to a single part
fn rotate_part<S: SceneProvider + ?Sized>(scene: &mut S, part: PartIndex, degrees: Vec3) {
    scene.rotate_global_axis(part, Axis::X, (-degrees.x).to_radians());
    scene.rotate_global_axis(part, Axis::Y, (-degrees.y).to_radians());
    scene.rotate_global_axis(part, Axis::Z, (-degrees.z).to_radians());
}

//! Skeleton construction: parenting, rest placement and rotation reset

use glam::Vec3;

use crate::error::{AniError, Result};
use crate::scene::SceneProvider;
use crate::types::{AniFile, PartIndex};
use crate::validation::{HierarchyPolicy, validate_ani_file};

/// Tilt about X applied to the root whenever rotations are reset
///
/// Compensates for the file's Y-up convention in a Z-up scene.
pub const ROOT_REST_TILT_DEGREES: f32 = 90.0;

/// Map a native rest position into parent-relative scene space: `(x, z, -y)`
pub fn remap_rest_position(native: Vec3) -> Vec3 {
    Vec3::new(native.x, native.z, -native.y)
}

/// Reset every scene object to its baseline rotation
///
/// Object 0 gets [`ROOT_REST_TILT_DEGREES`] about X, every other object the
/// identity, including objects beyond the parts of the file. Frame rotations
/// are applied as deltas on top of this baseline.
pub fn reset_rotations<S: SceneProvider + ?Sized>(scene: &mut S) {
    for part in PartIndex::all(scene.object_count()) {
        let euler = if part.is_root() {
            Vec3::new(ROOT_REST_TILT_DEGREES.to_radians(), 0.0, 0.0)
        } else {
            Vec3::ZERO
        };
        scene.set_local_rotation_euler(part, euler);
    }
}

/// Check that the scene has an object for every declared part
pub fn check_object_count<S: SceneProvider + ?Sized>(file: &AniFile, scene: &S) -> Result<()> {
    let available = scene.object_count();
    if available < file.part_count() {
        return Err(AniError::IndexOutOfRange {
            context: "highest part index has no scene object:".to_string(),
            index: i64::try_from(file.part_count() - 1).unwrap_or(i64::MAX),
            bound: available,
        });
    }
    Ok(())
}

/// Check a document against a scene before the first mutation
///
/// Hand-built documents may carry child indices or rotation targets beyond
/// the part count; those fail here with [`AniError::IndexOutOfRange`]. Links
/// are applied in declaration order, so repeated parents are resolved the
/// last-wins way.
pub fn check_import<S: SceneProvider + ?Sized>(file: &AniFile, scene: &S) -> Result<()> {
    validate_ani_file(file, HierarchyPolicy::LastWins)?;
    check_object_count(file, scene)
}

/// Builds the rest pose of a skeleton in a scene
#[derive(Debug)]
pub struct SkeletonBuilder<'a> {
    file: &'a AniFile,
}

impl<'a> SkeletonBuilder<'a> {
    /// Create a builder for a parsed document
    pub fn new(file: &'a AniFile) -> Self {
        Self { file }
    }

    /// Parent, place and reset every part
    ///
    /// Fails before touching the scene if the document is inconsistent or
    /// the scene has fewer objects than the file declares parts.
    pub fn build<S: SceneProvider + ?Sized>(&self, scene: &mut S) -> Result<()> {
        check_import(self.file, scene)?;

        self.link_parents(scene);
        self.place_rest_pose(scene);
        reset_rotations(scene);

        log::debug!(
            "Built skeleton: {} parts, {} parent links",
            self.file.part_count(),
            self.file.link_count()
        );
        Ok(())
    }

    /// Apply every declared child link in declaration order
    fn link_parents<S: SceneProvider + ?Sized>(&self, scene: &mut S) {
        for parent in PartIndex::all(self.file.part_count()) {
            for &child in self.file.children(parent) {
                log::trace!("Parenting part {child} to part {parent}");
                scene.set_parent(child, parent);
            }
        }
    }

    /// Place parts at their rest positions, remapped below the root
    fn place_rest_pose<S: SceneProvider + ?Sized>(&self, scene: &mut S) {
        for (part, &native) in PartIndex::all(self.file.part_count()).zip(&self.file.rest_positions) {
            let position = if scene.parent(part).is_some() {
                remap_rest_position(native)
            } else {
                native
            };
            scene.set_local_position(part, position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_ani;
    use crate::scene::Scene;
    use crate::types::PartDeclaration;

    const ARM: &str = "3\n1 1\n1 2\n0\n1 2 3\n4 5 6\n7 8 9\n0\n";

    fn idx(raw: i64) -> PartIndex {
        PartIndex::new(raw, 3).unwrap()
    }

    #[test]
    fn test_remap() {
        assert_eq!(remap_rest_position(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 3.0, -2.0));
    }

    #[test]
    fn test_build_chain() {
        let file = parse_ani(ARM).unwrap();
        let mut scene = Scene::with_objects(3);
        SkeletonBuilder::new(&file).build(&mut scene).unwrap();

        assert_eq!(scene.parent(idx(0)), None);
        assert_eq!(scene.parent(idx(1)), Some(idx(0)));
        assert_eq!(scene.parent(idx(2)), Some(idx(1)));

        let objects = scene.objects();
        assert_eq!(objects[0].location(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(objects[1].location(), Vec3::new(4.0, 6.0, -5.0));
        assert_eq!(objects[2].location(), Vec3::new(7.0, 9.0, -8.0));
    }

    #[test]
    fn test_reset_baseline() {
        let file = parse_ani(ARM).unwrap();
        let mut scene = Scene::with_objects(3);
        SkeletonBuilder::new(&file).build(&mut scene).unwrap();

        let root = scene.objects()[0].rotation_euler();
        assert!((root.x - 90f32.to_radians()).abs() < 1e-5);
        assert!(root.y.abs() < 1e-5 && root.z.abs() < 1e-5);
        for object in &scene.objects()[1..] {
            assert!(object.rotation_euler().abs_diff_eq(Vec3::ZERO, 1e-6));
        }
    }

    #[test]
    fn test_short_object_list_fails_without_mutation() {
        let file = parse_ani(ARM).unwrap();
        let mut scene = Scene::with_objects(2);
        let err = SkeletonBuilder::new(&file).build(&mut scene).unwrap_err();

        assert!(matches!(err, AniError::IndexOutOfRange { index: 2, bound: 2, .. }));
        assert_eq!(scene.parent(idx(1)), None);
        assert_eq!(scene.objects()[0].location(), Vec3::ZERO);
    }

    #[test]
    fn test_reset_covers_objects_beyond_parts() {
        let file = parse_ani("1\n0\n0 0 0\n0\n").unwrap();
        let mut scene = Scene::with_objects(3);
        scene.set_local_rotation_euler(idx(2), Vec3::new(0.5, 0.0, 0.0));

        SkeletonBuilder::new(&file).build(&mut scene).unwrap();

        assert!(scene.objects()[2].rotation_euler().abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn test_out_of_range_child_fails_without_mutation() {
        let file = AniFile {
            parts: vec![PartDeclaration {
                children: vec![PartIndex::new(5, 16).unwrap()],
            }],
            rest_positions: vec![Vec3::ONE],
            frames: Vec::new(),
        };
        let mut scene = Scene::with_objects(1);
        let before = scene.export();

        let err = SkeletonBuilder::new(&file).build(&mut scene).unwrap_err();

        assert!(matches!(err, AniError::IndexOutOfRange { index: 5, bound: 1, .. }));
        assert_eq!(scene.export(), before);
    }
}

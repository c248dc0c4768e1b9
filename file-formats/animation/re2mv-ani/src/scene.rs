//! Scene abstraction the importer writes into
//!
//! [`SceneProvider`] is the seam between the importer and a host
//! application: an ordered object list, index-aligned with the parts of the
//! file, with just enough transform API to parent, place, rotate and
//! keyframe objects. Rotations target one object explicitly; there is no
//! selection state.
//!
//! [`Scene`] is an in-memory implementation with Blender-like transform
//! semantics, used by the CLI and the tests.

use std::collections::BTreeMap;

use glam::{Mat3, Quat, Vec3};

use crate::types::PartIndex;

/// World axis for a global-axis rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// World X
    X,
    /// World Y
    Y,
    /// World Z
    Z,
}

impl Axis {
    /// Unit vector along the axis
    pub fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }
}

/// Transform channel a keyframe is recorded on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum Channel {
    /// Local position
    Location,
    /// Local rotation as XYZ Euler angles in radians
    RotationEuler,
}

/// Ordered list of scene objects the importer mutates
///
/// Object `i` corresponds to part `i` of the file. Euler angles are in
/// radians, XYZ order (rotate about X, then Y, then Z).
pub trait SceneProvider {
    /// Number of objects available
    fn object_count(&self) -> usize;

    /// Current parent of an object
    fn parent(&self, object: PartIndex) -> Option<PartIndex>;

    /// Make `parent` the parent of `child`, replacing any previous parent
    fn set_parent(&mut self, child: PartIndex, parent: PartIndex);

    /// Set the position relative to the parent (or the world for roots)
    fn set_local_position(&mut self, object: PartIndex, position: Vec3);

    /// Set the rotation relative to the parent from XYZ Euler angles
    fn set_local_rotation_euler(&mut self, object: PartIndex, euler: Vec3);

    /// Rotate one object about a fixed world axis, as a delta on its current orientation
    fn rotate_global_axis(&mut self, object: PartIndex, axis: Axis, angle: f32);

    /// Record the current value of a channel as a keyframe
    fn record_keyframe(&mut self, object: PartIndex, channel: Channel, frame: u32);
}

/// Convert XYZ Euler angles (radians) to a quaternion
pub fn euler_xyz_to_quat(euler: Vec3) -> Quat {
    Quat::from_rotation_z(euler.z) * Quat::from_rotation_y(euler.y) * Quat::from_rotation_x(euler.x)
}

/// Convert a quaternion to XYZ Euler angles (radians)
pub fn quat_to_euler_xyz(rotation: Quat) -> Vec3 {
    let m = Mat3::from_quat(rotation.normalize());
    let sin_y = (-m.x_axis.z).clamp(-1.0, 1.0);
    let y = sin_y.asin();

    if sin_y.abs() < 0.999_999 {
        Vec3::new(
            m.y_axis.z.atan2(m.z_axis.z),
            y,
            m.x_axis.y.atan2(m.x_axis.x),
        )
    } else {
        // Gimbal lock: fold the Z rotation into X
        Vec3::new((-m.z_axis.y).atan2(m.y_axis.y), y, 0.0)
    }
}

/// Keyframes recorded on one object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    location: BTreeMap<u32, Vec3>,
    rotation_euler: BTreeMap<u32, Vec3>,
}

impl Timeline {
    /// Keys of a channel, ordered by frame
    pub fn keys(&self, channel: Channel) -> &BTreeMap<u32, Vec3> {
        match channel {
            Channel::Location => &self.location,
            Channel::RotationEuler => &self.rotation_euler,
        }
    }

    /// Number of keys on a channel
    pub fn key_count(&self, channel: Channel) -> usize {
        self.keys(channel).len()
    }

    /// Value keyed at a frame
    pub fn value_at(&self, channel: Channel, frame: u32) -> Option<Vec3> {
        self.keys(channel).get(&frame).copied()
    }

    fn insert(&mut self, channel: Channel, frame: u32, value: Vec3) {
        let keys = match channel {
            Channel::Location => &mut self.location,
            Channel::RotationEuler => &mut self.rotation_euler,
        };
        keys.insert(frame, value);
    }
}

/// One object of the in-memory scene
#[derive(Debug, Clone)]
pub struct SceneObject {
    /// Display name
    pub name: String,
    parent: Option<PartIndex>,
    location: Vec3,
    rotation: Quat,
    timeline: Timeline,
}

impl SceneObject {
    /// Create an unparented object at the origin
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            location: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            timeline: Timeline::default(),
        }
    }

    /// Parent object, if any
    pub fn parent(&self) -> Option<PartIndex> {
        self.parent
    }

    /// Position relative to the parent
    pub fn location(&self) -> Vec3 {
        self.location
    }

    /// Rotation relative to the parent
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Rotation relative to the parent as XYZ Euler angles (radians)
    pub fn rotation_euler(&self) -> Vec3 {
        quat_to_euler_xyz(self.rotation)
    }

    /// Recorded keyframes
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

/// In-memory scene: an ordered list of objects
///
/// # Examples
///
/// ```
/// use re2mv_ani::scene::{Scene, SceneProvider};
///
/// let scene = Scene::with_objects(3);
/// assert_eq!(scene.object_count(), 3);
/// assert_eq!(scene.objects()[2].name, "part_2");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
}

impl Scene {
    /// Create a scene with `count` objects named `part_<i>`
    pub fn with_objects(count: usize) -> Self {
        Self::with_names((0..count).map(|index| format!("part_{index}")))
    }

    /// Create a scene with one object per name, in order
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            objects: names.into_iter().map(SceneObject::new).collect(),
        }
    }

    /// All objects in order
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Object for a part index
    pub fn object(&self, index: PartIndex) -> Option<&SceneObject> {
        self.objects.get(index.as_usize())
    }

    /// Rotation of an object in world space, following the parent chain
    pub fn world_rotation(&self, index: PartIndex) -> Quat {
        let mut rotation = Quat::IDENTITY;
        let mut current = Some(index);
        let mut steps = 0;

        while let Some(part) = current {
            let Some(object) = self.object(part) else {
                break;
            };
            rotation = object.rotation * rotation;
            current = object.parent;

            steps += 1;
            if steps > self.objects.len() {
                log::warn!("Parent chain of object {index} loops; stopping at {part}");
                break;
            }
        }

        rotation
    }

    /// Serializable snapshot of parents, transforms and keyframes
    pub fn export(&self) -> SceneExport {
        SceneExport {
            objects: self
                .objects
                .iter()
                .map(|object| ObjectExport {
                    name: object.name.clone(),
                    parent: object.parent.map(PartIndex::get),
                    location: object.location,
                    rotation_euler: object.rotation_euler(),
                    location_keys: export_keys(object.timeline.keys(Channel::Location)),
                    rotation_keys: export_keys(object.timeline.keys(Channel::RotationEuler)),
                })
                .collect(),
        }
    }

    fn object_mut(&mut self, index: PartIndex) -> Option<&mut SceneObject> {
        let object = self.objects.get_mut(index.as_usize());
        if object.is_none() {
            log::warn!("Scene has no object {index}; ignoring transform");
        }
        object
    }
}

impl SceneProvider for Scene {
    fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn parent(&self, object: PartIndex) -> Option<PartIndex> {
        self.object(object).and_then(SceneObject::parent)
    }

    fn set_parent(&mut self, child: PartIndex, parent: PartIndex) {
        if let Some(object) = self.object_mut(child) {
            object.parent = Some(parent);
        }
    }

    fn set_local_position(&mut self, object: PartIndex, position: Vec3) {
        if let Some(object) = self.object_mut(object) {
            object.location = position;
        }
    }

    fn set_local_rotation_euler(&mut self, object: PartIndex, euler: Vec3) {
        if let Some(object) = self.object_mut(object) {
            object.rotation = euler_xyz_to_quat(euler);
        }
    }

    fn rotate_global_axis(&mut self, object: PartIndex, axis: Axis, angle: f32) {
        let parent_world = self
            .parent(object)
            .map_or(Quat::IDENTITY, |parent| self.world_rotation(parent));
        let delta = Quat::from_axis_angle(axis.unit(), angle);

        if let Some(object) = self.object_mut(object) {
            // world' = delta * parent_world * local, expressed back in parent space
            object.rotation = (parent_world.inverse() * delta * parent_world * object.rotation).normalize();
        }
    }

    fn record_keyframe(&mut self, object: PartIndex, channel: Channel, frame: u32) {
        if let Some(object) = self.object_mut(object) {
            let value = match channel {
                Channel::Location => object.location,
                Channel::RotationEuler => quat_to_euler_xyz(object.rotation),
            };
            object.timeline.insert(channel, frame, value);
        }
    }
}

/// A recorded keyframe
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyExport {
    /// Frame index
    pub frame: u32,
    /// Channel value at the frame
    pub value: Vec3,
}

/// Snapshot of one scene object
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectExport {
    /// Object name
    pub name: String,
    /// Index of the parent object
    pub parent: Option<u32>,
    /// Final local position
    pub location: Vec3,
    /// Final local rotation, XYZ Euler radians
    pub rotation_euler: Vec3,
    /// Location keyframes
    pub location_keys: Vec<KeyExport>,
    /// Rotation keyframes, XYZ Euler radians
    pub rotation_keys: Vec<KeyExport>,
}

/// Snapshot of a whole scene
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct SceneExport {
    /// Objects in scene order
    pub objects: Vec<ObjectExport>,
}

fn export_keys(keys: &BTreeMap<u32, Vec3>) -> Vec<KeyExport> {
    keys.iter()
        .map(|(&frame, &value)| KeyExport { frame, value })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn idx(raw: i64) -> PartIndex {
        PartIndex::new(raw, 8).unwrap()
    }

    fn assert_vec3_near(actual: Vec3, expected: Vec3) {
        assert!(
            actual.abs_diff_eq(expected, 1e-4),
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_euler_round_trip() {
        let euler = Vec3::new(0.3, -0.2, 1.1);
        assert_vec3_near(quat_to_euler_xyz(euler_xyz_to_quat(euler)), euler);

        let tilt = Vec3::new(FRAC_PI_2, 0.0, 0.0);
        assert_vec3_near(quat_to_euler_xyz(euler_xyz_to_quat(tilt)), tilt);
    }

    #[test]
    fn test_euler_order_is_x_then_y_then_z() {
        // Rotating +X about X is a no-op, then Y by 90 sends it to -Z, then Z leaves it there
        let rotation = euler_xyz_to_quat(Vec3::new(FRAC_PI_2, FRAC_PI_2, FRAC_PI_2));
        assert_vec3_near(rotation * Vec3::X, Vec3::NEG_Z);
    }

    #[test]
    fn test_gimbal_lock_reconstructs_rotation() {
        let euler = Vec3::new(0.4, FRAC_PI_2, 0.7);
        let rotation = euler_xyz_to_quat(euler);
        let back = euler_xyz_to_quat(quat_to_euler_xyz(rotation));
        assert!(back.abs_diff_eq(rotation, 1e-4) || back.abs_diff_eq(-rotation, 1e-4));
    }

    #[test]
    fn test_global_rotation_on_root() {
        let mut scene = Scene::with_objects(1);
        scene.rotate_global_axis(idx(0), Axis::Z, FRAC_PI_2);
        assert_vec3_near(scene.objects()[0].rotation() * Vec3::X, Vec3::Y);
    }

    #[test]
    fn test_global_rotation_uses_world_axes_below_a_parent() {
        let mut scene = Scene::with_objects(2);
        scene.set_parent(idx(1), idx(0));
        scene.set_local_rotation_euler(idx(0), Vec3::new(FRAC_PI_2, 0.0, 0.0));

        scene.rotate_global_axis(idx(1), Axis::Z, FRAC_PI_2);

        // The child's world rotation is delta * parent, not parent * delta
        let world = scene.world_rotation(idx(1));
        let expected = Quat::from_rotation_z(FRAC_PI_2) * Quat::from_rotation_x(FRAC_PI_2);
        assert!(world.abs_diff_eq(expected, 1e-4) || world.abs_diff_eq(-expected, 1e-4));
    }

    #[test]
    fn test_keyframes_capture_current_values() {
        let mut scene = Scene::with_objects(1);
        scene.set_local_position(idx(0), Vec3::new(1.0, 2.0, 3.0));
        scene.record_keyframe(idx(0), Channel::Location, 4);
        scene.set_local_position(idx(0), Vec3::ZERO);
        scene.record_keyframe(idx(0), Channel::Location, 4);
        scene.record_keyframe(idx(0), Channel::Location, 5);

        let timeline = scene.objects()[0].timeline();
        assert_eq!(timeline.key_count(Channel::Location), 2);
        assert_eq!(timeline.value_at(Channel::Location, 4), Some(Vec3::ZERO));
        assert_eq!(timeline.key_count(Channel::RotationEuler), 0);
    }

    #[test]
    fn test_export_snapshot() {
        let mut scene = Scene::with_names(["hips", "leg"]);
        scene.set_parent(idx(1), idx(0));
        scene.record_keyframe(idx(1), Channel::RotationEuler, 0);

        let export = scene.export();
        assert_eq!(export.objects[1].name, "leg");
        assert_eq!(export.objects[1].parent, Some(0));
        assert_eq!(export.objects[1].rotation_keys.len(), 1);
        assert!(export.objects[0].location_keys.is_empty());
    }
}

//! Parser and skeleton importer for RE2MV `.ani` animation files.
//!
//! An `.ani` file describes a rigid hierarchical model: N parts identified by
//! declaration order, their child lists, a rest position per part and a list
//! of frames. Each frame holds one root translation and one Euler rotation
//! triple (degrees) per part.
//!
//! Importing happens in two phases:
//!
//! 1. [`parser`] reads the text into an [`AniFile`] without side effects.
//! 2. [`builder`] and [`animator`] write parent links, rest positions and
//!    keyframes into a [`SceneProvider`], an ordered object list supplied by
//!    the host and index-aligned with the file's parts.
//!
//! # Examples
//!
//! ```
//! use re2mv_ani::{ImportOptions, import_str};
//! use re2mv_ani::scene::{Channel, Scene};
//!
//! let text = "2\n1 1\n0\n0 0 0\n0 1 0\n1\n5 5 5\n0 0 0\n0 0 0\n";
//! let mut scene = Scene::with_objects(2);
//! let summary = import_str(text, &mut scene, &ImportOptions::default()).unwrap();
//!
//! assert_eq!(summary.animation.frames, 1);
//! let root = &scene.objects()[0];
//! assert_eq!(root.timeline().key_count(Channel::Location), 1);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod animator;
pub mod builder;
pub mod error;
pub mod import;
pub mod parser;
pub mod scene;
pub mod types;
pub mod validation;
pub mod writer;

pub use animator::{AnimationStats, Animator};
pub use builder::SkeletonBuilder;
pub use error::{AniError, Result};
pub use import::{
    ImportOptions, ImportSummary, apply, import_animation, import_animation_with, import_str,
};
pub use parser::{AniParser, load_ani, parse_ani};
pub use scene::{Axis, Channel, Scene, SceneProvider};
pub use types::{AniFile, Frame, PartDeclaration, PartIndex};
pub use validation::{HierarchyPolicy, validate_ani_file};
pub use writer::write_ani;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

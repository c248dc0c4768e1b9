//! One-call import: parse, build the skeleton, animate

use std::path::Path;

use crate::animator::{AnimationStats, Animator};
use crate::builder::SkeletonBuilder;
use crate::error::Result;
use crate::parser::AniParser;
use crate::scene::SceneProvider;
use crate::types::AniFile;
use crate::validation::HierarchyPolicy;

/// Settings for an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// How to treat parts declared under more than one parent
    pub hierarchy_policy: HierarchyPolicy,
}

impl ImportOptions {
    /// Options that accept multi-parent files, keeping the last declaration
    pub fn last_parent_wins() -> Self {
        Self {
            hierarchy_policy: HierarchyPolicy::LastWins,
        }
    }
}

/// What an import did to the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Parts declared by the file
    pub parts: usize,
    /// Parent links applied
    pub links: usize,
    /// Keyframes recorded by the animation pass
    pub animation: AnimationStats,
}

/// Import an ANI file into a scene with default options
///
/// # Examples
///
/// ```no_run
/// use re2mv_ani::import_animation;
/// use re2mv_ani::scene::Scene;
///
/// let mut scene = Scene::with_objects(15);
/// let summary = import_animation("walk.ani", &mut scene).unwrap();
/// println!("{} frames imported", summary.animation.frames);
/// ```
pub fn import_animation<P, S>(path: P, scene: &mut S) -> Result<ImportSummary>
where
    P: AsRef<Path>,
    S: SceneProvider + ?Sized,
{
    import_animation_with(path, scene, &ImportOptions::default())
}

/// Import an ANI file into a scene
///
/// The file is read and parsed completely before the scene is touched, so a
/// malformed file leaves the scene unchanged.
pub fn import_animation_with<P, S>(
    path: P,
    scene: &mut S,
    options: &ImportOptions,
) -> Result<ImportSummary>
where
    P: AsRef<Path>,
    S: SceneProvider + ?Sized,
{
    let path = path.as_ref();
    log::info!("Importing animation from {}", path.display());
    let file = AniParser::with_policy(options.hierarchy_policy).parse_file(path)?;
    apply(&file, scene)
}

/// Import ANI content held in memory
pub fn import_str<S: SceneProvider + ?Sized>(
    content: &str,
    scene: &mut S,
    options: &ImportOptions,
) -> Result<ImportSummary> {
    let file = AniParser::with_policy(options.hierarchy_policy).parse_str(content)?;
    apply(&file, scene)
}

/// Build and animate an already parsed document
pub fn apply<S: SceneProvider + ?Sized>(file: &AniFile, scene: &mut S) -> Result<ImportSummary> {
    SkeletonBuilder::new(file).build(scene)?;
    let animation = Animator::new(file).animate(scene)?;

    let summary = ImportSummary {
        parts: file.part_count(),
        links: file.link_count(),
        animation,
    };
    log::info!(
        "Imported {} parts and {} frames",
        summary.parts,
        summary.animation.frames
    );
    Ok(summary)
}

//! Validation functions for ANI documents

use crate::error::{AniError, Result};
use crate::types::{AniFile, PartDeclaration, PartIndex};

/// How to treat a part that is declared as the child of several parents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HierarchyPolicy {
    /// Reject the file with [`AniError::AmbiguousHierarchy`]
    #[default]
    Strict,
    /// Keep the last declaration, as older importers did
    LastWins,
}

/// Line number (1-based) of the hierarchy line that declares `part`'s children
pub(crate) fn hierarchy_line(part: PartIndex) -> usize {
    part.as_usize() + 2
}

/// Resolve the parent of every part from the hierarchy table
///
/// Checks the single-parent rule according to `policy` and rejects cycles.
pub fn resolve_parents(
    parts: &[PartDeclaration],
    policy: HierarchyPolicy,
) -> Result<Vec<Option<PartIndex>>> {
    let mut parents: Vec<Option<PartIndex>> = vec![None; parts.len()];

    for (parent, decl) in PartIndex::all(parts.len()).zip(parts) {
        for &child in &decl.children {
            let slot = parents.get_mut(child.as_usize()).ok_or_else(|| {
                AniError::IndexOutOfRange {
                    context: format!("child of part {parent}"),
                    index: i64::from(child.get()),
                    bound: parts.len(),
                }
            })?;

            match *slot {
                Some(previous) if previous == parent => {
                    log::warn!("Part {child} is listed twice as a child of part {parent}");
                }
                Some(previous) => match policy {
                    HierarchyPolicy::Strict => {
                        return Err(AniError::AmbiguousHierarchy {
                            line: hierarchy_line(parent),
                            child: child.get(),
                            first_parent: previous.get(),
                            second_parent: parent.get(),
                        });
                    }
                    HierarchyPolicy::LastWins => {
                        log::warn!(
                            "Part {child} re-parented from part {previous} to part {parent} (last declaration wins)"
                        );
                    }
                },
                None => {}
            }

            *slot = Some(parent);
        }
    }

    check_acyclic(&parents)?;
    Ok(parents)
}

/// Ensure that following parent links from any part terminates
fn check_acyclic(parents: &[Option<PartIndex>]) -> Result<()> {
    for start in PartIndex::all(parents.len()) {
        let mut current = parents[start.as_usize()];
        let mut steps = 0;

        while let Some(part) = current {
            if part == start || steps > parents.len() {
                return Err(AniError::CyclicHierarchy { part: start.get() });
            }
            current = parents[part.as_usize()];
            steps += 1;
        }
    }

    Ok(())
}

/// Validates an ANI document for structural consistency
///
/// Documents produced by the parser always pass; this is meant for
/// documents assembled or edited in memory before import or writing.
pub fn validate_ani_file(file: &AniFile, policy: HierarchyPolicy) -> Result<()> {
    let part_count = file.part_count();

    if u32::try_from(part_count).is_err() {
        return Err(AniError::ValidationError(format!(
            "Part count {part_count} does not fit the format"
        )));
    }

    resolve_parents(&file.parts, policy)?;

    if part_count == 0 && !file.frames.is_empty() {
        return Err(AniError::IndexOutOfRange {
            context: "root translation targets part".to_string(),
            index: 0,
            bound: 0,
        });
    }

    if file.rest_positions.len() != part_count {
        return Err(AniError::ValidationError(format!(
            "Rest position count ({}) doesn't match part count ({})",
            file.rest_positions.len(),
            part_count
        )));
    }

    for (index, frame) in file.frames.iter().enumerate() {
        if frame.rotations.len() > part_count {
            return Err(AniError::IndexOutOfRange {
                context: format!("rotation target in frame {index}:"),
                index: i64::try_from(part_count).unwrap_or(i64::MAX),
                bound: part_count,
            });
        }
        if frame.rotations.len() < part_count {
            return Err(AniError::ValidationError(format!(
                "Frame {} has {} rotations, expected {}",
                index,
                frame.rotations.len(),
                part_count
            )));
        }
    }

    Ok(())
}

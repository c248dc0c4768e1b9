//! ANI skeletal animation command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use glam::Vec3;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use re2mv_ani::scene::Scene;
use re2mv_ani::{AniFile, AniParser, HierarchyPolicy, PartIndex, apply, validate_ani_file, write_ani};

use crate::utils::{NodeType, TreeNode, TreeOptions, add_table_row, create_table, render_tree};

#[derive(Subcommand)]
pub enum AniCommands {
    /// Display information about an ANI file
    Info {
        /// Path to the ANI file
        file: PathBuf,

        /// Show a per-part table of parents, children and rest positions
        #[arg(short, long)]
        detailed: bool,

        /// Resolve parts declared under several parents to the last declaration
        #[arg(long)]
        last_parent_wins: bool,
    },

    /// Show the part hierarchy of an ANI file as a tree
    Tree {
        /// Path to the ANI file
        file: PathBuf,

        /// Maximum depth to display
        #[arg(long)]
        depth: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Show compact metadata inline
        #[arg(long)]
        compact: bool,

        /// Resolve parts declared under several parents to the last declaration
        #[arg(long)]
        last_parent_wins: bool,
    },

    /// Validate an ANI file
    Validate {
        /// Path to the ANI file
        file: PathBuf,

        /// Resolve parts declared under several parents to the last declaration
        #[arg(long)]
        last_parent_wins: bool,
    },

    /// Import an ANI file into an in-memory scene and export the result as JSON
    Import {
        /// Path to the ANI file
        file: PathBuf,

        /// Number of scene objects to create (defaults to the part count)
        #[arg(short = 'n', long, value_name = "COUNT")]
        objects: Option<usize>,

        /// Write the JSON export to this path instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Emit indented JSON
        #[arg(long)]
        pretty: bool,

        /// Resolve parts declared under several parents to the last declaration
        #[arg(long)]
        last_parent_wins: bool,
    },

    /// Rewrite an ANI file in canonical layout
    Normalize {
        /// Path to the input ANI file
        input: PathBuf,

        /// Path to write the normalized ANI file
        output: PathBuf,
    },
}

pub fn execute(command: AniCommands) -> Result<()> {
    match command {
        AniCommands::Info {
            file,
            detailed,
            last_parent_wins,
        } => execute_info(&file, detailed, policy(last_parent_wins)),
        AniCommands::Tree {
            file,
            depth,
            no_color,
            compact,
            last_parent_wins,
        } => {
            let options = TreeOptions {
                max_depth: depth,
                no_color,
                show_metadata: true,
                compact,
            };
            execute_tree(&file, &options, policy(last_parent_wins))
        }
        AniCommands::Validate {
            file,
            last_parent_wins,
        } => execute_validate(&file, policy(last_parent_wins)),
        AniCommands::Import {
            file,
            objects,
            output,
            pretty,
            last_parent_wins,
        } => execute_import(
            &file,
            objects,
            output.as_deref(),
            pretty,
            policy(last_parent_wins),
        ),
        AniCommands::Normalize { input, output } => execute_normalize(&input, &output),
    }
}

const fn policy(last_parent_wins: bool) -> HierarchyPolicy {
    if last_parent_wins {
        HierarchyPolicy::LastWins
    } else {
        HierarchyPolicy::Strict
    }
}

fn load(path: &Path, policy: HierarchyPolicy) -> Result<AniFile> {
    AniParser::with_policy(policy)
        .parse_file(path)
        .with_context(|| format!("Failed to parse ANI file: {}", path.display()))
}

fn format_vec3(v: Vec3) -> String {
    format!("({}, {}, {})", v.x, v.y, v.z)
}

fn format_parts(parts: &[PartIndex]) -> String {
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn execute_info(path: &Path, detailed: bool, policy: HierarchyPolicy) -> Result<()> {
    use console::style;

    let ani = load(path, policy)?;

    println!("\n{}", style("ANI File Information").bold().underlined());
    println!("File: {}", style(path.display()).cyan());
    println!("Parts: {}", style(ani.part_count()).green());
    println!("Parent Links: {}", style(ani.link_count()).green());
    println!("Frames: {}", style(ani.frame_count()).green());
    println!("Roots: {}", style(format_parts(&ani.roots())).yellow());

    if let Some(first) = ani.frames.first() {
        println!(
            "First Root Translation: {}",
            style(format_vec3(first.root_translation)).dim()
        );
    }

    if detailed && ani.part_count() > 0 {
        println!("\n{}", style("Parts").bold());
        let mut table = create_table(&["Part", "Parent", "Children", "Rest Position"]);

        for part in PartIndex::all(ani.part_count()) {
            let parent = ani
                .parent_of(part)
                .map_or_else(|| "-".to_string(), |p| p.to_string());
            let rest = ani
                .rest_position(part)
                .map_or_else(|| "-".to_string(), format_vec3);
            add_table_row(
                &mut table,
                vec![
                    part.to_string(),
                    parent,
                    format_parts(ani.children(part)),
                    rest,
                ],
            );
        }

        table.printstd();
    }

    Ok(())
}

fn build_part_node(ani: &AniFile, part: PartIndex) -> TreeNode {
    let node_type = if ani.parent_of(part).is_none() {
        NodeType::Root
    } else {
        NodeType::Part
    };

    let mut node = TreeNode::new(format!("part {part}"), node_type);
    if let Some(rest) = ani.rest_position(part) {
        node = node.with_metadata("rest", format_vec3(rest));
    }

    // Skip repeated declarations and children claimed by a later parent
    let children = ani.children(part);
    children
        .iter()
        .enumerate()
        .filter(|&(i, child)| !children[..i].contains(child))
        .filter(|&(_, &child)| ani.parent_of(child) == Some(part))
        .fold(node, |node, (_, &child)| node.add_child(build_part_node(ani, child)))
}

fn execute_tree(path: &Path, options: &TreeOptions, policy: HierarchyPolicy) -> Result<()> {
    let ani = load(path, policy)?;

    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    let root = ani.roots().into_iter().fold(
        TreeNode::new(file_name, NodeType::File)
            .with_metadata("parts", ani.part_count().to_string())
            .with_metadata("frames", ani.frame_count().to_string()),
        |tree, part| tree.add_child(build_part_node(&ani, part)),
    );

    print!("{}", render_tree(&root, options));

    Ok(())
}

fn execute_validate(path: &Path, policy: HierarchyPolicy) -> Result<()> {
    use console::style;

    let ani = load(path, policy)?;

    if let Err(err) = validate_ani_file(&ani, policy) {
        anyhow::bail!("Validation failed: {}", err);
    }

    println!(
        "✓ ANI file '{}' is valid ({} parts, {} frames)",
        style(path.display()).cyan(),
        style(ani.part_count()).yellow(),
        style(ani.frame_count()).yellow()
    );

    Ok(())
}

fn execute_import(
    path: &Path,
    objects: Option<usize>,
    output: Option<&Path>,
    pretty: bool,
    policy: HierarchyPolicy,
) -> Result<()> {
    let ani = load(path, policy)?;

    let mut scene = Scene::with_objects(objects.unwrap_or_else(|| ani.part_count()));
    let summary = apply(&ani, &mut scene)
        .with_context(|| format!("Failed to import ANI file: {}", path.display()))?;

    log::info!(
        "Imported {} parts and {} frames ({} rotation keys)",
        summary.parts,
        summary.animation.frames,
        summary.animation.rotation_keys
    );

    let export = scene.export();
    let json = if pretty {
        serde_json::to_string_pretty(&export)
    } else {
        serde_json::to_string(&export)
    }
    .context("Failed to serialize scene export")?;

    match output {
        Some(out) => {
            std::fs::write(out, json)
                .with_context(|| format!("Failed to write output file: {}", out.display()))?;
            log::info!("Wrote scene export to {}", out.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn execute_normalize(input: &Path, output: &Path) -> Result<()> {
    use console::style;

    let ani = load(input, HierarchyPolicy::LastWins)?;

    let output_file = File::create(output)
        .with_context(|| format!("Failed to create output file: {}", output.display()))?;
    let mut writer = BufWriter::new(output_file);

    write_ani(&ani, &mut writer).context("Failed to write normalized file")?;
    writer.flush().context("Failed to flush normalized file")?;

    println!(
        "✓ Normalized {} parts and {} frames into {}",
        style(ani.part_count()).yellow(),
        style(ani.frame_count()).yellow(),
        style(output.display()).green()
    );

    Ok(())
}

//! Parser implementation for ANI files
//!
//! The format is line oriented. Every line holds whitespace separated
//! numeric tokens and its meaning depends only on its position:
//!
//! ```text
//! N                              part count
//! c i_1 .. i_c                   N lines: child count and child indices
//! x y z                          N lines: rest position per part
//! F                              frame count
//! x y z                          per frame: root translation
//! rx ry rz                       per frame: N rotation lines, last part first
//! ```
//!
//! Parsing is all-or-nothing. Nothing is returned until the whole document
//! has been read and its hierarchy validated.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use glam::Vec3;

use crate::error::{AniError, Result};
use crate::types::{AniFile, Frame, PartDeclaration, PartIndex};
use crate::validation::{HierarchyPolicy, resolve_parents};

/// Parser for ANI skeletal animation files
///
/// # Examples
///
/// ```
/// use re2mv_ani::parser::AniParser;
///
/// let text = "2\n1 1\n0\n0 0 0\n0 1 0\n1\n0 0 0\n0 0 0\n0 0 0\n";
/// let file = AniParser::new().parse_str(text).unwrap();
/// assert_eq!(file.part_count(), 2);
/// assert_eq!(file.frame_count(), 1);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct AniParser {
    policy: HierarchyPolicy,
}

impl AniParser {
    /// Creates a parser that rejects parts with more than one parent
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with an explicit multiple-parent policy
    pub fn with_policy(policy: HierarchyPolicy) -> Self {
        Self { policy }
    }

    /// The multiple-parent policy in effect
    pub fn policy(&self) -> HierarchyPolicy {
        self.policy
    }

    /// Parses an ANI file from disk
    ///
    /// The file handle is scoped to this call and released on every exit
    /// path, including parse failures.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<AniFile> {
        let path = path.as_ref();
        log::debug!("Reading ANI file {}", path.display());
        let mut file = File::open(path)?;
        self.parse(&mut file)
    }

    /// Parses an ANI document from a reader
    pub fn parse<R: Read>(&self, reader: &mut R) -> Result<AniFile> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        match std::str::from_utf8(&bytes) {
            Ok(content) => self.parse_str(content),
            Err(_) => {
                log::warn!("ANI content contains invalid UTF-8, using lossy conversion");
                self.parse_str(&String::from_utf8_lossy(&bytes))
            }
        }
    }

    /// Parses an ANI document held in memory
    pub fn parse_str(&self, content: &str) -> Result<AniFile> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut cursor = LineCursor::new(content);

        let part_count = cursor.read_count("part count")?;
        log::debug!("Declared part count: {part_count}");

        let mut parts = Vec::with_capacity(part_count.min(cursor.remaining()));
        for _ in 0..part_count {
            parts.push(cursor.read_hierarchy(part_count)?);
        }

        let mut rest_positions = Vec::with_capacity(part_count.min(cursor.remaining()));
        for _ in 0..part_count {
            rest_positions.push(cursor.read_vec3("rest position")?);
        }

        let frame_count_line = cursor.position();
        let frame_count = cursor.read_count("frame count")?;
        log::debug!("Declared frame count: {frame_count}");
        if part_count == 0 && frame_count > 0 {
            return Err(AniError::malformed(
                frame_count_line,
                "0 frames for a file without parts",
                format!("{frame_count} frames"),
            ));
        }

        let mut frames = Vec::with_capacity(frame_count.min(cursor.remaining()));
        for _ in 0..frame_count {
            frames.push(cursor.read_frame(part_count)?);
        }

        let trailing = cursor.remaining_non_blank();
        if trailing > 0 {
            log::warn!(
                "Ignoring {trailing} non-empty line(s) after the last frame (from line {})",
                cursor.position() + 1
            );
        }

        resolve_parents(&parts, self.policy)?;

        Ok(AniFile {
            parts,
            rest_positions,
            frames,
        })
    }
}

/// Parses an ANI document with the default (strict) parser
pub fn parse_ani(content: &str) -> Result<AniFile> {
    AniParser::new().parse_str(content)
}

/// Loads an ANI file from disk with the default (strict) parser
pub fn load_ani<P: AsRef<Path>>(path: P) -> Result<AniFile> {
    AniParser::new().parse_file(path)
}

/// Sequential access to the lines of a document, tracking line numbers
struct LineCursor<'a> {
    lines: Vec<&'a str>,
    position: usize,
}

impl<'a> LineCursor<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            lines: content.lines().collect(),
            position: 0,
        }
    }

    /// 0-based index of the next line to be read
    fn position(&self) -> usize {
        self.position
    }

    /// Number of lines not read yet
    fn remaining(&self) -> usize {
        self.lines.len().saturating_sub(self.position)
    }

    fn next_tokens(&mut self, expected: &str) -> Result<(usize, Vec<&'a str>)> {
        let index = self.position;
        let line = self
            .lines
            .get(index)
            .copied()
            .ok_or_else(|| AniError::malformed(index, expected, "end of file"))?;
        self.position += 1;
        Ok((index, line.split_whitespace().collect()))
    }

    fn read_count(&mut self, what: &str) -> Result<usize> {
        let expected = format!("1 non-negative integer ({what})");
        let (index, tokens) = self.next_tokens(&expected)?;
        if tokens.len() != 1 {
            return Err(AniError::malformed(index, expected, describe_arity(&tokens)));
        }

        let count: i64 = parse_token(index, tokens[0], &expected)?;
        u32::try_from(count)
            .map(|count| count as usize)
            .map_err(|_| AniError::malformed(index, expected, format!("'{}'", tokens[0])))
    }

    fn read_hierarchy(&mut self, part_count: usize) -> Result<PartDeclaration> {
        let expected = "child count followed by that many child indices";
        let (index, tokens) = self.next_tokens(expected)?;
        let Some((&count_token, child_tokens)) = tokens.split_first() else {
            return Err(AniError::malformed(index, expected, "an empty line"));
        };

        let child_count: i64 = parse_token(index, count_token, expected)?;
        if child_count < 0 {
            return Err(AniError::malformed(
                index,
                expected,
                format!("negative child count {child_count}"),
            ));
        }
        if child_tokens.len() as i64 != child_count {
            return Err(AniError::malformed(
                index,
                format!("{} integers (child count {child_count} and its indices)", child_count + 1),
                describe_arity(&tokens),
            ));
        }

        let children = child_tokens
            .iter()
            .map(|token| {
                let raw: i64 = parse_token(index, token, "integer child index")?;
                PartIndex::new(raw, part_count).map_err(|_| AniError::IndexOutOfRange {
                    context: format!("child index on line {}:", index + 1),
                    index: raw,
                    bound: part_count,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PartDeclaration { children })
    }

    fn read_vec3(&mut self, what: &str) -> Result<Vec3> {
        let expected = format!("3 floats ({what})");
        let (index, tokens) = self.next_tokens(&expected)?;
        let &[x, y, z] = tokens.as_slice() else {
            return Err(AniError::malformed(index, expected, describe_arity(&tokens)));
        };

        Ok(Vec3::new(
            parse_token(index, x, &expected)?,
            parse_token(index, y, &expected)?,
            parse_token(index, z, &expected)?,
        ))
    }

    fn read_frame(&mut self, part_count: usize) -> Result<Frame> {
        let root_translation = self.read_vec3("root translation")?;

        // Rotation lines run from the last part down to the root
        let mut rotations = vec![Vec3::ZERO; part_count];
        for part in PartIndex::all(part_count).rev() {
            rotations[part.as_usize()] = self.read_vec3("rotation in degrees")?;
        }

        Ok(Frame {
            root_translation,
            rotations,
        })
    }

    fn remaining_non_blank(&self) -> usize {
        self.lines[self.position.min(self.lines.len())..]
            .iter()
            .filter(|line| !line.trim().is_empty())
            .count()
    }
}

fn parse_token<T: FromStr>(index: usize, token: &str, expected: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| AniError::malformed(index, expected, format!("non-numeric token '{token}'")))
}

fn describe_arity(tokens: &[&str]) -> String {
    match tokens.len() {
        0 => "an empty line".to_string(),
        1 => "1 token".to_string(),
        n => format!("{n} tokens"),
    }
}

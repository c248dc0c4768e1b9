//! Serialization of ANI documents back to their text form

use std::fmt;
use std::io::Write;

use glam::Vec3;

use crate::error::Result;
use crate::types::AniFile;

/// Writes an ANI document in the canonical layout
///
/// Floats use Rust's shortest round-trip representation, so parsing the
/// output yields the same document. Rotation lines are written last part
/// first, as the format requires.
pub fn write_ani<W: Write>(file: &AniFile, writer: &mut W) -> Result<()> {
    write!(writer, "{file}")?;
    Ok(())
}

fn write_vec3(f: &mut fmt::Formatter<'_>, v: Vec3) -> fmt::Result {
    writeln!(f, "{} {} {}", v.x, v.y, v.z)
}

/// Formats the document as ANI text
impl fmt::Display for AniFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.part_count())?;

        for decl in &self.parts {
            write!(f, "{}", decl.children.len())?;
            for child in &decl.children {
                write!(f, " {child}")?;
            }
            writeln!(f)?;
        }

        for position in &self.rest_positions {
            write_vec3(f, *position)?;
        }

        writeln!(f, "{}", self.frame_count())?;

        for frame in &self.frames {
            write_vec3(f, frame.root_translation)?;
            for (_, rotation) in frame.rotations_in_file_order() {
                write_vec3(f, rotation)?;
            }
        }

        Ok(())
    }
}

impl AniFile {
    /// Render the document as ANI text
    pub fn to_ani_string(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_ani;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_canonical_layout() {
        let text = "2\n1 1\n0\n1 2.5 -3\n0 0 0\n1\n5 5 5\n7 8 9\n1 2 3\n";
        let file = parse_ani(text).unwrap();
        assert_eq!(file.to_ani_string(), text);
    }

    #[test]
    fn test_normalizes_whitespace_and_reparses() {
        let messy = "1\r\n 0 \r\n1.50  2e0 3\r\n1\r\n0 0 0\r\n-90 0 0.125\r\n";
        let file = parse_ani(messy).unwrap();
        let written = file.to_ani_string();

        assert_eq!(written, "1\n0\n1.5 2 3\n1\n0 0 0\n-90 0 0.125\n");
        assert_eq!(parse_ani(&written).unwrap(), file);
    }

    #[test]
    fn test_write_to_io_matches_string() {
        let file = parse_ani("1\n0\n0.5 0 0\n1\n1 2 3\n4 5 6\n").unwrap();
        let mut buffer = Vec::new();
        write_ani(&file, &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), file.to_ani_string());
    }
}

//! Error handling for ANI parsing and import

use std::io;
use thiserror::Error;

/// Errors that can occur when reading or importing ANI files
#[derive(Debug, Error)]
pub enum AniError {
    /// An I/O error occurred while opening or reading the file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A line does not match the shape the grammar expects at that position
    #[error("Malformed ANI file at line {line}: expected {expected}, found {found}")]
    MalformedFormat {
        /// 1-based line number of the offending line
        line: usize,
        /// Description of the expected shape (arity and token type)
        expected: String,
        /// Description of what was actually found
        found: String,
    },

    /// A part index or the scene object list is outside the declared bounds
    #[error("Index out of range: {context} {index} is not below {bound}")]
    IndexOutOfRange {
        /// Where the index came from (child declaration, scene object list)
        context: String,
        /// The offending index
        index: i64,
        /// The exclusive upper bound
        bound: usize,
    },

    /// A part is declared as the child of more than one parent
    #[error(
        "Ambiguous hierarchy at line {line}: part {child} is declared as a child of both part {first_parent} and part {second_parent}"
    )]
    AmbiguousHierarchy {
        /// 1-based line number of the second declaration
        line: usize,
        /// The part with two parents
        child: u32,
        /// The parent declared first
        first_parent: u32,
        /// The parent declared second
        second_parent: u32,
    },

    /// The declared parent links contain a cycle
    #[error("Cyclic hierarchy: part {part} is its own ancestor")]
    CyclicHierarchy {
        /// A part on the cycle
        part: u32,
    },

    /// An in-memory document violates a structural invariant
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl AniError {
    /// Build a [`AniError::MalformedFormat`] for a 0-based line index
    pub(crate) fn malformed(
        line_index: usize,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::MalformedFormat {
            line: line_index + 1,
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Type alias for Results from ANI operations
pub type Result<T> = std::result::Result<T, AniError>;

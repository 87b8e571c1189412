//! Construction-time errors for tile maps and soil grids.

use std::error::Error;
use std::fmt;

/// Errors raised while building grids from a tile source.
///
/// Every variant is a construction-time failure: a board is never handed
/// a grid that produced one of these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// The tile source has no rows.
    EmptyTileMap,
    /// A row's length differs from the number of rows (the map must be square).
    RaggedRow {
        /// Index of the offending row.
        row: usize,
        /// Required row length.
        expected: usize,
        /// Actual row length.
        found: usize,
    },
    /// A flat tile slice does not hold `side * side` codes.
    FlatLength {
        /// Declared side length.
        side: usize,
        /// Required slice length.
        expected: usize,
        /// Actual slice length.
        found: usize,
    },
    /// `width * height` does not fit in `usize`.
    SizeOverflow {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
    /// A cell's values break the engine's numeric invariants.
    InvalidCell {
        /// Column of the offending cell.
        x: usize,
        /// Row of the offending cell.
        y: usize,
        /// Which invariant failed.
        reason: &'static str,
    },
    /// Two grids that must align have different dimensions.
    DimensionMismatch {
        /// Which grid failed the check.
        what: &'static str,
        /// Required `(width, height)`.
        expected: (usize, usize),
        /// Actual `(width, height)`.
        found: (usize, usize),
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTileMap => write!(f, "tile map has no rows"),
            Self::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "tile map is not square: row {row} has {found} tiles, expected {expected}"
            ),
            Self::FlatLength {
                side,
                expected,
                found,
            } => write!(
                f,
                "flat tile map of side {side} needs {expected} tiles, got {found}"
            ),
            Self::SizeOverflow { width, height } => {
                write!(f, "grid of {width}x{height} cells overflows usize")
            }
            Self::InvalidCell { x, y, reason } => {
                write!(f, "invalid cell at ({x}, {y}): {reason}")
            }
            Self::DimensionMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "{what} grid is {}x{}, expected {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
        }
    }
}

impl Error for BuildError {}

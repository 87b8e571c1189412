//! Soil humidity diffusion automaton.
//!
//! Grids are addressed by `(x, y)` with `x` the column and `y` the row, and
//! are stored row-major at `y * width + x`. Tile sources are read row-major
//! too, so tile `(row, col)` lands on cell `(x = col, y = row)`.

pub mod api;
pub mod board;
pub mod cell;
pub mod color;
pub mod config;
pub mod diffusion;
pub mod error;
pub mod tiles;
pub mod universe;

pub use board::{Board, PreviewBoard};
pub use cell::{Cell, Tile};
pub use color::Rgba;
pub use config::Playback;
pub use diffusion::{Action, DiffusionBoard};
pub use error::BuildError;
pub use tiles::{SoilLayout, TileMap};
pub use universe::Universe;

/// Fixed-size 2D grid. Out-of-bounds reads return `None`, writes are no-ops.
#[derive(Clone, PartialEq, Debug)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Copy> Grid<T> {
    #[must_use]
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }

    /// Wrap a row-major buffer.
    ///
    /// # Errors
    ///
    /// [`BuildError::SizeOverflow`] when `width * height` overflows,
    /// [`BuildError::DimensionMismatch`] when `cells.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, cells: Vec<T>) -> Result<Self, BuildError> {
        if cells.len() != area(width, height)? {
            // A flat buffer has no shape of its own; report it as one row.
            return Err(BuildError::DimensionMismatch {
                what: "cell buffer",
                expected: (width, height),
                found: (cells.len(), 1),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as usize) < self.width && y >= 0 && (y as usize) < self.height
    }

    #[must_use]
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width + x as usize)
    }

    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<T> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Returns whether the write landed inside the grid.
    pub fn set(&mut self, x: i32, y: i32, value: T) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    /// Row-major view of every cell.
    #[must_use]
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// `(x, y, value)` for every cell in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, T)> + '_ {
        let w = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &v)| ((i % w) as i32, (i / w) as i32, v))
    }

    #[must_use]
    pub fn map<U: Copy>(&self, f: impl FnMut(T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            cells: self.cells.iter().copied().map(f).collect(),
        }
    }
}

/// `width * height`, or [`BuildError::SizeOverflow`] when it does not fit.
pub(crate) fn area(width: usize, height: usize) -> Result<usize, BuildError> {
    width
        .checked_mul(height)
        .ok_or(BuildError::SizeOverflow { width, height })
}

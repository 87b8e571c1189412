//! Grid builder: turns a square tile map into humidity, rock, and rain grids.

use log::debug;

use crate::cell::{Cell, Tile};
use crate::color::{tile_color, Rgba};
use crate::error::BuildError;
use crate::{area, Grid};

/// Square map of tile codes, validated at construction.
///
/// Stored row-major; tile `(row, col)` maps to grid cell `(x = col, y = row)`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TileMap {
    side: usize,
    codes: Vec<u32>,
}

impl TileMap {
    /// Build from nested rows, `rows[row][col]`.
    ///
    /// # Errors
    ///
    /// [`BuildError::EmptyTileMap`] for no rows, [`BuildError::RaggedRow`]
    /// when any row's length differs from the row count.
    pub fn from_rows<R: AsRef<[u32]>>(rows: &[R]) -> Result<Self, BuildError> {
        let side = rows.len();
        if side == 0 {
            return Err(BuildError::EmptyTileMap);
        }
        let mut codes = Vec::with_capacity(area(side, side)?);
        for (row, tiles) in rows.iter().enumerate() {
            let tiles = tiles.as_ref();
            if tiles.len() != side {
                return Err(BuildError::RaggedRow {
                    row,
                    expected: side,
                    found: tiles.len(),
                });
            }
            codes.extend_from_slice(tiles);
        }
        Ok(Self { side, codes })
    }

    /// Build from a flat row-major slice, `codes[row * side + col]`.
    ///
    /// # Errors
    ///
    /// [`BuildError::EmptyTileMap`] for `side == 0`, [`BuildError::SizeOverflow`]
    /// when `side * side` overflows, [`BuildError::FlatLength`] when the slice
    /// does not hold exactly `side * side` codes.
    pub fn from_flat(codes: &[u32], side: usize) -> Result<Self, BuildError> {
        if side == 0 {
            return Err(BuildError::EmptyTileMap);
        }
        let expected = area(side, side)?;
        if codes.len() != expected {
            return Err(BuildError::FlatLength {
                side,
                expected,
                found: codes.len(),
            });
        }
        Ok(Self {
            side,
            codes: codes.to_vec(),
        })
    }

    #[must_use]
    pub fn side(&self) -> usize {
        self.side
    }

    /// Tile at `(row, col)`, if in range.
    #[must_use]
    pub fn tile(&self, row: usize, col: usize) -> Option<Tile> {
        (row < self.side && col < self.side)
            .then(|| Tile::from_code(self.codes[row * self.side + col]))
    }

    /// The map as a grid of tiles in the shared `(x = col, y = row)` layout.
    #[must_use]
    pub fn to_grid(&self) -> Grid<Tile> {
        Grid {
            width: self.side,
            height: self.side,
            cells: self.codes.iter().map(|&c| Tile::from_code(c)).collect(),
        }
    }
}

/// The three parallel grids derived from a tile map.
#[derive(Clone, PartialEq, Debug)]
pub struct SoilLayout {
    pub humidity: Grid<Cell>,
    pub rocks: Grid<bool>,
    pub rain: Grid<bool>,
}

/// Derive initial humidity, rock mask, and rain mask. Never mutates `map`.
#[must_use]
pub fn build_soil(map: &TileMap) -> SoilLayout {
    let tiles = map.to_grid();
    let layout = SoilLayout {
        humidity: tiles.map(Tile::cell),
        rocks: tiles.map(|t| t == Tile::Rock),
        rain: tiles.map(|t| t == Tile::Rain),
    };
    debug!(
        "built {0}x{0} soil grid: {1} rock, {2} rain",
        map.side(),
        count(&layout.rocks),
        count(&layout.rain),
    );
    layout
}

/// Static palette rendering of the map, for the non-simulated preview.
#[must_use]
pub fn preview_colors(map: &TileMap) -> Grid<Rgba> {
    map.to_grid().map(tile_color)
}

fn count(mask: &Grid<bool>) -> usize {
    mask.cells().iter().filter(|&&b| b).count()
}

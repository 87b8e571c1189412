//! The capability every renderable board shares, and the static preview board.

use crate::color::Rgba;
use crate::tiles::{preview_colors, TileMap};
use crate::Grid;

/// Minimal board surface driven once per frame by the host.
pub trait Board {
    /// `(width, height)` in cells.
    fn size(&self) -> (usize, usize);

    /// Advance exactly one tick.
    fn step(&mut self);

    /// One colour per cell, same dimensions as [`Board::size`].
    fn render(&self) -> Grid<Rgba>;

    /// Return to the state the board was built with.
    fn reset(&mut self);
}

/// Non-simulated view of a level: each tile drawn in its palette colour.
#[derive(Clone, Debug)]
pub struct PreviewBoard {
    colors: Grid<Rgba>,
}

impl PreviewBoard {
    #[must_use]
    pub fn new(map: &TileMap) -> Self {
        Self {
            colors: preview_colors(map),
        }
    }
}

impl Board for PreviewBoard {
    fn size(&self) -> (usize, usize) {
        self.colors.size()
    }

    fn step(&mut self) {}

    fn render(&self) -> Grid<Rgba> {
        self.colors.clone()
    }

    fn reset(&mut self) {}
}

//! WASM-facing wrapper: owns the boards, the playback settings, and the pixel buffer.

use log::info;
use wasm_bindgen::prelude::*;

use crate::board::{Board, PreviewBoard};
use crate::config::Playback;
use crate::diffusion::{Action, DiffusionBoard};
use crate::error::BuildError;
use crate::tiles::TileMap;

/// `MouseEvent.button` for the primary button.
const PRIMARY_BUTTON: u8 = 0;
/// `MouseEvent.button` for the secondary button.
const SECONDARY_BUTTON: u8 = 2;

/// One loaded level. Replaced wholesale by [`Universe::load_level`].
#[wasm_bindgen]
#[derive(Debug)]
pub struct Universe {
    board: DiffusionBoard,
    preview: PreviewBoard,
    playback: Playback,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl Universe {
    /// `tiles` is row-major, `side * side` codes long.
    ///
    /// # Errors
    ///
    /// Rejects tile slices that are not square.
    #[wasm_bindgen(constructor)]
    pub fn new(tiles: &[u32], side: usize) -> Result<Universe, JsError> {
        Self::from_tiles(tiles, side).map_err(JsError::from)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.board.state().width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.board.state().height()
    }

    /// Advance exactly one tick, regardless of playback.
    pub fn tick(&mut self) {
        self.board.step();
    }

    /// Advance as many ticks as the playback settings ask for; returns how many ran.
    pub fn frame(&mut self) -> u32 {
        let steps = self.playback.steps_per_frame();
        for _ in 0..steps {
            self.board.step();
        }
        steps
    }

    pub fn reset(&mut self) {
        self.board.reset();
    }

    /// Pointer position in cell coordinates; `(-1, -1)` clears focus.
    pub fn hover(&mut self, x: i32, y: i32) {
        self.board.set_hover(x, y);
    }

    /// Primary places rock at the hovered cell, secondary clears it.
    pub fn press(&mut self, button: u8) {
        match button {
            PRIMARY_BUTTON => self.board.apply(Action::PlaceRock),
            SECONDARY_BUTTON => self.board.apply(Action::ClearRock),
            _ => {}
        }
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.playback.toggle_pause()
    }

    pub fn cycle_speed(&mut self) -> u8 {
        self.playback.cycle_speed()
    }

    pub fn toggle_preview(&mut self) -> bool {
        self.playback.toggle_preview()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.board.generation()
    }

    /// Replace both boards with a new level. Playback settings carry over.
    ///
    /// # Errors
    ///
    /// Rejects tile slices that are not square; the current level is kept.
    pub fn load_level(&mut self, tiles: &[u32], side: usize) -> Result<(), JsError> {
        self.replace_level(tiles, side).map_err(JsError::from)
    }

    /// Repaint the pixel buffer from the active board.
    pub fn render(&mut self) {
        let active: &dyn Board = if self.playback.preview {
            &self.preview
        } else {
            &self.board
        };
        let frame = active.render();
        self.pixels.clear();
        self.pixels
            .extend(frame.cells().iter().flat_map(|c| c.to_array()));
    }

    /// Start of the RGBA buffer, `width * height * 4` bytes in scan-line order.
    #[must_use]
    pub fn pixels_ptr(&self) -> *const u8 {
        self.pixels.as_ptr()
    }

    #[must_use]
    pub fn pixels_len(&self) -> usize {
        self.pixels.len()
    }
}

impl Universe {
    /// Rust-side constructor.
    ///
    /// # Errors
    ///
    /// See [`TileMap::from_flat`].
    pub fn from_tiles(tiles: &[u32], side: usize) -> Result<Self, BuildError> {
        Self::from_map(&TileMap::from_flat(tiles, side)?)
    }

    /// # Errors
    ///
    /// See [`DiffusionBoard::new`].
    pub fn from_map(map: &TileMap) -> Result<Self, BuildError> {
        let mut universe = Self {
            board: DiffusionBoard::from_tiles(map)?,
            preview: PreviewBoard::new(map),
            playback: Playback::default(),
            pixels: Vec::new(),
        };
        universe.render();
        Ok(universe)
    }

    /// # Errors
    ///
    /// See [`TileMap::from_flat`]. On error the current level is kept.
    pub fn replace_level(&mut self, tiles: &[u32], side: usize) -> Result<(), BuildError> {
        let map = TileMap::from_flat(tiles, side)?;
        self.board = DiffusionBoard::from_tiles(&map)?;
        self.preview = PreviewBoard::new(&map);
        self.render();
        info!("loaded {side}x{side} level");
        Ok(())
    }

    #[must_use]
    pub fn board(&self) -> &DiffusionBoard {
        &self.board
    }

    #[must_use]
    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    /// The RGBA buffer filled by the last [`Universe::render`].
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

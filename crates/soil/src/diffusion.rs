//! Humidity diffusion through a permeable medium.
//!
//! Each tick every cell's humidity becomes a weighted mean of itself and its
//! four axis neighbours:
//!
//! ```text
//!              |v3|
//!           |v1|v0|v2|        h0' = (h0*k0 + Σ hi/ki) / (k0 + Σ 1/ki)
//!              |v4|
//! ```
//!
//! The centre is weighted by its own impermeability `k0` while neighbours are
//! weighted by their reciprocal, so an impermeable cell resists both losing
//! and gaining humidity. The grid edge reads as dry rock.
//!
//! All reads come from the tick-start snapshot and the result is swapped in
//! once the whole grid is computed, so cell order within a tick is irrelevant.
//! Humidity is not conserved.

use log::{debug, trace};

use crate::api::Neighbourhood;
use crate::board::Board;
use crate::cell::{Cell, MAX_HUMIDITY, ROCK_IMPERMEABILITY};
use crate::color::{color_of, Rgba};
use crate::error::BuildError;
use crate::tiles::{build_soil, SoilLayout, TileMap};
use crate::Grid;

/// Pointer action applied at the hovered cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    PlaceRock,
    ClearRock,
}

/// Live and initial humidity grids plus the rock and rain overlays.
#[derive(Clone, Debug)]
pub struct DiffusionBoard {
    initial: Grid<Cell>,
    values: Grid<Cell>,
    rocks: Grid<bool>,
    rain: Grid<bool>,
    hover: Option<(i32, i32)>,
    generation: u64,
}

impl DiffusionBoard {
    /// Take ownership of a built layout. Rain cells are pinned at full humidity.
    ///
    /// # Errors
    ///
    /// [`BuildError::DimensionMismatch`] when a mask differs in size from the
    /// humidity grid, [`BuildError::InvalidCell`] when a cell's impermeability
    /// is not a finite value of at least 1 or its humidity (after rain pinning)
    /// lies outside `[0, MAX_HUMIDITY]`.
    pub fn new(layout: SoilLayout) -> Result<Self, BuildError> {
        let SoilLayout {
            mut humidity,
            rocks,
            rain,
        } = layout;
        let expected = humidity.size();
        for (what, found) in [("rock mask", rocks.size()), ("rain mask", rain.size())] {
            if found != expected {
                return Err(BuildError::DimensionMismatch {
                    what,
                    expected,
                    found,
                });
            }
        }
        for (cell, &is_rain) in humidity.cells.iter_mut().zip(&rain.cells) {
            if is_rain {
                cell.humidity = MAX_HUMIDITY;
            }
        }
        validate_cells(&humidity)?;
        debug!("diffusion board ready: {}x{}", expected.0, expected.1);
        Ok(Self {
            initial: humidity.clone(),
            values: humidity,
            rocks,
            rain,
            hover: None,
            generation: 0,
        })
    }

    /// Build the layout from `map` and take ownership of it.
    ///
    /// # Errors
    ///
    /// See [`DiffusionBoard::new`].
    pub fn from_tiles(map: &TileMap) -> Result<Self, BuildError> {
        Self::new(build_soil(map))
    }

    /// Advance the simulation by one tick.
    pub fn step(&mut self) {
        let snapshot = &self.values;
        let next: Vec<Cell> = snapshot
            .iter()
            .map(|(x, y, cell)| {
                let is_rain = self.rain.get(x, y).unwrap_or(false);
                Cell {
                    humidity: diffuse(Neighbourhood::new(snapshot, x, y), is_rain),
                    ..cell
                }
            })
            .collect();
        self.values = Grid {
            width: snapshot.width,
            height: snapshot.height,
            cells: next,
        };
        self.generation += 1;
    }

    /// Restore the humidity grid built at construction. Rock edits persist.
    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.generation = 0;
        debug!("diffusion board reset");
    }

    /// Live grid; borrowing it immutably keeps callers out of engine memory.
    #[must_use]
    pub fn state(&self) -> &Grid<Cell> {
        &self.values
    }

    #[must_use]
    pub fn initial_state(&self) -> &Grid<Cell> {
        &self.initial
    }

    #[must_use]
    pub fn rocks(&self) -> &Grid<bool> {
        &self.rocks
    }

    #[must_use]
    pub fn rain(&self) -> &Grid<bool> {
        &self.rain
    }

    /// Ticks since construction or the last reset.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Mark or unmark a cell as rock. Impermeability is left untouched;
    /// out-of-range coordinates are ignored.
    pub fn set_rock(&mut self, x: i32, y: i32, value: bool) {
        if !self.rocks.set(x, y, value) {
            trace!("ignored rock edit outside the grid at ({x}, {y})");
        }
    }

    /// Focus a cell; out-of-range coordinates, `(-1, -1)` included, clear focus.
    pub fn set_hover(&mut self, x: i32, y: i32) {
        self.hover = self.values.in_bounds(x, y).then_some((x, y));
    }

    #[must_use]
    pub fn hover(&self) -> Option<(i32, i32)> {
        self.hover
    }

    /// Apply a pointer action at the focused cell, if any.
    pub fn apply(&mut self, action: Action) {
        let Some((x, y)) = self.hover else {
            return;
        };
        self.set_rock(x, y, action == Action::PlaceRock);
    }

    /// Sum of all humidity. The update rule does not conserve it.
    #[must_use]
    pub fn total_humidity(&self) -> f64 {
        self.values
            .cells()
            .iter()
            .map(|c| f64::from(c.humidity))
            .sum()
    }

    /// One colour per cell, with rock and hover overlays applied.
    #[must_use]
    pub fn render(&self) -> Grid<Rgba> {
        let cells = self
            .values
            .iter()
            .map(|(x, y, cell)| {
                let is_rock = self.rocks.get(x, y).unwrap_or(false);
                color_of(cell, is_rock, self.hover == Some((x, y)))
            })
            .collect();
        Grid {
            width: self.values.width,
            height: self.values.height,
            cells,
        }
    }
}

impl Board for DiffusionBoard {
    fn size(&self) -> (usize, usize) {
        self.values.size()
    }

    fn step(&mut self) {
        DiffusionBoard::step(self);
    }

    fn render(&self) -> Grid<Rgba> {
        DiffusionBoard::render(self)
    }

    fn reset(&mut self) {
        DiffusionBoard::reset(self);
    }
}

/// Reject cells the update rule cannot weigh: NaN, infinite or sub-unit
/// impermeability, and humidity outside `[0, MAX_HUMIDITY]`.
fn validate_cells(grid: &Grid<Cell>) -> Result<(), BuildError> {
    for (i, cell) in grid.cells.iter().enumerate() {
        let reason = if !(1.0..=ROCK_IMPERMEABILITY).contains(&cell.impermeability) {
            "impermeability must be finite and at least 1"
        } else if !(0.0..=MAX_HUMIDITY).contains(&cell.humidity) {
            "humidity outside [0, 1023]"
        } else {
            continue;
        };
        return Err(BuildError::InvalidCell {
            x: i % grid.width,
            y: i / grid.width,
            reason,
        });
    }
    Ok(())
}

/// Next humidity of the centre of `hood`, read entirely from its snapshot.
///
/// Rain sources and static (near-rock) cells keep their value. Sums run in
/// `f64` so `h0 * k0` cannot overflow for large finite impermeabilities.
#[must_use]
pub fn diffuse(hood: Neighbourhood<'_>, is_rain: bool) -> f32 {
    let centre = hood.centre();
    if is_rain || centre.is_static() {
        return centre.humidity;
    }
    let k0 = f64::from(centre.impermeability);
    let mut numerator = f64::from(centre.humidity) * k0;
    let mut denominator = k0;
    for neighbour in hood.axis() {
        let k = f64::from(neighbour.impermeability);
        numerator += f64::from(neighbour.humidity) / k;
        denominator += 1.0 / k;
    }
    let mean = numerator / denominator;
    debug_assert!(
        mean.is_finite(),
        "non-finite humidity at ({}, {})",
        hood.x,
        hood.y
    );
    mean.min(f64::from(MAX_HUMIDITY)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Tile;
    use proptest::prelude::*;

    fn layout_from_row(cells: &[Cell]) -> SoilLayout {
        let width = cells.len();
        SoilLayout {
            humidity: Grid::from_vec(width, 1, cells.to_vec()).unwrap(),
            rocks: Grid::new(width, 1, false),
            rain: Grid::new(width, 1, false),
        }
    }

    fn board_from_row(cells: &[Cell]) -> DiffusionBoard {
        DiffusionBoard::new(layout_from_row(cells)).unwrap()
    }

    fn humidities(board: &DiffusionBoard) -> Vec<f32> {
        board.state().cells().iter().map(|c| c.humidity).collect()
    }

    #[test]
    fn new_rejects_misaligned_masks() {
        let err = DiffusionBoard::new(SoilLayout {
            humidity: Grid::new(4, 4, Cell::air()),
            rocks: Grid::new(4, 3, false),
            rain: Grid::new(4, 4, false),
        })
        .unwrap_err();
        assert_eq!(
            err,
            BuildError::DimensionMismatch {
                what: "rock mask",
                expected: (4, 4),
                found: (4, 3),
            }
        );
    }

    #[test]
    fn new_rejects_sub_unit_impermeability() {
        // Built literally: `Cell::new` asserts the same bound.
        let leaky = Cell {
            humidity: 0.0,
            impermeability: 0.0,
        };
        let err = DiffusionBoard::new(layout_from_row(&[Cell::air(), leaky])).unwrap_err();
        assert!(
            matches!(err, BuildError::InvalidCell { x: 1, y: 0, .. }),
            "{err:?}"
        );
    }

    #[test]
    fn new_rejects_nan_and_infinite_impermeability() {
        for k in [f32::NAN, f32::INFINITY] {
            let cell = Cell {
                humidity: 0.0,
                impermeability: k,
            };
            assert!(matches!(
                DiffusionBoard::new(layout_from_row(&[cell])),
                Err(BuildError::InvalidCell { x: 0, y: 0, .. })
            ));
        }
    }

    #[test]
    fn new_rejects_humidity_out_of_range() {
        for h in [-100.0, MAX_HUMIDITY + 1.0, 5000.0, f32::NAN] {
            let cell = Cell {
                humidity: h,
                impermeability: 1.0,
            };
            assert!(
                matches!(
                    DiffusionBoard::new(layout_from_row(&[cell, Cell::air()])),
                    Err(BuildError::InvalidCell { x: 0, y: 0, .. })
                ),
                "humidity {h} accepted"
            );
        }
    }

    #[test]
    fn new_accepts_out_of_range_humidity_under_rain() {
        let board = DiffusionBoard::new(SoilLayout {
            humidity: Grid::from_vec(2, 1, vec![Cell::new(-5.0, 1.0), Cell::air()]).unwrap(),
            rocks: Grid::new(2, 1, false),
            rain: Grid::from_vec(2, 1, vec![true, false]).unwrap(),
        })
        .unwrap();
        assert_eq!(humidities(&board), vec![MAX_HUMIDITY, 0.0]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "non-finite humidity at (0, 0)")]
    fn diffuse_asserts_on_nan_mean() {
        // 0 / 0 from a zero-impermeability neighbour; `min` alone would hide it.
        let grid = Grid::from_vec(
            2,
            1,
            vec![
                Cell::air(),
                Cell {
                    humidity: 0.0,
                    impermeability: 0.0,
                },
            ],
        )
        .unwrap();
        let _ = diffuse(Neighbourhood::new(&grid, 0, 0), false);
    }

    #[test]
    fn single_cell_border_pull_is_below_float_resolution() {
        let mut board = board_from_row(&[Cell::new(500.0, 1.0)]);
        board.step();
        // The border's reciprocal weight is ~1e-38, lost next to k0 = 1.
        assert_eq!(board.state().get(0, 0).unwrap().humidity, 500.0);
    }

    #[test]
    fn two_air_cells_average() {
        let mut board = board_from_row(&[Cell::new(500.0, 1.0), Cell::air()]);
        board.step();
        assert_eq!(humidities(&board), vec![250.0, 250.0]);
    }

    #[test]
    fn centre_weighted_by_own_impermeability_neighbours_by_reciprocal() {
        let mut board = board_from_row(&[Cell::rain(), Tile::Soil(3).cell(), Cell::air()]);
        board.step();
        let soil = board.state().get(1, 0).unwrap().humidity;
        assert_eq!(soil, (1023.0f64 / 127.0) as f32);
        // Air next to dry soil only receives 0 / 125.
        assert_eq!(board.state().get(2, 0).unwrap().humidity, 0.0);
    }

    #[test]
    fn saturated_neighbours_never_exceed_max_humidity() {
        let mut board = board_from_row(&[
            Cell::rain(),
            Cell::new(MAX_HUMIDITY, 1.0),
            Cell::rain(),
        ]);
        for _ in 0..10 {
            board.step();
            assert!(humidities(&board).iter().all(|&h| h <= MAX_HUMIDITY));
        }
    }

    #[test]
    fn sentinel_cells_are_static() {
        let mut board = board_from_row(&[
            Cell::rain(),
            Cell::new(300.0, ROCK_IMPERMEABILITY),
            Cell::air(),
        ]);
        for _ in 0..50 {
            board.step();
            assert_eq!(
                board.state().get(1, 0).unwrap(),
                Cell::new(300.0, ROCK_IMPERMEABILITY)
            );
        }
    }

    #[test]
    fn rain_is_pinned_at_construction() {
        let board = DiffusionBoard::new(SoilLayout {
            humidity: Grid::new(2, 1, Cell::air()),
            rocks: Grid::new(2, 1, false),
            rain: Grid::from_vec(2, 1, vec![true, false]).unwrap(),
        })
        .unwrap();
        assert_eq!(humidities(&board), vec![MAX_HUMIDITY, 0.0]);
    }

    #[test]
    fn one_tick_moves_humidity_one_cell() {
        let map = TileMap::from_rows(&[[7u32, 1, 1, 1], [1, 1, 1, 1], [1, 1, 1, 1], [1, 1, 1, 1]])
            .unwrap();
        let mut board = DiffusionBoard::from_tiles(&map).unwrap();
        board.step();
        let s = board.state();
        assert!(s.get(1, 0).unwrap().humidity > 0.0);
        assert!(s.get(0, 1).unwrap().humidity > 0.0);
        // An in-place sweep would already have leaked into these.
        assert_eq!(s.get(2, 0).unwrap().humidity, 0.0);
        assert_eq!(s.get(1, 1).unwrap().humidity, 0.0);
    }

    #[test]
    fn impermeability_never_changes() {
        let map = TileMap::from_rows(&[[7u32, 2, 3], [4, 5, 6], [1, 9, 7]]).unwrap();
        let mut board = DiffusionBoard::from_tiles(&map).unwrap();
        let before: Vec<f32> = board.state().cells().iter().map(|c| c.impermeability).collect();
        for _ in 0..25 {
            board.step();
        }
        let after: Vec<f32> = board.state().cells().iter().map(|c| c.impermeability).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn reset_restores_initial_and_keeps_rock_edits() {
        let map = TileMap::from_rows(&[[7u32, 1, 1], [1, 2, 1], [1, 1, 6]]).unwrap();
        let mut board = DiffusionBoard::from_tiles(&map).unwrap();
        let initial = board.state().clone();
        for _ in 0..40 {
            board.step();
        }
        board.set_rock(1, 0, true);
        assert_ne!(board.state(), &initial);

        board.reset();
        assert_eq!(board.state(), &initial);
        assert_eq!(board.generation(), 0);
        assert_eq!(board.rocks().get(1, 0), Some(true));
        assert_eq!(board.rocks().get(2, 2), Some(true));
        assert_eq!(board.rain().get(0, 0), Some(true));
    }

    #[test]
    fn set_rock_toggle_leaves_cells_untouched() {
        let map = TileMap::from_rows(&[[1u32, 3], [7, 1]]).unwrap();
        let mut board = DiffusionBoard::from_tiles(&map).unwrap();
        let before = board.state().clone();
        board.set_rock(1, 0, true);
        assert_eq!(board.rocks().get(1, 0), Some(true));
        assert_eq!(board.state(), &before);
        board.set_rock(1, 0, false);
        assert_eq!(board.rocks().get(1, 0), Some(false));
        assert_eq!(board.state(), &before);
    }

    #[test]
    fn out_of_range_edits_are_noops() {
        let map = TileMap::from_rows(&[[1u32, 1], [1, 1]]).unwrap();
        let mut board = DiffusionBoard::from_tiles(&map).unwrap();
        let rocks = board.rocks().clone();
        board.set_rock(-1, 0, true);
        board.set_rock(2, 0, true);
        board.set_rock(0, 9, true);
        assert_eq!(board.rocks(), &rocks);
    }

    #[test]
    fn hover_and_actions() {
        let map = TileMap::from_rows(&[[1u32, 1], [1, 1]]).unwrap();
        let mut board = DiffusionBoard::from_tiles(&map).unwrap();

        board.apply(Action::PlaceRock);
        assert!(board.rocks().cells().iter().all(|&r| !r));

        board.set_hover(1, 1);
        assert_eq!(board.hover(), Some((1, 1)));
        board.apply(Action::PlaceRock);
        assert_eq!(board.rocks().get(1, 1), Some(true));
        board.apply(Action::ClearRock);
        assert_eq!(board.rocks().get(1, 1), Some(false));

        board.set_hover(-1, -1);
        assert_eq!(board.hover(), None);
        board.set_hover(1, 1);
        board.set_hover(2, 0);
        assert_eq!(board.hover(), None);
    }

    #[test]
    fn render_applies_overlays() {
        let map = TileMap::from_rows(&[[7u32, 6], [1, 1]]).unwrap();
        let mut board = DiffusionBoard::from_tiles(&map).unwrap();
        board.set_hover(0, 1);
        let frame = board.render();
        assert_eq!(frame.size(), (2, 2));
        assert_eq!(frame.get(0, 0), Some(Rgba::opaque(0, 0, 255)));
        assert_eq!(frame.get(1, 0), Some(Rgba::WHITE));
        assert_eq!(frame.get(0, 1), Some(Rgba::HIGHLIGHT));
        assert_eq!(frame.get(1, 1), Some(Rgba::opaque(255, 0, 0)));
    }

    #[test]
    fn humidity_is_not_conserved() {
        let mut board = board_from_row(&[Cell::new(800.0, 1.0), Cell::air(), Cell::air()]);
        assert_eq!(board.total_humidity(), 800.0);
        board.step();
        // [800, 0, 0] -> [400, 800/3, 0]
        assert_eq!(humidities(&board)[0], 400.0);
        assert!((board.total_humidity() - 666.67).abs() < 0.01);
    }

    fn arb_board(max_side: usize) -> impl Strategy<Value = DiffusionBoard> {
        (1..=max_side)
            .prop_flat_map(|side| {
                proptest::collection::vec(0u32..10, side * side).prop_map(move |c| (c, side))
            })
            .prop_map(|(codes, side)| {
                DiffusionBoard::from_tiles(&TileMap::from_flat(&codes, side).unwrap()).unwrap()
            })
    }

    proptest! {
        #[test]
        fn prop_humidity_stays_in_range(mut board in arb_board(12), steps in 0usize..40) {
            for _ in 0..steps {
                board.step();
            }
            for cell in board.state().cells() {
                prop_assert!((0.0..=MAX_HUMIDITY).contains(&cell.humidity));
            }
        }

        #[test]
        fn prop_rain_stays_saturated(mut board in arb_board(10), steps in 1usize..30) {
            for _ in 0..steps {
                board.step();
            }
            for (x, y, is_rain) in board.rain().iter() {
                if is_rain {
                    prop_assert_eq!(board.state().get(x, y).unwrap().humidity, MAX_HUMIDITY);
                }
            }
        }

        #[test]
        fn prop_reset_is_exact(mut board in arb_board(10), steps in 0usize..30) {
            let initial = board.state().clone();
            let rocks = board.rocks().clone();
            let rain = board.rain().clone();
            for _ in 0..steps {
                board.step();
            }
            board.reset();
            prop_assert_eq!(board.state(), &initial);
            prop_assert_eq!(board.rocks(), &rocks);
            prop_assert_eq!(board.rain(), &rain);
        }

        #[test]
        fn prop_cell_order_does_not_matter(
            mut board in arb_board(10),
            warmup in 0usize..10,
            seed in any::<u64>(),
        ) {
            for _ in 0..warmup {
                board.step();
            }
            let snapshot = board.state().clone();
            let (w, h) = snapshot.size();

            // Visit cells in a scrambled order, writing into a fresh buffer.
            let mut order: Vec<usize> = (0..w * h).collect();
            let mut state = seed | 1;
            for i in (1..order.len()).rev() {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                order.swap(i, (state % (i as u64 + 1)) as usize);
            }
            let mut expected = snapshot.clone();
            for i in order {
                let (x, y) = ((i % w) as i32, (i / w) as i32);
                let is_rain = board.rain().get(x, y).unwrap();
                let mut cell = snapshot.get(x, y).unwrap();
                cell.humidity = diffuse(Neighbourhood::new(&snapshot, x, y), is_rain);
                expected.set(x, y, cell);
            }

            board.step();
            prop_assert_eq!(board.state(), &expected);
        }
    }
}

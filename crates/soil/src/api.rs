//! Relative-offset reads around one cell of a tick-start snapshot.

use crate::cell::Cell;
use crate::Grid;

/// Axis neighbours in the order the update rule sums them: left, right, up, down.
pub const NEIGHBOUR_OFFSETS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Read-only view centred on `(x, y)`.
///
/// Out-of-bounds reads return [`Cell::border`], so the grid edge behaves
/// as dry, impassable rock.
#[derive(Clone, Copy, Debug)]
pub struct Neighbourhood<'a> {
    pub grid: &'a Grid<Cell>,
    pub x: i32,
    pub y: i32,
}

impl<'a> Neighbourhood<'a> {
    #[must_use]
    pub fn new(grid: &'a Grid<Cell>, x: i32, y: i32) -> Self {
        Self { grid, x, y }
    }

    #[must_use]
    pub fn get(&self, dx: i32, dy: i32) -> Cell {
        self.grid
            .get(self.x + dx, self.y + dy)
            .unwrap_or_else(Cell::border)
    }

    #[must_use]
    pub fn centre(&self) -> Cell {
        self.get(0, 0)
    }

    /// The four axis neighbours, virtual border cells included.
    #[must_use]
    pub fn axis(&self) -> [Cell; 4] {
        NEIGHBOUR_OFFSETS.map(|(dx, dy)| self.get(dx, dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn corner_sees_two_border_cells() {
        let grid = Grid::new(3, 3, Cell::new(10.0, 1.0));
        let hood = Neighbourhood::new(&grid, 0, 0);
        let [left, right, up, down] = hood.axis();
        assert_eq!(left, Cell::border());
        assert_eq!(up, Cell::border());
        assert_eq!(right, Cell::new(10.0, 1.0));
        assert_eq!(down, Cell::new(10.0, 1.0));
    }

    #[test]
    fn single_cell_grid_is_surrounded_by_border() {
        let grid = Grid::new(1, 1, Cell::new(500.0, 1.0));
        let hood = Neighbourhood::new(&grid, 0, 0);
        assert_eq!(hood.centre(), Cell::new(500.0, 1.0));
        assert!(hood.axis().iter().all(|c| *c == Cell::border()));
    }

    proptest! {
        #[test]
        fn prop_in_bounds_reads_match_grid(
            x in 0i32..16,
            y in 0i32..16,
            dx in -2i32..=2,
            dy in -2i32..=2,
        ) {
            let mut grid = Grid::new(16, 16, Cell::air());
            for i in 0..16 * 16 {
                grid.set(i % 16, i / 16, Cell::new(i as f32, 1.0));
            }
            let hood = Neighbourhood::new(&grid, x, y);
            let got = hood.get(dx, dy);
            match grid.get(x + dx, y + dy) {
                Some(cell) => prop_assert_eq!(got, cell),
                None => prop_assert_eq!(got, Cell::border()),
            }
        }
    }
}

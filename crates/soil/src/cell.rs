//! Cell and Tile types for the soil grid.

use std::fmt;

/// Upper bound on humidity; every update clamps to it.
pub const MAX_HUMIDITY: f32 = 1023.0;

/// Finite stand-in for infinite impermeability. Its reciprocal is tiny but
/// finite, which keeps every weight in the update rule well-defined.
pub const ROCK_IMPERMEABILITY: f32 = f32::MAX;

/// Cells at or above this impermeability are treated as static by `step`.
pub const STATIC_THRESHOLD: f32 = (f32::MAX / 5.0) * 4.0;

/// Base of the density-derived impermeability, `BASE^code`.
const IMPERMEABILITY_BASE: f64 = 5.0;

/// Tile classification read from the external level source.
///
/// Codes are the integer values of the level's soil layer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Tile {
    Air,
    /// Soil of density class 2..=5 (loose soil, hard soil, sand, clay).
    Soil(u32),
    Rock,
    Rain,
    /// Unknown code; behaves like soil of that density class.
    Other(u32),
}

impl Tile {
    pub const AIR: u32 = 1;
    pub const LOOSE_SOIL: u32 = 2;
    pub const HARD_SOIL: u32 = 3;
    pub const SAND: u32 = 4;
    pub const CLAY: u32 = 5;
    pub const ROCK: u32 = 6;
    pub const RAIN: u32 = 7;

    #[must_use]
    pub fn from_code(code: u32) -> Self {
        match code {
            Self::AIR => Self::Air,
            Self::LOOSE_SOIL..=Self::CLAY => Self::Soil(code),
            Self::ROCK => Self::Rock,
            Self::RAIN => Self::Rain,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            Self::Air => Self::AIR,
            Self::Rock => Self::ROCK,
            Self::Rain => Self::RAIN,
            Self::Soil(code) | Self::Other(code) => code,
        }
    }

    /// Initial cell state for this tile.
    #[must_use]
    pub fn cell(self) -> Cell {
        match self {
            Self::Air => Cell::air(),
            Self::Rock => Cell::rock(),
            Self::Rain => Cell::rain(),
            Self::Soil(code) | Self::Other(code) => Cell::new(0.0, density_impermeability(code)),
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Air => write!(f, "Air"),
            Self::Soil(Self::LOOSE_SOIL) => write!(f, "LooseSoil"),
            Self::Soil(Self::HARD_SOIL) => write!(f, "HardSoil"),
            Self::Soil(Self::SAND) => write!(f, "Sand"),
            Self::Soil(Self::CLAY) => write!(f, "Clay"),
            Self::Soil(code) => write!(f, "Soil({code})"),
            Self::Rock => write!(f, "Rock"),
            Self::Rain => write!(f, "Rain"),
            Self::Other(code) => write!(f, "Other({code})"),
        }
    }
}

/// `5^code`, saturated to [`ROCK_IMPERMEABILITY`] instead of overflowing to infinity.
fn density_impermeability(code: u32) -> f32 {
    let exponent = i32::try_from(code).unwrap_or(i32::MAX);
    let value = IMPERMEABILITY_BASE.powi(exponent);
    value.min(f64::from(ROCK_IMPERMEABILITY)) as f32
}

/// One grid cell: liquid quantity and resistance to exchanging it.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Cell {
    /// In `[0, MAX_HUMIDITY]`.
    pub humidity: f32,
    /// Never below 1; 1 is fully permeable air.
    pub impermeability: f32,
}

impl Default for Cell {
    fn default() -> Self {
        Self::air()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {:e})", self.humidity, self.impermeability)
    }
}

impl Cell {
    #[must_use]
    pub fn new(humidity: f32, impermeability: f32) -> Self {
        debug_assert!(impermeability >= 1.0, "impermeability must be >= 1");
        Self {
            humidity,
            impermeability,
        }
    }

    #[must_use]
    pub fn air() -> Self {
        Self::new(0.0, 1.0)
    }

    #[must_use]
    pub fn rock() -> Self {
        Self::new(0.0, ROCK_IMPERMEABILITY)
    }

    #[must_use]
    pub fn rain() -> Self {
        Self::new(MAX_HUMIDITY, 1.0)
    }

    /// The virtual neighbour standing in for cells beyond the grid edge.
    #[must_use]
    pub fn border() -> Self {
        Self::rock()
    }

    /// Whether `step` leaves this cell's humidity untouched.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.impermeability >= STATIC_THRESHOLD
    }
}

//! Playback configuration and its validation error.

use std::error::Error;
use std::fmt;

/// Side of the square levels shipped with the demo.
pub const DEFAULT_SIDE: usize = 16;

/// Highest speed setting; each frame runs `speed + 1` ticks.
pub const MAX_SPEED: u8 = 4;

/// Errors from building a [`Playback`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Speed above [`MAX_SPEED`].
    SpeedOutOfRange {
        /// The rejected speed.
        speed: u8,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpeedOutOfRange { speed } => {
                write!(f, "speed {speed} out of range 0..={MAX_SPEED}")
            }
        }
    }
}

impl Error for ConfigError {}

/// How the host drives the boards from frame to frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Playback {
    /// `0..=MAX_SPEED`.
    pub speed: u8,
    pub paused: bool,
    /// Render the static tile preview instead of the simulation.
    pub preview: bool,
}

impl Playback {
    /// # Errors
    ///
    /// [`ConfigError::SpeedOutOfRange`] when `speed > MAX_SPEED`.
    pub fn with_speed(speed: u8) -> Result<Self, ConfigError> {
        let playback = Self {
            speed,
            ..Self::default()
        };
        playback.validate()?;
        Ok(playback)
    }

    /// # Errors
    ///
    /// [`ConfigError::SpeedOutOfRange`] when `speed > MAX_SPEED`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.speed > MAX_SPEED {
            return Err(ConfigError::SpeedOutOfRange { speed: self.speed });
        }
        Ok(())
    }

    /// Ticks to run this frame; zero while paused.
    #[must_use]
    pub fn steps_per_frame(&self) -> u32 {
        if self.paused {
            0
        } else {
            u32::from(self.speed) + 1
        }
    }

    /// Next speed setting, wrapping back to 0 after [`MAX_SPEED`].
    pub fn cycle_speed(&mut self) -> u8 {
        self.speed = if self.speed >= MAX_SPEED {
            0
        } else {
            self.speed + 1
        };
        self.speed
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn toggle_preview(&mut self) -> bool {
        self.preview = !self.preview;
        self.preview
    }
}

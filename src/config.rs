use std::path::PathBuf;

use crate::error::{GameError, Result};

pub const BOARD_WIDTH: i32 = 40;
pub const BOARD_HEIGHT: i32 = 20;
pub const INITIAL_SNAKE_LENGTH: usize = 4;

pub const BASE_TICK_INTERVAL_MS: u64 = 120;
pub const TICK_INTERVAL_STEP_MS: u64 = 2;
pub const MIN_TICK_INTERVAL_MS: u64 = 40;

pub const ITEM_REWARD: u32 = 10;

pub const LOG_FILE: &str = "snake.log";

/// Largest board accepted. The snake and frame buffers are sized for the
/// whole board up front.
pub const MAX_BOARD_CELLS: u64 = 1 << 20;

/// What happens when the head leaves the board.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Edges are lethal.
    Walls,
    /// The head re-enters from the opposite edge.
    Wrap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub width: i32,
    pub height: i32,
    pub initial_length: usize,
    pub base_interval_ms: u64,
    pub interval_step_ms: u64,
    pub min_interval_ms: u64,
    pub reward: u32,
    pub boundary: BoundaryPolicy,
    /// Stretches the sleep while moving vertically, since terminal cells are
    /// taller than they are wide.
    pub vertical_slowdown: Option<f64>,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            initial_length: INITIAL_SNAKE_LENGTH,
            base_interval_ms: BASE_TICK_INTERVAL_MS,
            interval_step_ms: TICK_INTERVAL_STEP_MS,
            min_interval_ms: MIN_TICK_INTERVAL_MS,
            reward: ITEM_REWARD,
            boundary: BoundaryPolicy::Walls,
            vertical_slowdown: None,
            log_file: Some(PathBuf::from(LOG_FILE)),
        }
    }
}

impl Config {
    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.width < 2 || self.height < 1 {
            return Err(invalid(format!("board must be at least 2x1, got {}x{}", self.width, self.height)));
        }

        let cells = self.width as u64 * self.height as u64;
        if cells > MAX_BOARD_CELLS {
            return Err(invalid(format!(
                "board {}x{} has more than {} cells",
                self.width, self.height, MAX_BOARD_CELLS
            )));
        }

        // The initial snake is laid out leftwards from the centre cell
        if self.initial_length == 0 || self.initial_length as u64 > (self.width / 2 + 1) as u64 {
            return Err(invalid(format!(
                "initial length {} does not fit on a board {} wide",
                self.initial_length, self.width
            )));
        }

        if self.initial_length as u64 >= cells {
            return Err(invalid("initial snake leaves no room for an item".to_string()));
        }

        if self.min_interval_ms == 0 || self.base_interval_ms < self.min_interval_ms {
            return Err(invalid(format!(
                "tick interval floor {}ms must be positive and not above the base {}ms",
                self.min_interval_ms, self.base_interval_ms
            )));
        }

        if let Some(factor) = self.vertical_slowdown {
            if !(factor.is_finite() && factor >= 1.0) {
                return Err(invalid(format!("vertical slowdown {} must be at least 1.0", factor)));
            }
        }

        Ok(())
    }
}

fn invalid(msg: String) -> GameError {
    GameError::InvalidConfig(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_snake_that_does_not_fit() {
        let mut config = Config::default().with_size(6, 6);
        config.initial_length = 5;
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));

        config.initial_length = 4;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_oversized_boards() {
        assert!(matches!(
            Config::default().with_size(i32::MAX, i32::MAX).validate(),
            Err(GameError::InvalidConfig(_))
        ));
        assert!(Config::default().with_size(i32::MAX, 1).validate().is_err());
        assert!(Config::default().with_size(1024, 1024).validate().is_ok());
        assert!(Config::default().with_size(1025, 1024).validate().is_err());

        let mut config = Config::default();
        config.initial_length = usize::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_floor_above_base() {
        let mut config = Config::default();
        config.min_interval_ms = config.base_interval_ms + 1;
        assert!(config.validate().is_err());

        config.min_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_speedup_slowdown_factor() {
        let mut config = Config::default();
        config.vertical_slowdown = Some(0.5);
        assert!(config.validate().is_err());

        config.vertical_slowdown = Some(1.35);
        assert!(config.validate().is_ok());
    }
}

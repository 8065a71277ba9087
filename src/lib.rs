pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod grid;
pub mod input;
pub mod logging;
pub mod placement;
pub mod render;
pub mod snake;
pub mod state;
pub mod term;

pub use config::{BoundaryPolicy, Config};
pub use error::{GameError, Result};
pub use game::{run, Phase, SnakeGame, Summary};
pub use grid::{Grid, Point};
pub use snake::Direction;
pub use state::{GameState, Status};

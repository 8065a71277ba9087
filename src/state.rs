use std::collections::HashSet;
use std::time::Duration;

use rand::{rngs::StdRng, SeedableRng};

use crate::config::{BoundaryPolicy, Config};
use crate::error::{GameError, Result};
use crate::grid::{Grid, Point};
use crate::placement::place_item;
use crate::snake::{Direction, Snake};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Alive,
    Collided,
    /// The snake filled the board and no cell is left for an item.
    Won,
}

/// Everything one session mutates. Owned by the game loop and changed only by
/// [`GameState::tick`].
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) config: Config,
    pub(crate) grid: Grid,
    pub(crate) snake: Snake,
    pub(crate) item: Option<Point>,
    pub(crate) direction: Direction,
    pub(crate) pending_direction: Direction,
    pub(crate) score: u32,
    pub(crate) tick_interval_ms: u64,
    pub(crate) status: Status,
    pub(crate) rng: StdRng,
    seed: u64,
}

impl GameState {
    /// Fresh session: snake centred and facing right, item placed at random.
    pub fn new(config: Config, seed: u64) -> Result<Self> {
        config.validate()?;

        let grid = Grid::new(config.width, config.height);
        let snake = Snake::new(grid.center(), config.initial_length, Direction::Right, grid.capacity());
        let mut rng = StdRng::seed_from_u64(seed);
        let item = place_item(&grid, &snake, &mut rng);

        Ok(GameState {
            tick_interval_ms: config.base_interval_ms,
            config,
            grid,
            snake,
            item,
            direction: Direction::Right,
            pending_direction: Direction::Right,
            score: 0,
            status: Status::Alive,
            rng,
            seed,
        })
    }

    /// Session with an explicit layout, head first.
    pub fn with_layout(
        config: Config,
        body: &[Point],
        direction: Direction,
        item: Option<Point>,
        seed: u64,
    ) -> Result<Self> {
        let mut state = GameState::new(config, seed)?;
        let grid = state.grid;

        if body.is_empty() {
            return Err(GameError::InvalidLayout("snake has no segments".to_string()));
        }

        if let Some(p) = body.iter().find(|p| !grid.in_bounds(**p)) {
            return Err(GameError::InvalidLayout(format!("segment {:?} is off the board", p)));
        }

        let distinct: HashSet<&Point> = body.iter().collect();
        if distinct.len() != body.len() {
            return Err(GameError::InvalidLayout("segments overlap".to_string()));
        }

        let wraps = state.config.boundary == BoundaryPolicy::Wrap;
        let step = |a: Point, d: Direction| if wraps { grid.wrap(a + d) } else { a + d };
        for pair in body.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            // Only a wrapping board joins segments across an edge
            if !Direction::all().iter().any(|d| step(a, *d) == b) {
                return Err(GameError::InvalidLayout(format!("{:?} and {:?} are not neighbours", a, b)));
            }
        }

        if let Some(item) = item {
            if !grid.in_bounds(item) || distinct.contains(&item) {
                return Err(GameError::InvalidLayout(format!("item {:?} is not on a free cell", item)));
            }
        }

        state.snake = Snake::from_segments(body.iter().copied(), grid.capacity());
        state.item = item;
        state.direction = direction;
        state.pending_direction = direction;
        Ok(state)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn body(&self) -> Vec<Point> {
        self.snake.to_vec()
    }

    pub fn item(&self) -> Option<Point> {
        self.item
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_alive(&self) -> bool {
        self.status == Status::Alive
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// How long the loop should spend on one tick, vertical slowdown included.
    pub fn frame_interval(&self) -> Duration {
        let ms = match self.config.vertical_slowdown {
            Some(factor) if self.direction.is_vertical() => (self.tick_interval_ms as f64 * factor).ceil() as u64,
            _ => self.tick_interval_ms,
        };

        Duration::from_millis(ms)
    }
}

use log::debug;

use crate::config::BoundaryPolicy;
use crate::grid::Point;
use crate::placement::place_item;
use crate::snake::Direction;
use crate::state::{GameState, Status};
use TickOutcome::*;

/// What a single tick did to the snake.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Moved { new_head: Point, old_tail: Point },
    Grew { new_head: Point },
    Crashed,
    /// Nothing happened because the session already ended.
    Halted,
}

impl GameState {
    /// Advances the simulation by one cell.
    ///
    /// A requested direction that reverses the one currently applied is
    /// ignored. Collisions leave the body untouched and only flip the status,
    /// after which further ticks are no-ops.
    pub fn tick(&mut self, requested: Option<Direction>) -> TickOutcome {
        if self.status != Status::Alive {
            return Halted;
        }

        if let Some(dir) = requested {
            if !dir.is_reverse_of(self.direction) {
                self.pending_direction = dir;
            }
        }
        self.direction = self.pending_direction;

        let next = self.snake.head() + self.direction;
        let next = match self.config.boundary {
            BoundaryPolicy::Wrap => self.grid.wrap(next),
            BoundaryPolicy::Walls if !self.grid.in_bounds(next) => {
                self.status = Status::Collided;
                return Crashed;
            }
            BoundaryPolicy::Walls => next,
        };

        if self.snake.contains(next) {
            self.status = Status::Collided;
            return Crashed;
        }

        if Some(next) != self.item {
            let old_tail = self.snake.advance(next, false).unwrap_or(next);
            return Moved { new_head: next, old_tail };
        }

        self.snake.advance(next, true);
        self.score += self.config.reward;
        self.tick_interval_ms = self
            .tick_interval_ms
            .saturating_sub(self.config.interval_step_ms)
            .max(self.config.min_interval_ms);
        self.item = place_item(&self.grid, &self.snake, &mut self.rng);

        if self.item.is_none() {
            self.status = Status::Won;
        }

        debug!(
            "item eaten at {:?}: score {}, length {}, interval {}ms",
            next,
            self.score,
            self.snake.len(),
            self.tick_interval_ms
        );

        Grew { new_head: next }
    }
}

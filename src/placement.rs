use rand::Rng;

use crate::grid::{Grid, Point};
use crate::snake::Snake;

/// Random draws before falling back to a linear scan. Rejection sampling slows
/// down badly once the snake covers most of the board.
pub const MAX_RANDOM_ATTEMPTS: usize = 64;

/// Picks a cell not covered by the snake, or `None` if the board is full.
pub fn place_item<R: Rng + ?Sized>(grid: &Grid, snake: &Snake, rng: &mut R) -> Option<Point> {
    if snake.len() >= grid.capacity() {
        return None;
    }

    for _ in 0..MAX_RANDOM_ATTEMPTS {
        let candidate = Point::new(rng.gen_range(0..grid.width()), rng.gen_range(0..grid.height()));
        if !snake.contains(candidate) {
            return Some(candidate);
        }
    }

    grid.cells().find(|cell| !snake.contains(*cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::Direction;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn never_lands_on_the_snake() {
        let grid = Grid::new(8, 8);
        let snake = Snake::new(Point::new(4, 4), 5, Direction::Right, grid.capacity());
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let item = place_item(&grid, &snake, &mut rng).unwrap();
            assert!(grid.in_bounds(item));
            assert!(!snake.contains(item));
        }
    }

    #[test]
    fn finds_the_last_free_cell() {
        let grid = Grid::new(4, 4);
        let free = Point::new(2, 1);
        let snake = Snake::from_segments(grid.cells().filter(|c| *c != free), grid.capacity());
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(place_item(&grid, &snake, &mut rng), Some(free));
    }

    #[test]
    fn full_board_has_no_place() {
        let grid = Grid::new(3, 2);
        let snake = Snake::from_segments(grid.cells(), grid.capacity());
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(place_item(&grid, &snake, &mut rng), None);
    }
}

use std::collections::VecDeque;

use crate::grid::Point;
use Direction::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn all() -> [Direction; 4] {
        [Up, Down, Left, Right]
    }

    pub fn unit_vector(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_reverse_of(self, other: Direction) -> bool {
        self.opposite() == other
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Up | Down)
    }

    pub fn head_char(self) -> char {
        match self {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}

/// Snake body, head first. Storage is reserved up front for the whole board,
/// so moving and growing never reallocate.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Point>,
    capacity: usize,
}

impl Snake {
    /// Lays out `size` segments ending at `head`, trailing away from `direction`.
    pub fn new(head: Point, size: usize, direction: Direction, capacity: usize) -> Self {
        let (dx, dy) = direction.unit_vector();
        let segments = (0..size as i32).map(|i| Point::new(head.x - dx * i, head.y - dy * i));
        Snake::from_segments(segments, capacity)
    }

    pub fn from_segments<I: IntoIterator<Item = Point>>(segments: I, capacity: usize) -> Self {
        let mut body = VecDeque::with_capacity(capacity);
        body.extend(segments);
        Snake { body, capacity }
    }

    pub fn head(&self) -> Point {
        self.body[0]
    }

    pub fn tail(&self) -> Point {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn segments(&self) -> impl Iterator<Item = &Point> + '_ {
        self.body.iter()
    }

    pub fn to_vec(&self) -> Vec<Point> {
        self.body.iter().copied().collect()
    }

    pub fn contains(&self, p: Point) -> bool {
        self.body.contains(&p)
    }

    /// Pushes a new head. Unless `grow` is set the tail is dropped and returned,
    /// shifting every surviving segment one place towards the tail.
    pub fn advance(&mut self, new_head: Point, grow: bool) -> Option<Point> {
        debug_assert!(!grow || self.body.len() < self.capacity);
        self.body.push_front(new_head);

        if grow {
            None
        } else {
            self.body.pop_back()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversal_pairs() {
        assert!(Up.is_reverse_of(Down));
        assert!(Left.is_reverse_of(Right));
        assert!(!Up.is_reverse_of(Left));
        assert!(!Up.is_reverse_of(Up));
    }

    #[test]
    fn new_snake_trails_behind_head() {
        let snake = Snake::new(Point::new(5, 5), 4, Right, 100);
        assert_eq!(
            snake.to_vec(),
            vec![Point::new(5, 5), Point::new(4, 5), Point::new(3, 5), Point::new(2, 5)]
        );
        assert_eq!(snake.tail(), Point::new(2, 5));

        let snake = Snake::new(Point::new(5, 5), 3, Up, 100);
        assert_eq!(snake.to_vec(), vec![Point::new(5, 5), Point::new(5, 6), Point::new(5, 7)]);
    }

    #[test]
    fn advance_shifts_or_grows() {
        let mut snake = Snake::new(Point::new(5, 5), 3, Right, 100);

        let dropped = snake.advance(Point::new(6, 5), false);
        assert_eq!(dropped, Some(Point::new(3, 5)));
        assert_eq!(snake.to_vec(), vec![Point::new(6, 5), Point::new(5, 5), Point::new(4, 5)]);

        assert_eq!(snake.advance(Point::new(7, 5), true), None);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.head(), Point::new(7, 5));
    }
}

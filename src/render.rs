use log::warn;

use crate::error::{GameError, Result};
use crate::game::Phase;
use crate::grid::Grid;
use crate::state::{GameState, Status};
use crate::term::Terminal;

const SNAKE_BODY_CHAR: char = '█';
const ITEM_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';
const EMPTY_CHAR: char = ' ';
const CORNER_CHAR: char = '+';
const HORIZONTAL_CHAR: char = '-';
const VERTICAL_CHAR: char = '|';

/// Text lines under the grid are padded to at least this many columns, so a
/// short line fully overwrites a longer one from the previous frame.
const MIN_LINE_WIDTH: usize = 80;

const NEWLINE: &str = "\r\n";

pub const INTRO_LINES: &[&str] = &[
    "Arrow keys or WASD to move",
    "Space to pause",
    "q or CTRL+C to quit",
    "",
    "Press any key to begin",
];

pub const PAUSE_LINES: &[&str] = &["Paused", "Space to resume", "or q to quit"];

/// One fully rendered screen: the bordered grid followed by the status and
/// message lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    text: String,
}

impl Frame {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.text.split(NEWLINE).filter(|l| !l.is_empty())
    }

    /// The status line, without padding.
    pub fn status_line(&self) -> Option<&str> {
        self.lines().find(|l| l.starts_with("Score:")).map(str::trim_end)
    }
}

/// Owns the off-screen buffers. Every render overwrites them completely.
pub struct Renderer {
    grid: Grid,
    cells: Vec<char>,
    frame: Frame,
}

impl Renderer {
    /// Reserves both buffers up front. Failing here is fatal for the session.
    pub fn new(grid: &Grid) -> Result<Self> {
        let cell_count = grid.capacity();
        let frame_width = grid.width() as usize + 2;
        let line_width = frame_width.max(MIN_LINE_WIDTH);
        let bytes = (grid.height() as usize + 2) * (frame_width * SNAKE_BODY_CHAR.len_utf8() + NEWLINE.len())
            + 2 * (line_width + NEWLINE.len());

        let mut text = String::new();
        text.try_reserve_exact(bytes).map_err(|source| GameError::FrameBuffer { bytes, source })?;

        let mut cells = Vec::new();
        cells
            .try_reserve_exact(cell_count)
            .map_err(|source| GameError::FrameBuffer { bytes: cell_count * std::mem::size_of::<char>(), source })?;
        cells.resize(cell_count, EMPTY_CHAR);

        Ok(Renderer { grid: *grid, cells, frame: Frame { text } })
    }

    pub fn render(&mut self, state: &GameState, phase: Phase) -> &Frame {
        debug_assert_eq!(*state.grid(), self.grid);

        self.paint_cells(state);

        match phase {
            Phase::NotStarted => self.overlay(INTRO_LINES),
            Phase::Paused => self.overlay(PAUSE_LINES),
            Phase::Running | Phase::GameOver => {}
        }

        self.compose(state, phase);
        &self.frame
    }

    /// Fills the cell buffer, lowest precedence first: body, head, item.
    fn paint_cells(&mut self, state: &GameState) {
        for c in self.cells.iter_mut() {
            *c = EMPTY_CHAR;
        }

        let dead = state.status() == Status::Collided;
        let body_char = if dead { DEAD_SNAKE_CHAR } else { SNAKE_BODY_CHAR };
        let head_char = if dead { DEAD_SNAKE_CHAR } else { state.direction().head_char() };

        for pos in state.snake().segments().skip(1) {
            let i = self.index(pos.x, pos.y);
            self.cells[i] = body_char;
        }

        let head = state.snake().head();
        let i = self.index(head.x, head.y);
        self.cells[i] = head_char;

        if let Some(item) = state.item() {
            let i = self.index(item.x, item.y);
            self.cells[i] = ITEM_CHAR;
        }
    }

    /// Draws a centred message box over the cells. A box that does not fit the
    /// board is left out; the message line below the grid still carries the
    /// prompt.
    fn overlay(&mut self, lines: &[&str]) {
        let box_height = lines.len() as i32 + 2;
        let box_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as i32 + 2;
        if box_width > self.grid.width() || box_height > self.grid.height() {
            return;
        }

        let left = (self.grid.width() - box_width) / 2;
        let top = (self.grid.height() - box_height) / 2;

        for row in 0..box_height {
            let line = if row == 0 || row == box_height - 1 { "" } else { lines[row as usize - 1] };
            let padded = format!("{line: ^width$}", line = line, width = box_width as usize);

            for (col, ch) in padded.chars().enumerate() {
                let i = self.index(left + col as i32, top + row);
                self.cells[i] = ch;
            }
        }
    }

    fn compose(&mut self, state: &GameState, phase: Phase) {
        let width = self.grid.width() as usize;
        let line_width = (width + 2).max(MIN_LINE_WIDTH);
        let text = &mut self.frame.text;
        text.clear();

        push_horizontal_border(text, width);
        for row in self.cells.chunks(width) {
            text.push(VERTICAL_CHAR);
            text.extend(row.iter());
            text.push(VERTICAL_CHAR);
            text.push_str(NEWLINE);
        }
        push_horizontal_border(text, width);

        push_padded(text, &status_line(state), line_width);
        push_padded(text, &message_line(state, phase), line_width);
    }

    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.grid.width() as usize + x as usize
    }
}

fn push_horizontal_border(text: &mut String, width: usize) {
    text.push(CORNER_CHAR);
    text.extend(std::iter::repeat(HORIZONTAL_CHAR).take(width));
    text.push(CORNER_CHAR);
    text.push_str(NEWLINE);
}

fn push_padded(text: &mut String, line: &str, width: usize) {
    text.push_str(&format!("{:<width$}", line, width = width));
    text.push_str(NEWLINE);
}

pub fn status_line(state: &GameState) -> String {
    format!(
        "Score: {}    Length: {}    Speed(ms/frame): {}",
        state.score(),
        state.snake().len(),
        state.tick_interval_ms()
    )
}

fn message_line(state: &GameState, phase: Phase) -> String {
    match phase {
        Phase::NotStarted => "Press any key to start".to_string(),
        Phase::Running => "Controls: Arrow keys or WASD. Space to pause, q to quit.".to_string(),
        Phase::Paused => "[PAUSED] Space to resume, q to quit.".to_string(),
        Phase::GameOver => {
            let headline = if state.status() == Status::Won { "You won!" } else { "Game Over!" };
            format!(
                "{} Final score: {}   Final length: {}   Press any key to exit.",
                headline,
                state.score(),
                state.snake().len()
            )
        }
    }
}

/// Sends a frame to the terminal as one write, starting from the top left.
/// Display failures cost this frame only.
pub fn present<T: Terminal + ?Sized>(term: &mut T, frame: &Frame) {
    if let Err(e) = emit(term, frame) {
        warn!("dropped frame: {}", e);
    }
}

fn emit<T: Terminal + ?Sized>(term: &mut T, frame: &Frame) -> Result<()> {
    term.move_cursor_to_origin()?;
    term.write_raw(frame.as_bytes())?;
    term.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::grid::Point;
    use crate::snake::Direction;
    use crate::term::HeadlessTerminal;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    fn small_state() -> GameState {
        let config = Config::default().with_size(6, 4);
        GameState::with_layout(config, &[p(2, 1), p(1, 1), p(0, 1)], Direction::Right, Some(p(4, 2)), 5).unwrap()
    }

    #[test]
    fn draws_border_snake_and_item() {
        let state = small_state();
        let mut renderer = Renderer::new(state.grid()).unwrap();
        let frame = renderer.render(&state, Phase::Running);
        let lines: Vec<&str> = frame.lines().collect();

        assert_eq!(lines[0], "+------+");
        assert_eq!(lines[1], "|      |");
        assert_eq!(lines[2], "|██>   |");
        assert_eq!(lines[3], "|    O |");
        assert_eq!(lines[4], "|      |");
        assert_eq!(lines[5], "+------+");
        assert_eq!(frame.status_line(), Some("Score: 0    Length: 3    Speed(ms/frame): 120"));
    }

    #[test]
    fn every_grid_row_has_the_same_width() {
        let state = small_state();
        let mut renderer = Renderer::new(state.grid()).unwrap();
        let frame = renderer.render(&state, Phase::Running);

        for line in frame.lines().take(6) {
            assert_eq!(line.chars().count(), 8);
        }
    }

    #[test]
    fn rendering_is_idempotent() {
        let state = small_state();
        let mut renderer = Renderer::new(state.grid()).unwrap();

        let first = renderer.render(&state, Phase::Running).clone();
        let second = renderer.render(&state, Phase::Running).clone();
        assert_eq!(first.as_bytes(), second.as_bytes());

        renderer.render(&state, Phase::Paused);
        let third = renderer.render(&state, Phase::Running);
        assert_eq!(first.as_bytes(), third.as_bytes());
    }

    #[test]
    fn crashed_snake_is_crossed_out() {
        let config = Config::default().with_size(6, 4);
        let mut state =
            GameState::with_layout(config, &[p(0, 1), p(1, 1), p(2, 1)], Direction::Left, Some(p(4, 2)), 5).unwrap();
        state.tick(None);

        let mut renderer = Renderer::new(state.grid()).unwrap();
        let frame = renderer.render(&state, Phase::GameOver);
        let lines: Vec<&str> = frame.lines().collect();

        assert_eq!(lines[2], "|XXX   |");
        assert!(lines[7].starts_with("Game Over! Final score: 0   Final length: 3"));
    }

    #[test]
    fn text_lines_are_padded() {
        let state = small_state();
        let mut renderer = Renderer::new(state.grid()).unwrap();
        let frame = renderer.render(&state, Phase::Paused);
        let lines: Vec<&str> = frame.lines().collect();

        assert_eq!(lines[6].len(), MIN_LINE_WIDTH);
        assert_eq!(lines[7].len(), MIN_LINE_WIDTH);
        assert!(lines[7].starts_with("[PAUSED]"));
    }

    #[test]
    fn pause_box_covers_the_middle() {
        let state = GameState::new(Config::default(), 1).unwrap();
        let mut renderer = Renderer::new(state.grid()).unwrap();
        let frame = renderer.render(&state, Phase::Paused);

        assert!(frame.lines().any(|l| l.starts_with('|') && l.contains("Space to resume")));
    }

    #[test]
    fn intro_box_needs_room() {
        let state = GameState::new(Config::default(), 1).unwrap();
        let mut renderer = Renderer::new(state.grid()).unwrap();
        let frame = renderer.render(&state, Phase::NotStarted);
        assert!(frame.lines().any(|l| l.starts_with('|') && l.contains("Press any key to begin")));

        // Too small for the box: the grid stays clean and the prompt moves below it
        let state = small_state();
        let mut renderer = Renderer::new(state.grid()).unwrap();
        let frame = renderer.render(&state, Phase::NotStarted);
        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines[2], "|██>   |");
        assert_eq!(lines[7].trim_end(), "Press any key to start");
    }

    #[test]
    fn present_writes_one_frame() {
        let state = small_state();
        let mut renderer = Renderer::new(state.grid()).unwrap();
        let mut term = HeadlessTerminal::new();

        let frame = renderer.render(&state, Phase::Running);
        present(&mut term, frame);

        assert_eq!(term.origin_moves(), 1);
        assert_eq!(term.output(), frame.as_bytes());

        term.fail_writes(true);
        present(&mut term, frame);
        assert_eq!(term.origin_moves(), 2);
        assert_eq!(term.output(), frame.as_bytes());
    }
}

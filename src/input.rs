use log::warn;

use crate::snake::Direction::{self, *};
use crate::term::Terminal;

const ESC: u8 = 0x1b;
const CTRL_C: u8 = 0x03;

/// Backend-neutral key press.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Char(char),
    Enter,
    Esc,
    CtrlC,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    ChangeDirection(Direction),
    Quit,
    TogglePause,
}

impl Key {
    pub fn command(self) -> Option<Command> {
        let cmd = match self {
            Key::Up | Key::Char('w') | Key::Char('W') => Command::ChangeDirection(Up),
            Key::Left | Key::Char('a') | Key::Char('A') => Command::ChangeDirection(Left),
            Key::Down | Key::Char('s') | Key::Char('S') => Command::ChangeDirection(Down),
            Key::Right | Key::Char('d') | Key::Char('D') => Command::ChangeDirection(Right),
            Key::Char('q') | Key::Char('Q') | Key::CtrlC => Command::Quit,
            Key::Char(' ') | Key::Char('p') | Key::Char('P') | Key::Esc => Command::TogglePause,
            _ => return None,
        };

        Some(cmd)
    }

    pub fn is_quit(self) -> bool {
        self.command() == Some(Command::Quit)
    }
}

/// Turns raw terminal bytes into keys.
///
/// Each call handles exactly one poll's worth of bytes. An escape prefix whose
/// sequence is not complete within the same call is dropped, so a half-read
/// arrow key never leaks into the next poll.
#[derive(Debug, Default)]
pub struct KeyDecoder;

impl KeyDecoder {
    pub fn decode(&self, bytes: &[u8], out: &mut Vec<Key>) {
        let mut i = 0;

        while i < bytes.len() {
            let b = bytes[i];
            i += 1;

            match b {
                ESC => match bytes.get(i) {
                    Some(b'[') => {
                        let (len, key) = csi(&bytes[i + 1..]);
                        out.extend(key);
                        i += 1 + len;
                    }
                    Some(b'O') => {
                        out.extend(bytes.get(i + 1).and_then(|f| arrow(*f)));
                        i += 2;
                    }
                    // A bare escape is ambiguous with a truncated sequence
                    _ => {}
                },
                CTRL_C => out.push(Key::CtrlC),
                b'\r' | b'\n' => out.push(Key::Enter),
                0x20..=0x7e => out.push(Key::Char(b as char)),
                _ => {}
            }
        }
    }
}

/// Reads the body of a control sequence that followed `ESC [`. Parameter and
/// intermediate bytes run up to a final byte; modifiers on an arrow (Ctrl+Up
/// is `ESC [1;5A`) still steer, anything else is dropped. Returns how many
/// bytes the sequence used, which is all of them if the final byte is missing.
fn csi(rest: &[u8]) -> (usize, Option<Key>) {
    match rest.iter().position(|b| !(0x20..=0x3f).contains(b)) {
        Some(end) if (0x40..=0x7e).contains(&rest[end]) => (end + 1, arrow(rest[end])),
        // Not a valid final byte: drop the sequence but leave that byte to be read
        Some(end) => (end, None),
        None => (rest.len(), None),
    }
}

fn arrow(final_byte: u8) -> Option<Key> {
    match final_byte {
        b'A' => Some(Key::Up),
        b'B' => Some(Key::Down),
        b'C' => Some(Key::Right),
        b'D' => Some(Key::Left),
        _ => None,
    }
}

/// Drains pending keys once per tick and boils them down to one command.
#[derive(Debug, Default)]
pub struct InputController {
    keys: Vec<Key>,
}

impl InputController {
    pub fn new() -> Self {
        InputController { keys: Vec::with_capacity(16) }
    }

    /// Never blocks. Quit anywhere in the batch wins, then an odd number of
    /// pause toggles, then the last direction that does not reverse `applied`.
    pub fn poll<T: Terminal + ?Sized>(&mut self, term: &mut T, applied: Direction) -> Option<Command> {
        self.keys.clear();
        if let Err(e) = term.poll_keys(&mut self.keys) {
            warn!("input poll failed: {}", e);
        }
        resolve(&self.keys, applied)
    }
}

pub fn resolve(keys: &[Key], applied: Direction) -> Option<Command> {
    let mut toggles = 0;
    let mut direction = None;

    for cmd in keys.iter().filter_map(|k| k.command()) {
        match cmd {
            Command::Quit => return Some(Command::Quit),
            Command::TogglePause => toggles += 1,
            Command::ChangeDirection(d) if !d.is_reverse_of(applied) => direction = Some(d),
            Command::ChangeDirection(_) => {}
        }
    }

    if toggles % 2 == 1 {
        Some(Command::TogglePause)
    } else {
        direction.map(Command::ChangeDirection)
    }
}

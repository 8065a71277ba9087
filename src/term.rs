use std::collections::VecDeque;
use std::io::{self, BufWriter, Stdout, Write, stdout};
use std::ops::{Deref, DerefMut};
use std::time::Duration;

use crossterm::{cursor, execute, queue, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, read, poll};
use log::warn;

use crate::error::{GameError, Result};
use crate::input::{Key, KeyDecoder};

/// The handful of terminal services the game needs. Everything platform
/// specific lives behind this trait.
pub trait Terminal {
    fn enter_raw_mode(&mut self) -> Result<()>;
    fn leave_raw_mode(&mut self) -> Result<()>;
    fn hide_cursor(&mut self) -> Result<()>;
    fn show_cursor(&mut self) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
    fn move_cursor_to_origin(&mut self) -> Result<()>;
    fn write_raw(&mut self, bytes: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;

    /// Appends every key already waiting to `out`. Must return immediately
    /// when nothing is pending.
    fn poll_keys(&mut self, out: &mut Vec<Key>) -> Result<()>;

    /// Blocks until a key arrives.
    fn wait_key(&mut self) -> Result<Key>;
}

/// The real thing. Output goes through one large buffer so a whole frame
/// reaches the terminal in a single flush.
pub struct CrosstermTerminal {
    stdout: BufWriter<Stdout>,
}

impl CrosstermTerminal {
    pub fn new() -> Self {
        CrosstermTerminal { stdout: BufWriter::with_capacity(64 * 1024, stdout()) }
    }
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        CrosstermTerminal::new()
    }
}

impl Terminal for CrosstermTerminal {
    /// Either both raw mode and the alternate screen are on afterwards, or
    /// neither is.
    fn enter_raw_mode(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        let entered = execute!(self.stdout, EnterAlternateScreen).map_err(GameError::from);
        undo_on_err(entered, || terminal::disable_raw_mode().map_err(GameError::from))
    }

    fn leave_raw_mode(&mut self) -> Result<()> {
        let cooked = terminal::disable_raw_mode();
        execute!(self.stdout, LeaveAlternateScreen)?;
        cooked?;
        Ok(())
    }

    fn hide_cursor(&mut self) -> Result<()> {
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)?;
        Ok(())
    }

    fn show_cursor(&mut self) -> Result<()> {
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        Ok(())
    }

    fn move_cursor_to_origin(&mut self) -> Result<()> {
        queue!(self.stdout, cursor::MoveTo(0, 0))?;
        Ok(())
    }

    // write_all already retries on EINTR
    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.stdout.write_all(bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    fn poll_keys(&mut self, out: &mut Vec<Key>) -> Result<()> {
        while poll(Duration::from_millis(0))? {
            if let Event::Key(ev) = read()? {
                out.extend(map_key(ev));
            }
        }

        Ok(())
    }

    fn wait_key(&mut self) -> Result<Key> {
        loop {
            if let Event::Key(ev) = read()? {
                if let Some(key) = map_key(ev) {
                    return Ok(key);
                }
            }
        }
    }
}

/// Rolls back the first half of a two-step setup when the second half failed.
/// The original error is the one returned.
fn undo_on_err<F>(res: Result<()>, undo: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    if res.is_err() {
        if let Err(e) = undo() {
            warn!("failed to undo partial terminal setup: {}", e);
        }
    }
    res
}

fn map_key(ev: KeyEvent) -> Option<Key> {
    let key = match ev.code {
        KeyCode::Char('c') if ev.modifiers.contains(KeyModifiers::CONTROL) => Key::CtrlC,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        _ => return None,
    };

    Some(key)
}

/// In-memory terminal. Input is scripted as raw byte batches, one batch per
/// poll, and output is captured for inspection.
#[derive(Debug, Default)]
pub struct HeadlessTerminal {
    input: VecDeque<Vec<u8>>,
    decoder: KeyDecoder,
    output: Vec<u8>,
    raw: bool,
    cursor_hidden: bool,
    origin_moves: usize,
    fail_writes: bool,
}

impl HeadlessTerminal {
    pub fn new() -> Self {
        HeadlessTerminal::default()
    }

    pub fn with_input<I, B>(batches: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut term = HeadlessTerminal::new();
        for batch in batches {
            term.push_input(batch.as_ref());
        }
        term
    }

    /// Queues bytes that become visible to the next poll.
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.push_back(bytes.to_vec());
    }

    /// Makes every display write fail, as a broken pipe would.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }

    pub fn is_cursor_hidden(&self) -> bool {
        self.cursor_hidden
    }

    /// How many times the cursor was sent home, i.e. how many frames started.
    pub fn origin_moves(&self) -> usize {
        self.origin_moves
    }
}

impl Terminal for HeadlessTerminal {
    fn enter_raw_mode(&mut self) -> Result<()> {
        self.raw = true;
        Ok(())
    }

    fn leave_raw_mode(&mut self) -> Result<()> {
        self.raw = false;
        Ok(())
    }

    fn hide_cursor(&mut self) -> Result<()> {
        self.cursor_hidden = true;
        Ok(())
    }

    fn show_cursor(&mut self) -> Result<()> {
        self.cursor_hidden = false;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.output.clear();
        Ok(())
    }

    fn move_cursor_to_origin(&mut self) -> Result<()> {
        self.origin_moves += 1;
        Ok(())
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "display unavailable").into());
        }

        self.output.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn poll_keys(&mut self, out: &mut Vec<Key>) -> Result<()> {
        if let Some(batch) = self.input.pop_front() {
            self.decoder.decode(&batch, out);
        }

        Ok(())
    }

    /// Consumes batches until one yields a key. Once the script runs dry this
    /// answers `Enter`, standing in for a user acknowledging a prompt.
    fn wait_key(&mut self) -> Result<Key> {
        let mut keys = vec![];

        while let Some(batch) = self.input.pop_front() {
            self.decoder.decode(&batch, &mut keys);
            if let Some(key) = keys.first() {
                return Ok(*key);
            }
        }

        Ok(Key::Enter)
    }
}

/// Raw mode and a hidden cursor for as long as this lives. Both are restored
/// on drop, whichever way the session ends.
pub struct TermSession<'a, T: Terminal + ?Sized> {
    term: &'a mut T,
}

impl<'a, T: Terminal + ?Sized> TermSession<'a, T> {
    pub fn enter(term: &'a mut T) -> Result<Self> {
        term.enter_raw_mode()?;

        // From here on Drop takes care of restoring the terminal
        let mut session = TermSession { term };
        session.term.hide_cursor()?;
        session.term.clear()?;
        Ok(session)
    }
}

impl<'a, T: Terminal + ?Sized> Deref for TermSession<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.term
    }
}

impl<'a, T: Terminal + ?Sized> DerefMut for TermSession<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.term
    }
}

impl<'a, T: Terminal + ?Sized> Drop for TermSession<'a, T> {
    fn drop(&mut self) {
        if let Err(e) = self.term.show_cursor() {
            warn!("failed to show cursor: {}", e);
        }
        if let Err(e) = self.term.leave_raw_mode() {
            warn!("failed to restore terminal mode: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_restores_on_drop() {
        let mut term = HeadlessTerminal::new();
        {
            let session = TermSession::enter(&mut term).unwrap();
            assert!(session.is_raw());
            assert!(session.is_cursor_hidden());
        }
        assert!(!term.is_raw());
        assert!(!term.is_cursor_hidden());
    }

    #[test]
    fn session_restores_on_error_path() {
        fn failing(term: &mut HeadlessTerminal) -> Result<()> {
            let mut session = TermSession::enter(term)?;
            session.fail_writes(true);
            session.write_raw(b"frame")?;
            Ok(())
        }

        let mut term = HeadlessTerminal::new();
        assert!(matches!(failing(&mut term), Err(GameError::Io(_))));
        assert!(!term.is_raw());
        assert!(!term.is_cursor_hidden());
    }

    #[test]
    fn failed_setup_step_is_rolled_back() {
        let broken = || -> Result<()> { Err(io::Error::new(io::ErrorKind::Other, "no alternate screen").into()) };

        let mut undone = false;
        let res = undo_on_err(broken(), || {
            undone = true;
            Ok(())
        });
        assert!(matches!(res, Err(GameError::Io(_))));
        assert!(undone);

        // A failing undo does not mask the first error
        let res = undo_on_err(broken(), || Err(GameError::InvalidLayout("undo".to_string())));
        assert!(matches!(res, Err(GameError::Io(_))));

        let mut undone = false;
        assert!(undo_on_err(Ok(()), || {
            undone = true;
            Ok(())
        })
        .is_ok());
        assert!(!undone);
    }

    #[test]
    fn headless_polls_one_batch_at_a_time() {
        let mut term = HeadlessTerminal::with_input(vec![&b"w"[..], &b"\x1b[D"[..]]);
        let mut keys = vec![];

        term.poll_keys(&mut keys).unwrap();
        assert_eq!(keys, vec![Key::Char('w')]);
        term.poll_keys(&mut keys).unwrap();
        assert_eq!(keys, vec![Key::Char('w'), Key::Left]);
        term.poll_keys(&mut keys).unwrap();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn headless_wait_key_skips_empty_batches() {
        let mut term = HeadlessTerminal::with_input(vec![&b""[..], &b"\x1b"[..], &b"q"[..]]);
        assert_eq!(term.wait_key().unwrap(), Key::Char('q'));
        assert_eq!(term.wait_key().unwrap(), Key::Enter);
    }
}

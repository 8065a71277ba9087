use std::{thread::sleep, time::Instant};

use log::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::input::{Command, InputController};
use crate::render::{present, Renderer};
use crate::state::{GameState, Status};
use crate::term::{TermSession, Terminal};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Running,
    Paused,
    GameOver,
}

/// How a session ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Summary {
    pub score: u32,
    pub length: usize,
    pub status: Status,
    /// False if the player quit at the intro screen.
    pub started: bool,
    pub quit: bool,
    pub ticks: u64,
}

pub struct SnakeGame<'t, T: Terminal + ?Sized> {
    term: TermSession<'t, T>,
    state: GameState,
    renderer: Renderer,
    input: InputController,
    phase: Phase,
    quit: bool,
    ticks: u64,
}

impl<'t, T: Terminal + ?Sized> SnakeGame<'t, T> {
    pub fn new(term: &'t mut T, config: Config, seed: u64) -> Result<Self> {
        let state = GameState::new(config, seed)?;
        let term = TermSession::enter(term)?;
        let renderer = Renderer::new(state.grid())?;

        Ok(SnakeGame {
            term,
            state,
            renderer,
            input: InputController::new(),
            phase: Phase::NotStarted,
            quit: false,
            ticks: 0,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Shows the board under the intro box and waits for a key. Returns false
    /// if the player quit instead of starting.
    pub fn show_intro(&mut self) -> Result<bool> {
        self.draw();

        if self.term.wait_key()?.is_quit() {
            info!("quit before the first tick");
            self.quit = true;
            return Ok(false);
        }

        self.phase = Phase::Running;
        Ok(true)
    }

    pub fn play(&mut self) {
        while self.phase != Phase::GameOver {
            let tick_start = Instant::now();

            self.step();
            if self.phase == Phase::GameOver {
                break;
            }

            self.draw();

            if let Some(rest) = self.state.frame_interval().checked_sub(tick_start.elapsed()) {
                sleep(rest);
            }
        }
    }

    /// Puts up the final frame and waits for the exit key. The terminal is
    /// restored once the returned summary is handed back.
    pub fn finish(mut self) -> Result<Summary> {
        let started = self.phase != Phase::NotStarted;

        if started {
            self.phase = Phase::GameOver;
            self.draw();
            self.term.wait_key()?;
        }

        let summary = Summary {
            score: self.state.score(),
            length: self.state.snake().len(),
            status: self.state.status(),
            started,
            quit: self.quit,
            ticks: self.ticks,
        };

        info!(
            "session over: {:?}, score {}, length {}, {} ticks",
            summary.status, summary.score, summary.length, summary.ticks
        );

        Ok(summary)
    }

    /// One loop iteration minus drawing and sleeping.
    fn step(&mut self) {
        let mut requested = None;

        match self.input.poll(&mut *self.term, self.state.direction()) {
            Some(Command::Quit) => {
                self.quit = true;
                self.phase = Phase::GameOver;
                return;
            }
            Some(Command::TogglePause) => self.toggle_pause(),
            Some(Command::ChangeDirection(dir)) if self.phase == Phase::Running => requested = Some(dir),
            _ => {}
        }

        if self.phase == Phase::Paused {
            return;
        }

        self.state.tick(requested);
        self.ticks += 1;

        if !self.state.is_alive() {
            self.phase = Phase::GameOver;
        }
    }

    fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            Phase::Running => Phase::Paused,
            Phase::Paused => Phase::Running,
            other => other,
        };

        debug!("pause toggled, now {:?}", self.phase);
    }

    fn draw(&mut self) {
        let frame = self.renderer.render(&self.state, self.phase);
        present(&mut *self.term, frame);
    }
}

/// Runs one complete session: intro, play, final frame.
pub fn run<T: Terminal + ?Sized>(term: &mut T, config: Config, seed: u64) -> Result<Summary> {
    let mut game = SnakeGame::new(term, config, seed)?;

    info!(
        "session started: {}x{} board, {:?} boundary, seed {}",
        game.state.grid().width(),
        game.state.grid().height(),
        game.state.config().boundary,
        seed
    );

    if game.show_intro()? {
        game.play();
    }

    game.finish()
}

use std::process::exit;

use log::{error, LevelFilter};

use snake::term::CrosstermTerminal;
use snake::{logging, Config, Status};

fn main() {
    let config = Config::default();

    if let Some(path) = &config.log_file {
        logging::init(path, LevelFilter::Info);
    }

    let seed: u64 = rand::random();
    let mut term = CrosstermTerminal::new();

    // The terminal session inside `run` is already restored when this returns
    match snake::run(&mut term, config, seed) {
        Ok(summary) if !summary.started => {}
        Ok(summary) => {
            let headline = if summary.status == Status::Won { "You won!" } else { "Game Over!" };
            println!("{} Final score: {}   Final length: {}", headline, summary.score, summary.length);
        }
        Err(e) => {
            error!("fatal: {}", e);
            eprintln!("snake: {}", e);
            exit(1);
        }
    }
}

//! brown-noise - minimal control shell
//!
//! Reads commands from stdin and drives the noise engine:
//!
//! ```text
//! toggle | t      start or stop playback
//! start / stop
//! vol <0.0-1.0>   set volume
//! status | s      print current state
//! quit | q
//! ```
//!
//! An optional first argument names a JSON config file.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use brown_noise::{NoiseConfig, NoiseEngineHandle};

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting brown-noise");

    let config = match std::env::args().nth(1) {
        Some(path) => match NoiseConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => NoiseConfig::default(),
    };

    let engine = match NoiseEngineHandle::spawn(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: failed to start audio engine: {}", e);
            return ExitCode::FAILURE;
        }
    };

    print_status(&engine);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let mut parts = line.split_whitespace();

        let result = match parts.next() {
            None => continue,
            Some("toggle" | "t") => engine.toggle().map(|_| ()),
            Some("start") => engine.start().map(|_| ()),
            Some("stop") => engine.stop().map(|_| ()),
            Some("vol" | "v") => match parts.next().map(str::parse::<f32>) {
                Some(Ok(volume)) => engine.set_volume(volume),
                _ => {
                    println!("Usage: vol <0.0-1.0>");
                    continue;
                }
            },
            Some("status" | "s") => Ok(()),
            Some("quit" | "q") => break,
            Some(other) => {
                println!("Unknown command: {}", other);
                continue;
            }
        };

        if let Err(e) = result {
            println!("Error: {}", e);
        }
        print_status(&engine);
    }

    log::info!("Shutting down");
    ExitCode::SUCCESS
}

fn print_status(engine: &NoiseEngineHandle) {
    println!(
        "[{}] volume {:.0}%",
        engine.status(),
        engine.volume() * 100.0
    );
    let _ = io::stdout().flush();
}

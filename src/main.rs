//! Block Breaker entry point
//!
//! Headless stand-in for the input and render collaborators: an autopilot
//! presses the arrow keys, and redraw notifications are turned into log
//! lines instead of frames.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use block_breaker::sim::{GamePhase, InputDirection};
use block_breaker::{Outcome, Session, SessionEvent, Settings, Snapshot};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless Block Breaker simulation", long_about = None)]
struct Args {
    /// JSON settings file; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Games to play; every game after the first is started with a restart
    #[arg(short, long, default_value_t = 3)]
    rounds: u32,

    /// Seed for the autopilot's aiming error
    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    /// Abandon a round after this many ticks
    #[arg(short = 't', long, default_value_t = 5000)]
    max_ticks: u64,

    /// Log the status line every N redraws (1 logs on every redraw)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    status_every: u64,
}

/// Per-round result printed as JSON
#[derive(Debug, Serialize)]
struct RoundSummary {
    round: u32,
    outcome: Outcome,
    ticks: u64,
    score: u32,
    blocks_left: usize,
    final_speed: f64,
}

/// Tracks the ball with a random aiming error, re-rolled on every rebound
struct Autopilot {
    rng: Pcg32,
    max_error: f64,
    aim_offset: f64,
    was_rising: bool,
}

impl Autopilot {
    fn new(seed: u64, paddle_half_width: f64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            max_error: paddle_half_width * 0.8,
            aim_offset: 0.0,
            was_rising: true,
        }
    }

    /// Key press that moves the paddle toward the ball
    fn steer(&mut self, snapshot: &Snapshot, step: f64) -> InputDirection {
        let rising = snapshot.ball_direction.y < 0.0;
        if rising && !self.was_rising {
            self.aim_offset = self.rng.random_range(-self.max_error..=self.max_error);
        }
        self.was_rising = rising;

        let target = snapshot.ball_position.x + self.aim_offset;
        let dx = target - snapshot.paddle_position.x;
        if dx > step / 2.0 {
            InputDirection::Right
        } else if dx < -step / 2.0 {
            InputDirection::Left
        } else {
            InputDirection::None
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    log::info!(
        "Block Breaker starting: {} rounds, seed {}, {} Hz",
        args.rounds,
        args.seed,
        settings.tick_rate_hz
    );

    let mut session = Session::new(settings);
    let events = session.subscribe();
    let mut autopilot = Autopilot::new(args.seed, session.settings().paddle_half_width());

    for round in 1..=args.rounds {
        let spawned = if round == 1 {
            session.start()
        } else {
            session.restart()
        };
        spawned.context("Failed to spawn simulation thread")?;

        let outcome = play_round(&session, &events, &mut autopilot, &args);
        let snapshot = session.snapshot();
        log::info!(
            "Round {round}: {outcome:?} after {} ticks, {} blocks destroyed",
            snapshot.ticks,
            snapshot.score
        );

        let summary = RoundSummary {
            round,
            outcome,
            ticks: snapshot.ticks,
            score: snapshot.score,
            blocks_left: snapshot.blocks.len(),
            final_speed: snapshot.ball_speed,
        };
        println!("{}", serde_json::to_string(&summary)?);
    }

    session.stop();
    log::info!("Block Breaker exiting");
    Ok(())
}

/// Drive one game until the simulation finishes or the tick limit is hit
fn play_round(
    session: &Session,
    events: &Receiver<SessionEvent>,
    autopilot: &mut Autopilot,
    args: &Args,
) -> Outcome {
    let generation = session.generation();
    let step = session.settings().paddle_step;
    let mut redraws = 0u64;

    loop {
        match events.recv_timeout(Duration::from_secs(1)) {
            Ok(SessionEvent::Tick { generation: g, ticks }) if g == generation => {
                let snapshot = session.snapshot();
                session.move_paddle(autopilot.steer(&snapshot, step));

                redraws += 1;
                if redraws % args.status_every == 0 {
                    log::info!("{}", snapshot.status_line());
                }
                if ticks >= args.max_ticks {
                    log::warn!("Round abandoned after {ticks} ticks");
                    return Outcome::Stopped;
                }
            }
            Ok(SessionEvent::Finished {
                generation: g,
                outcome,
            }) if g == generation => return outcome,
            // Leftovers from a previous round
            Ok(_) => {}
            Err(RecvTimeoutError::Timeout) => {
                if !session.is_running() {
                    return match session.snapshot().phase {
                        GamePhase::Lost => Outcome::Lost,
                        GamePhase::Won => Outcome::Won,
                        GamePhase::Playing => Outcome::Stopped,
                    };
                }
            }
            Err(RecvTimeoutError::Disconnected) => return Outcome::Stopped,
        }
    }
}

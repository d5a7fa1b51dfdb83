//! Threaded game session
//!
//! Runs the simulation on its own thread while the caller (input/render
//! loop) steers the paddle and reads snapshots.
//!
//! Locking:
//! - `paddle`: written by the input side, copied by the simulation at the
//!   start of every tick
//! - `game`: everything else; held by the simulation for a whole tick, so
//!   readers never see a half-advanced ball
//! - redraw signal: an atomic state generation, bumped after every tick and
//!   reset, plus a bounded channel of `SessionEvent`s
//!
//! Locks are always taken game first, paddle second.
//!
//! Restarting cancels the current simulation thread and joins it before the
//! state is reset and a new thread is spawned. Two simulation threads never
//! run against the same game.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use serde::Serialize;

use crate::settings::Settings;
use crate::sim::{
    Block, BorderZone, GamePhase, GameState, InputDirection, LastCollision, Paddle, TickResult,
    Vector2D, advance_tick,
};

/// Capacity of the notification channel
const EVENT_QUEUE: usize = 64;
/// Slots kept free of redraw notifications so `Finished` always fits
const RESERVED_SLOTS: usize = 8;

/// How a simulation run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Lost,
    Won,
    /// Cancelled by a restart or the exit flag
    Stopped,
}

/// Notification from the simulation thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A tick completed; the state may be redrawn.
    ///
    /// Dropped when the receiver falls behind: a redraw always reads the
    /// latest state, so one pending notification is as good as many.
    Tick { generation: u64, ticks: u64 },
    /// The simulation loop for `generation` exited
    Finished { generation: u64, outcome: Outcome },
}

/// Copy of everything a renderer may display
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Simulation run the state belongs to (bumped on every start/restart)
    pub generation: u64,
    /// Number of state changes published so far; unchanged means nothing to redraw
    pub state_generation: u64,
    pub paddle_position: Vector2D,
    pub last_input: InputDirection,
    pub ball_position: Vector2D,
    pub ball_direction: Vector2D,
    pub ball_speed: f64,
    pub blocks: Vec<Block>,
    pub lost: bool,
    pub won: bool,
    pub phase: GamePhase,
    pub score: u32,
    pub ticks: u64,
    pub last_collision: LastCollision,
}

impl Snapshot {
    /// One-line diagnostic readout
    pub fn status_line(&self) -> String {
        format!(
            "Ball Position: ({:.2},{:.2}) | Collision: {} | Speed: {:.2} | Blocks: {} | Score: {}",
            self.ball_position.x,
            self.ball_position.y,
            self.last_collision,
            self.ball_speed,
            self.blocks.len(),
            self.score,
        )
    }
}

/// State shared between the session owner and the simulation thread
struct SharedGame {
    paddle: Mutex<Paddle>,
    game: Mutex<GameState>,
    state_generation: AtomicU64,
}

impl SharedGame {
    /// Publish a state change to readers
    fn bump_generation(&self) -> u64 {
        self.state_generation.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Lock a mutex, recovering the data if a holder panicked.
///
/// The guarded values are plain data; a panic mid-tick leaves them usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        log::warn!("Recovering poisoned simulation lock");
        poisoned.into_inner()
    })
}

/// Handle to a running simulation thread
struct Worker {
    generation: u64,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// A game plus the thread simulating it
pub struct Session {
    settings: Arc<Settings>,
    shared: Arc<SharedGame>,
    exit: Arc<AtomicBool>,
    generation: u64,
    worker: Option<Worker>,
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,
}

impl Session {
    /// New session with a freshly reset game. Call `start` to begin simulating.
    pub fn new(settings: Settings) -> Self {
        let state = GameState::new(&settings);
        Self::from_state(settings, state)
    }

    /// New session continuing from an existing game state
    pub fn from_state(settings: Settings, state: GameState) -> Self {
        let (events_tx, events_rx) = channel::bounded(EVENT_QUEUE);
        Self {
            settings: Arc::new(settings),
            shared: Arc::new(SharedGame {
                paddle: Mutex::new(state.paddle),
                game: Mutex::new(state),
                state_generation: AtomicU64::new(0),
            }),
            exit: Arc::new(AtomicBool::new(false)),
            generation: 0,
            worker: None,
            events_tx,
            events_rx,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current simulation run (0 before the first `start`)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// State changes published so far (ticks and resets)
    pub fn state_generation(&self) -> u64 {
        self.shared.state_generation.load(Ordering::Acquire)
    }

    /// Receiver for tick/finish notifications.
    ///
    /// The channel has a single queue: every receiver handed out here competes
    /// for the same events, so exactly one consumer should drain it.
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        self.events_rx.clone()
    }

    /// The cooperative "player left" flag. Setting it ends the simulation
    /// at the next tick boundary.
    pub fn exit_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.exit)
    }

    /// Whether a simulation thread is still looping
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }

    /// Spawn the simulation thread if none is running
    pub fn start(&mut self) -> io::Result<()> {
        if self.is_running() {
            return Ok(());
        }
        self.halt_worker();
        self.spawn_worker()
    }

    /// Start a new game: quiesce the current simulation thread, reset the
    /// state, then spawn a fresh thread.
    pub fn restart(&mut self) -> io::Result<()> {
        self.halt_worker();
        {
            let mut game = lock(&self.shared.game);
            game.reset(&self.settings);
            *lock(&self.shared.paddle) = game.paddle;
        }
        self.shared.bump_generation();
        log::info!("Game reset, restarting simulation");
        self.spawn_worker()
    }

    /// Set the exit flag and wait for the simulation thread to finish
    pub fn stop(&mut self) {
        self.exit.store(true, Ordering::Release);
        self.halt_worker();
    }

    /// Apply a key press to the paddle
    pub fn move_paddle(&self, direction: InputDirection) {
        lock(&self.shared.paddle).steer(direction, &self.settings);
    }

    /// Consistent copy of the current state
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = {
            let game = lock(&self.shared.game);
            Snapshot {
                generation: self.generation,
                state_generation: self.shared.state_generation.load(Ordering::Acquire),
                paddle_position: game.paddle.position,
                last_input: game.paddle.last_input,
                ball_position: game.ball.pos,
                ball_direction: game.ball.dir,
                ball_speed: game.ball.speed,
                blocks: game.blocks.iter().copied().collect(),
                lost: game.lost,
                won: game.won,
                phase: game.phase(),
                score: game.score,
                ticks: game.ticks,
                last_collision: game.last_collision,
            }
        };

        // The paddle lock holds the freshest input
        let paddle = *lock(&self.shared.paddle);
        snapshot.paddle_position = paddle.position;
        snapshot.last_input = paddle.last_input;
        snapshot
    }

    fn spawn_worker(&mut self) -> io::Result<()> {
        let generation = self.generation + 1;
        let cancel = Arc::new(AtomicBool::new(false));
        let sim = SimulationLoop {
            generation,
            shared: Arc::clone(&self.shared),
            settings: Arc::clone(&self.settings),
            exit: Arc::clone(&self.exit),
            cancel: Arc::clone(&cancel),
            events: self.events_tx.clone(),
        };

        let handle = thread::Builder::new()
            .name(format!("simulation-{generation}"))
            .spawn(move || sim.run())?;

        self.generation = generation;
        self.worker = Some(Worker {
            generation,
            cancel,
            handle,
        });
        Ok(())
    }

    /// Cancel the current simulation thread and block until it has exited
    fn halt_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.cancel.store(true, Ordering::Release);
            if worker.handle.join().is_err() {
                log::warn!("Simulation thread {} panicked", worker.generation);
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Everything the simulation thread owns
struct SimulationLoop {
    generation: u64,
    shared: Arc<SharedGame>,
    settings: Arc<Settings>,
    exit: Arc<AtomicBool>,
    cancel: Arc<AtomicBool>,
    events: Sender<SessionEvent>,
}

impl SimulationLoop {
    fn should_stop(&self) -> bool {
        self.exit.load(Ordering::Acquire) || self.cancel.load(Ordering::Acquire)
    }

    /// Sleep, measure, tick, notify; until the game ends or we are told to stop
    fn run(self) {
        log::info!(
            "Simulation {} started at {} Hz",
            self.generation,
            self.settings.tick_rate_hz
        );
        let interval = self.settings.tick_interval();
        let mut last = Instant::now();

        let outcome = loop {
            if self.should_stop() {
                break Outcome::Stopped;
            }
            thread::sleep(interval);
            if self.should_stop() {
                break Outcome::Stopped;
            }

            let now = Instant::now();
            let delta_time = now.duration_since(last).as_secs_f64();
            last = now;

            let (ticks, phase) = {
                let mut game = lock(&self.shared.game);
                game.paddle = *lock(&self.shared.paddle);
                let result = advance_tick(&mut game, delta_time, &self.settings);
                log_collisions(&result, &game);
                (game.ticks, game.phase())
            };

            let state_generation = self.shared.bump_generation();
            log::trace!("Tick {ticks} published as state generation {state_generation}");
            self.notify_redraw(ticks);

            match phase {
                GamePhase::Playing => {}
                GamePhase::Lost => break Outcome::Lost,
                GamePhase::Won => break Outcome::Won,
            }
        };

        log::info!("Simulation {} finished: {:?}", self.generation, outcome);
        self.notify_finished(outcome);
    }

    fn notify_redraw(&self, ticks: u64) {
        if self.events.len() + RESERVED_SLOTS >= EVENT_QUEUE {
            log::trace!("Redraw queue full, coalescing tick {ticks}");
            return;
        }
        let _ = self.events.try_send(SessionEvent::Tick {
            generation: self.generation,
            ticks,
        });
    }

    fn notify_finished(&self, outcome: Outcome) {
        let event = SessionEvent::Finished {
            generation: self.generation,
            outcome,
        };
        match self.events.try_send(event) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(_)) => {
                log::warn!(
                    "Notification queue full, dropped finish of simulation {}",
                    self.generation
                );
            }
        }
    }
}

fn log_collisions(result: &TickResult, game: &GameState) {
    if result.border != BorderZone::None {
        log::debug!("Border collision: {}", result.border);
    }
    if result.paddle_hit {
        log::debug!("Paddle hit, speed now {:.3}", game.ball.speed);
    }
    if let Some((block, face)) = result.block_hit {
        log::debug!(
            "Block at {} destroyed on its {} face, {} left",
            block.top_left,
            face,
            game.blocks.len()
        );
    }
}

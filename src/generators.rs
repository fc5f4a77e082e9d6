use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

use crate::cancellation::CancellationToken;
use crate::cells::Coordinate;
use crate::errors::*;
use crate::events::{GenerationEvents, GenerationStep};
use crate::grid::Maze;
use crate::units::{Height, Width};

/// Every generation run starts carving from the origin cell.
pub const START_COORDINATE: Coordinate = Coordinate { x: 0, z: 0 };

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct GenerationConfig {
    pub width: Width,
    pub height: Height,
    pub seed: u64,
    /// Pause after each carve. Zero means run flat out.
    pub step_delay: Duration,
}

impl GenerationConfig {
    pub fn new(width: Width, height: Height, seed: u64) -> GenerationConfig {
        GenerationConfig {
            width,
            height,
            seed,
            step_delay: Duration::from_millis(0),
        }
    }

    pub fn with_step_delay(mut self, step_delay: Duration) -> GenerationConfig {
        self.step_delay = step_delay;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let (Width(w), Height(h)) = (self.width, self.height);
        if w == 0 || h == 0 {
            return Err(ErrorKind::InvalidDimensions(w, h).into());
        }
        Ok(())
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum GenerationStatus {
    Running,
    Completed,
    Cancelled,
}

/// How a generation run ended. A cancelled maze is only partially carved.
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum GenerationOutcome {
    Completed {
        maze: Maze,
        last_carved: Option<Coordinate>,
    },
    Cancelled {
        maze: Maze,
        last_carved: Option<Coordinate>,
    },
}

impl GenerationOutcome {
    pub fn is_completed(&self) -> bool {
        match *self {
            GenerationOutcome::Completed { .. } => true,
            GenerationOutcome::Cancelled { .. } => false,
        }
    }

    pub fn maze(&self) -> &Maze {
        match *self {
            GenerationOutcome::Completed { ref maze, .. } |
            GenerationOutcome::Cancelled { ref maze, .. } => maze,
        }
    }

    pub fn last_carved(&self) -> Option<Coordinate> {
        match *self {
            GenerationOutcome::Completed { last_carved, .. } |
            GenerationOutcome::Cancelled { last_carved, .. } => last_carved,
        }
    }

    pub fn into_maze(self) -> Maze {
        match self {
            GenerationOutcome::Completed { maze, .. } |
            GenerationOutcome::Cancelled { maze, .. } => maze,
        }
    }
}

/// Randomised depth first carve of a fully walled grid, driven by an explicit stack.
///
/// Each call to `next` carves exactly one passage from the cell on top of the
/// stack to one of its unvisited neighbours, chosen uniformly with the seeded
/// rng, and yields a `GenerationStep`. Dead ends are dropped from the stack,
/// which is how the walk backtracks. The same configuration always carves the
/// same maze in the same order.
///
/// Between steps the generator pauses for the configured delay and checks its
/// cancellation token. Both happen only at step boundaries, so a cancelled maze
/// never holds a half carved passage.
pub struct RecursiveBacktracker {
    maze: Maze,
    stack: Vec<Coordinate>,
    rng: XorShiftRng,
    step_delay: Duration,
    cancellation: CancellationToken,
    events: GenerationEvents,
    status: GenerationStatus,
    steps_emitted: usize,
    last_carved: Option<Coordinate>,
}

impl RecursiveBacktracker {
    pub fn new(config: &GenerationConfig,
               cancellation: CancellationToken,
               events: GenerationEvents)
               -> Result<RecursiveBacktracker> {
        config.validate()?;
        let maze = Maze::new(config.width, config.height)?;

        Ok(RecursiveBacktracker {
            maze,
            stack: vec![START_COORDINATE],
            rng: XorShiftRng::seed_from_u64(config.seed),
            step_delay: config.step_delay,
            cancellation,
            events,
            status: GenerationStatus::Running,
            steps_emitted: 0,
            last_carved: None,
        })
    }

    #[inline]
    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    #[inline]
    pub fn status(&self) -> GenerationStatus {
        self.status
    }

    #[inline]
    pub fn steps_emitted(&self) -> usize {
        self.steps_emitted
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Drive the generation to its end, publishing every step.
    pub fn run(mut self) -> GenerationOutcome {
        while self.next().is_some() {}
        self.into_outcome()
    }

    /// Finish the run as it stands. A generator that has not yet reached the end of
    /// its walk reports the maze as cancelled.
    pub fn into_outcome(self) -> GenerationOutcome {
        let RecursiveBacktracker { maze, last_carved, status, .. } = self;
        match status {
            GenerationStatus::Completed => GenerationOutcome::Completed { maze, last_carved },
            GenerationStatus::Running |
            GenerationStatus::Cancelled => GenerationOutcome::Cancelled { maze, last_carved },
        }
    }

    fn carve_next(&mut self) -> Option<Coordinate> {
        while let Some(current) = self.stack.pop() {
            self.maze.mark_visited(current);

            let unvisited = self.maze.unvisited_neighbours(current);
            if unvisited.is_empty() {
                // dead end, backtrack
                continue;
            }
            if unvisited.len() > 1 {
                self.stack.push(current);
            }

            let (direction, next) = unvisited[self.rng.gen_range(0..unvisited.len())];
            let carved = self.maze.carve(current, direction);
            debug_assert_eq!(carved, Some(next));

            self.maze.mark_visited(next);
            self.stack.push(next);
            return Some(next);
        }
        None
    }

    fn suspend_or_cancel(&mut self) -> bool {
        let cancelled = if self.steps_emitted > 0 && self.step_delay > Duration::from_millis(0) {
            self.cancellation.wait_timeout(self.step_delay)
        } else {
            self.cancellation.is_cancelled()
        };

        if cancelled {
            self.status = GenerationStatus::Cancelled;
            info!("maze generation cancelled after {} steps, {} of {} cells visited",
                  self.steps_emitted, self.maze.visited_count(), self.maze.size());
        }
        cancelled
    }
}

impl Iterator for RecursiveBacktracker {
    type Item = GenerationStep;

    fn next(&mut self) -> Option<GenerationStep> {
        if self.status != GenerationStatus::Running || self.suspend_or_cancel() {
            return None;
        }

        match self.carve_next() {
            Some(carved) => {
                debug!("carved into {} (step {})", carved, self.steps_emitted);
                let step = GenerationStep {
                    maze: self.maze.clone(),
                    current: carved,
                    index: self.steps_emitted,
                };
                self.steps_emitted += 1;
                self.last_carved = Some(carved);

                let failures = self.events.publish(&step);
                if failures > 0 {
                    warn!("{} generation observer(s) failed on step {}", failures, step.index);
                }
                Some(step)
            }
            None => {
                self.status = GenerationStatus::Completed;
                info!("maze generation completed: {}x{}, {} passages in {} steps",
                      self.maze.width(), self.maze.height(),
                      self.maze.open_passages_count(), self.steps_emitted);
                None
            }
        }
    }
}

/// Validate the configuration and hand back a lazy, cancellable generator.
/// Nothing is carved until the generator is iterated.
pub fn generate(config: &GenerationConfig,
                cancellation: CancellationToken,
                events: GenerationEvents)
                -> Result<RecursiveBacktracker> {
    RecursiveBacktracker::new(config, cancellation, events)
}

/// A generation run on its own thread.
#[derive(Debug)]
pub struct GenerationHandle {
    cancellation: CancellationToken,
    worker: thread::JoinHandle<GenerationOutcome>,
}

impl GenerationHandle {
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Wait for the generator to complete or observe a cancellation.
    pub fn join(self) -> Result<GenerationOutcome> {
        self.worker.join().map_err(|_| ErrorKind::GenerationPanicked.into())
    }
}

/// Start generating on a worker thread. Configuration errors are reported
/// here, before the thread starts.
pub fn spawn(config: &GenerationConfig, events: GenerationEvents) -> Result<GenerationHandle> {
    let cancellation = CancellationToken::new();
    let generator = generate(config, cancellation.clone(), events)?;
    let worker = thread::Builder::new()
        .name(String::from("maze-generator"))
        .spawn(move || generator.run())
        .chain_err(|| "failed to start the maze generation thread")?;

    Ok(GenerationHandle { cancellation, worker })
}

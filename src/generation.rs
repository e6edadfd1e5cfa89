//! Sequencing of a whole maze generation run: the boundary shell, then carving, then emission of
//! the remaining walls, each stage time sliced by a [`Scheduler`] bound to the run's [`RunId`].
//!
//! Starting a new run supersedes any pass still in flight. A superseded pass notices on its next
//! resumption and stops without touching the new run's state.

use std::time::Duration;

use rand::{RngCore, SeedableRng};
use rand_xorshift::XorShiftRng;
use tracing::{debug, info};

use crate::clock::{Clock, MonotonicClock};
use crate::errors::*;
use crate::generators::PrimsCarver;
use crate::lattice::LargeLattice;
use crate::lattice_dimensions::LatticeDimensions;
use crate::partitions::{self, EmissionContext, Partition, PartitionEmitter, PartitionId};
use crate::scheduler::{FrameBudget, Resumption, RunId, Scheduler};

pub const DEFAULT_TARGET_FRAME_RATE: u32 = 30;

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum GenerationState {
    Idle,
    BuildingBoundary,
    Carving,
    Emitting,
    Generated,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeneratorConfig {
    target_frame_rate: u32,
    seed: Option<u64>,
}

impl GeneratorConfig {
    /// Frames per second the driving loop aims for. Sets the time budget of each resumption.
    pub fn target_frame_rate(&self) -> u32 {
        self.target_frame_rate
    }

    /// Seed for the sequence of mazes. `None` picks a fresh random sequence.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            target_frame_rate: DEFAULT_TARGET_FRAME_RATE,
            seed: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct GeneratorConfigBuilder {
    config: GeneratorConfig,
}

impl GeneratorConfigBuilder {
    pub fn new() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder::default()
    }
    pub fn target_frame_rate(mut self, frames_per_second: u32) -> GeneratorConfigBuilder {
        self.config.target_frame_rate = frames_per_second;
        self
    }
    pub fn seed(mut self, seed: Option<u64>) -> GeneratorConfigBuilder {
        self.config.seed = seed;
        self
    }
    pub fn build(self) -> GeneratorConfig {
        self.config
    }
}

/// Owns the lattice and the placements of the current run.
#[derive(Debug)]
pub struct MazeGenerator<C: Clock + Clone = MonotonicClock> {
    config: GeneratorConfig,
    clock: C,
    rng: XorShiftRng,
    run: RunId,
    state: GenerationState,
    lattice: Option<LargeLattice>,
    maze: Option<LargeLattice>,
    placements: Vec<Partition>,
    boundary_count: usize,
}

impl MazeGenerator<MonotonicClock> {
    pub fn new(config: GeneratorConfig) -> MazeGenerator<MonotonicClock> {
        MazeGenerator::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock + Clone> MazeGenerator<C> {
    pub fn with_clock(config: GeneratorConfig, clock: C) -> MazeGenerator<C> {
        let rng = XorShiftRng::seed_from_u64(config.seed.unwrap_or_else(rand::random));
        MazeGenerator {
            config,
            clock,
            rng,
            run: RunId::initial(),
            state: GenerationState::Idle,
            lattice: None,
            maze: None,
            placements: Vec::new(),
            boundary_count: 0,
        }
    }

    /// Start a new run, superseding any pass still in flight.
    ///
    /// The previous run's lattice and placements are discarded and the boundary shell is emitted
    /// straight away. The returned pass carves and emits the rest when resumed. Nothing changes
    /// if the lattice cannot be built.
    pub fn generate(&mut self, dimensions: LatticeDimensions) -> Result<GenerationPass<C>> {
        let lattice = LargeLattice::build(dimensions)?;

        self.run = self.run.next();
        let run = self.run;
        let cells = lattice.size();
        info!(run = run.value(), cells, "generation started");

        self.maze = None;
        self.lattice = Some(lattice);
        self.placements.clear();

        self.transition(GenerationState::BuildingBoundary);
        self.placements.extend(partitions::boundary_partitions(&dimensions));
        self.boundary_count = self.placements.len();

        self.transition(GenerationState::Carving);
        let carver_rng = XorShiftRng::seed_from_u64(self.rng.next_u64());
        let budget = FrameBudget::from_frame_rate(self.config.target_frame_rate);

        Ok(GenerationPass {
            run,
            stage: PassStage::Carving(PrimsCarver::new(carver_rng, cells)),
            scheduler: Scheduler::new(run, budget, self.clock.clone()),
        })
    }

    fn transition(&mut self, state: GenerationState) {
        debug!(run = self.run.value(), from = ?self.state, to = ?state, "state transition");
        self.state = state;
    }

    #[inline]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> GenerationState {
        self.state
    }

    #[inline]
    pub fn current_run(&self) -> RunId {
        self.run
    }

    /// True only once the last placement of the current run has been emitted.
    #[inline]
    pub fn is_generated(&self) -> bool {
        self.state == GenerationState::Generated
    }

    /// Every placement of the current run so far, boundary first.
    pub fn placements(&self) -> &[Partition] {
        &self.placements
    }

    pub fn placement(&self, id: PartitionId) -> Option<&Partition> {
        self.placements.get(id.0)
    }

    pub fn boundary_placements(&self) -> &[Partition] {
        &self.placements[..self.boundary_count]
    }

    pub fn inner_placements(&self) -> &[Partition] {
        &self.placements[self.boundary_count..]
    }

    /// The lattice being worked on. Emission consumes its walls.
    pub fn lattice(&self) -> Option<&LargeLattice> {
        self.lattice.as_ref()
    }

    /// The lattice as it was when carving finished.
    pub fn maze(&self) -> Option<&LargeLattice> {
        self.maze.as_ref()
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum PassStatus {
    InProgress,
    Completed,
    Aborted,
}

#[derive(Debug)]
enum PassStage {
    Carving(PrimsCarver),
    Emitting(PartitionEmitter),
    Finished,
    Abandoned,
}

/// Handle on the incremental part of one run. Resume it from the driving loop every tick.
#[derive(Debug)]
pub struct GenerationPass<C: Clock = MonotonicClock> {
    run: RunId,
    stage: PassStage,
    scheduler: Scheduler<C>,
}

impl<C: Clock + Clone> GenerationPass<C> {
    #[inline]
    pub fn run(&self) -> RunId {
        self.run
    }

    /// Atomic carving and emission steps taken so far.
    #[inline]
    pub fn steps(&self) -> u64 {
        self.scheduler.steps()
    }

    /// Carve and emit until done or until this tick's budget is spent.
    /// `frame_delta` is how long the driving loop's previous tick took.
    pub fn resume(&mut self, generator: &mut MazeGenerator<C>, frame_delta: Duration) -> PassStatus {
        loop {
            let next_stage = match self.stage {
                PassStage::Finished => return PassStatus::Completed,
                PassStage::Abandoned => return PassStatus::Aborted,

                PassStage::Carving(ref mut carver) => {
                    let lattice = match generator.lattice.as_mut() {
                        Some(lattice) => lattice,
                        None => return self.abandon(generator.run),
                    };
                    match self.scheduler.resume(carver, lattice, generator.run, frame_delta) {
                        Resumption::Suspended => return PassStatus::InProgress,
                        Resumption::Aborted => return self.abandon(generator.run),
                        Resumption::Completed => {
                            debug!(run = self.run.value(), carved = carver.carved(),
                                   regions = carver.regions(), "carving finished");
                            generator.maze = Some(lattice.clone());
                            generator.transition(GenerationState::Emitting);
                            PassStage::Emitting(PartitionEmitter::new())
                        }
                    }
                }

                PassStage::Emitting(ref mut emitter) => {
                    let lattice = match generator.lattice.as_mut() {
                        Some(lattice) => lattice,
                        None => return self.abandon(generator.run),
                    };
                    let mut ctx = EmissionContext {
                        lattice,
                        placements: &mut generator.placements,
                    };
                    match self.scheduler.resume(emitter, &mut ctx, generator.run, frame_delta) {
                        Resumption::Suspended => return PassStatus::InProgress,
                        Resumption::Aborted => return self.abandon(generator.run),
                        Resumption::Completed => {
                            generator.transition(GenerationState::Generated);
                            info!(run = self.run.value(),
                                  placements = generator.placements.len(),
                                  inner = emitter.emitted(),
                                  steps = self.scheduler.steps(),
                                  suspensions = self.scheduler.suspensions(),
                                  "generation finished");
                            PassStage::Finished
                        }
                    }
                }
            };
            self.stage = next_stage;
        }
    }

    /// Resume back to back until the pass completes or is superseded.
    pub fn run_to_completion(&mut self, generator: &mut MazeGenerator<C>) -> PassStatus {
        loop {
            match self.resume(generator, Duration::from_secs(0)) {
                PassStatus::InProgress => continue,
                status => return status,
            }
        }
    }

    fn abandon(&mut self, current_run: RunId) -> PassStatus {
        debug!(run = self.run.value(), current = current_run.value(), "superseded pass aborted");
        self.stage = PassStage::Abandoned;
        PassStatus::Aborted
    }
}

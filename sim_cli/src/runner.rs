//! Simulation driver loop

use crate::{CliError, SimulationConfig};
use process_model::{parse_definitions, DefinitionError, LineError, Process};
use sim_kernel::{Scheduler, SchedulerError, SimulationReport};

/// Why the driver stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Reached `max_cycles`
    CycleLimit,
    /// No work for `idle_cycle_limit` consecutive cycles
    Idle,
}

/// A configured scheduler plus the pacing state around it
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    scheduler: Scheduler,
    /// Definition lines that failed to parse
    rejected: Vec<LineError>,
    idle_streak: u64,
    cycles_run: u64,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, CliError> {
        config.validate()?;
        let memory = config.memory.build()?;
        let scheduler = Scheduler::new(config.scheduler, memory)?;

        Ok(Self {
            config,
            scheduler,
            rejected: Vec::new(),
            idle_streak: 0,
            cycles_run: 0,
        })
    }

    /// Registers every well-formed line of a definition text
    ///
    /// Returns how many processes were added. Lines that fail to parse or
    /// name an already registered process are kept in
    /// [`Simulation::rejected`]; the remaining lines still load.
    pub fn load_definitions(&mut self, text: &str) -> Result<usize, CliError> {
        let (definitions, errors) = parse_definitions(text);
        self.rejected.extend(errors);

        let mut added = 0;
        for definition in definitions {
            match self.scheduler.add_process(definition.process.clone()) {
                Ok(()) => added += 1,
                Err(SchedulerError::DuplicateProcess(pid)) => {
                    let error = DefinitionError::DuplicateId(pid.to_string());
                    self.rejected.push(definition.reject(error));
                }
                Err(SchedulerError::EmptyProcess(_)) => {
                    self.rejected.push(definition.reject(DefinitionError::NoBursts));
                }
                Err(error) => return Err(error.into()),
            }
        }
        Ok(added)
    }

    pub fn add_process(&mut self, process: Process) -> Result<(), CliError> {
        self.scheduler.add_process(process)?;
        Ok(())
    }

    /// Runs one cycle; returns the stop reason once a limit is hit
    pub fn step(&mut self) -> Option<StopReason> {
        if self.limit_reached() {
            return Some(StopReason::CycleLimit);
        }

        let has_work = self.scheduler.run_one_unit();
        self.cycles_run += 1;

        if has_work {
            self.idle_streak = 0;
        } else {
            self.idle_streak += 1;
        }

        if self.idle_streak > 0 && self.idle_streak >= self.config.idle_cycle_limit {
            Some(StopReason::Idle)
        } else if self.limit_reached() {
            Some(StopReason::CycleLimit)
        } else {
            None
        }
    }

    /// Runs until a limit is hit
    pub fn run(&mut self) -> StopReason {
        loop {
            if let Some(reason) = self.step() {
                return reason;
            }
        }
    }

    fn limit_reached(&self) -> bool {
        self.config.max_cycles != 0 && self.cycles_run >= self.config.max_cycles
    }

    /// Shuts the scheduler down and returns the final report
    pub fn finish(&mut self) -> SimulationReport {
        self.scheduler.shutdown();
        self.scheduler.report()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn rejected(&self) -> &[LineError] {
        &self.rejected
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycles_run
    }
}

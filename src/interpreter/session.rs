//! Time-travel debugging session
//!
//! A [`Session`] wraps a [`Machine`] and records its state after every instruction,
//! so execution can be stepped backward and replayed forward. Stepping past the
//! recorded history executes new instructions on the live machine.
//!
//! Supplying input while positioned in the past forks history: every recorded state
//! after the current one is discarded before the input is queued.

use crate::interpreter::errors::MachineError;
use crate::interpreter::machine::{Machine, Status};
use crate::snapshot::{Snapshot, SnapshotManager};
use thiserror::Error;
use tracing::debug;

/// Errors from history navigation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("already at the beginning of execution")]
    AtStart,

    #[error("program has halted")]
    AtEnd,

    #[error("program is waiting for input")]
    NeedsInput,

    #[error("snapshot memory limit exceeded: {current} bytes used, limit is {limit}")]
    SnapshotLimitExceeded { current: usize, limit: usize },

    #[error(transparent)]
    Machine(#[from] MachineError),
}

/// A machine plus its recorded execution history
#[derive(Debug)]
pub struct Session {
    /// Live machine, always equal to the snapshot at `history_position`
    machine: Machine,

    /// Snapshot manager for reverse execution
    snapshot_manager: SnapshotManager,

    /// Current position in execution history
    history_position: usize,
}

impl Session {
    /// Start recording from the machine's current state
    pub fn new(machine: Machine, snapshot_memory_limit: usize) -> Result<Self, SessionError> {
        let mut session = Session {
            machine,
            snapshot_manager: SnapshotManager::new(snapshot_memory_limit),
            history_position: 0,
        };
        let initial = session.machine.clone();
        session.record(&initial)?;
        Ok(session)
    }

    /// Step forward one instruction, replaying history when available
    pub fn step_forward(&mut self) -> Result<(), SessionError> {
        if let Some(snapshot) = self.snapshot_manager.get(self.history_position + 1) {
            self.machine = snapshot.machine.clone();
            self.history_position += 1;
            return Ok(());
        }

        if self.machine.is_halted() {
            return Err(SessionError::AtEnd);
        }

        // Step a copy so a failed recording leaves the live machine in place
        let mut machine = self.machine.clone();
        match machine.step()? {
            Status::AwaitingInput => {
                // Only the status changed; keep the recorded state in sync
                self.machine = machine;
                self.update_current()?;
                Err(SessionError::NeedsInput)
            }
            Status::Running | Status::Halted => {
                self.record(&machine)?;
                self.machine = machine;
                self.history_position += 1;
                Ok(())
            }
        }
    }

    /// Step backward to the previous recorded state
    pub fn step_backward(&mut self) -> Result<(), SessionError> {
        if self.history_position == 0 {
            return Err(SessionError::AtStart);
        }

        self.history_position -= 1;
        self.restore(self.history_position);
        Ok(())
    }

    /// Rewind to the beginning of execution history
    pub fn rewind_to_start(&mut self) {
        self.history_position = 0;
        self.restore(0);
    }

    /// Step forward until the machine halts, needs input, or `max_steps` have run.
    ///
    /// Returns the number of steps taken.
    pub fn run_to_pause(&mut self, max_steps: usize) -> Result<usize, SessionError> {
        let mut taken = 0;
        while taken < max_steps {
            match self.step_forward() {
                Ok(()) => taken += 1,
                Err(SessionError::AtEnd) | Err(SessionError::NeedsInput) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(taken)
    }

    /// Queue input at the current position, discarding any recorded future
    pub fn provide_input<I: IntoIterator<Item = i64>>(
        &mut self,
        values: I,
    ) -> Result<(), SessionError> {
        let discarded = self.snapshot_manager.len() - (self.history_position + 1);
        if discarded > 0 {
            debug!(discarded, "forking history at input");
        }
        self.snapshot_manager.truncate(self.history_position + 1);
        self.machine.push_inputs(values);
        self.update_current()
    }

    fn record(&mut self, machine: &Machine) -> Result<(), SessionError> {
        self.snapshot_manager
            .push(Snapshot::new(machine.clone()))
            .map_err(|_| self.limit_exceeded())
    }

    fn update_current(&mut self) -> Result<(), SessionError> {
        self.snapshot_manager
            .replace(self.history_position, Snapshot::new(self.machine.clone()))
            .map_err(|_| self.limit_exceeded())
    }

    fn restore(&mut self, index: usize) {
        if let Some(snapshot) = self.snapshot_manager.get(index) {
            self.machine = snapshot.machine.clone();
        }
    }

    fn limit_exceeded(&self) -> SessionError {
        SessionError::SnapshotLimitExceeded {
            current: self.snapshot_manager.memory_usage(),
            limit: self.snapshot_manager.memory_limit(),
        }
    }

    // ========== Getter methods for UI ==========

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn history_position(&self) -> usize {
        self.history_position
    }

    pub fn total_snapshots(&self) -> usize {
        self.snapshot_manager.len()
    }

    /// True when positioned on the newest recorded state
    pub fn at_frontier(&self) -> bool {
        self.history_position + 1 == self.snapshot_manager.len()
    }
}

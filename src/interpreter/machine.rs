// Execution engine for the Intcode machine

use crate::interpreter::errors::MachineError;
use crate::interpreter::opcode::{Instruction, Mode, Opcode};
use crate::memory::Memory;
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// Execution status of a [`Machine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Ready to fetch the next instruction
    Running,
    /// Parked on an `in` instruction with an empty input queue
    AwaitingInput,
    /// Terminal: reached `hlt` or ran off the end of memory
    Halted,
}

/// Result of [`Machine::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// Where execution stopped
    pub status: Status,
    /// Everything the program emitted during the run
    pub output: Vec<i64>,
}

impl RunOutput {
    /// True if the program ran to completion rather than suspending for input
    pub fn is_complete(&self) -> bool {
        self.status == Status::Halted
    }
}

/// An Intcode machine
///
/// Each machine owns its memory, registers and I/O queues outright. Several
/// machines are composed by an outside scheduler that calls [`Machine::resume`] on
/// each in turn and moves values between their queues; the only point at which a
/// machine yields is an `in` instruction that finds its queue empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    /// Pristine image used by [`Machine::reset`]
    program: Vec<i64>,

    /// Live memory
    memory: Memory,

    /// Program counter
    pc: usize,

    /// Offset applied to relative-mode operands
    relative_base: i64,

    /// Pending input, consumed front first
    input: VecDeque<i64>,

    /// Values emitted by `out`, oldest first
    output: VecDeque<i64>,

    status: Status,

    /// Instructions executed since the last reset
    steps: u64,
}

impl Machine {
    /// Create a machine with `program` loaded at address 0
    pub fn new(program: Vec<i64>) -> Self {
        Machine {
            memory: Memory::from_program(&program),
            program,
            pc: 0,
            relative_base: 0,
            input: VecDeque::new(),
            output: VecDeque::new(),
            status: Status::Running,
            steps: 0,
        }
    }

    /// Restore the state the machine had right after construction.
    ///
    /// Memory is rebuilt from the stored program, so cells written past the end of
    /// the program during an earlier run read as zero again.
    pub fn reset(&mut self) {
        self.memory = Memory::from_program(&self.program);
        self.pc = 0;
        self.relative_base = 0;
        self.input.clear();
        self.output.clear();
        self.status = Status::Running;
        self.steps = 0;
        debug!(len = self.program.len(), "machine reset");
    }

    /// Reset, feed `inputs`, and execute until the machine halts or needs more input.
    ///
    /// The output queue is drained into the returned [`RunOutput`].
    pub fn run(&mut self, inputs: &[i64]) -> Result<RunOutput, MachineError> {
        self.reset();
        self.push_inputs(inputs.iter().copied());
        let status = self.resume()?;
        Ok(RunOutput {
            status,
            output: self.drain_output(),
        })
    }

    /// Execute until the machine halts or suspends on an empty input queue.
    ///
    /// Resuming a halted machine does nothing and reports [`Status::Halted`].
    pub fn resume(&mut self) -> Result<Status, MachineError> {
        if self.status == Status::Halted {
            debug!(pc = self.pc, "resume on halted machine ignored");
            return Ok(Status::Halted);
        }

        loop {
            match self.step()? {
                Status::Running => {}
                status => {
                    debug!(pc = self.pc, steps = self.steps, ?status, "machine paused");
                    return Ok(status);
                }
            }
        }
    }

    /// Fetch, decode and execute a single instruction.
    ///
    /// On error nothing has been modified: the instruction is rejected before it
    /// writes memory, moves the program counter or touches a queue.
    pub fn step(&mut self) -> Result<Status, MachineError> {
        if self.status == Status::Halted {
            return Ok(Status::Halted);
        }

        let pc = self.pc;
        if pc >= self.memory.extent() {
            warn!(pc, extent = self.memory.extent(), "program counter left memory");
            self.status = Status::Halted;
            return Ok(self.status);
        }

        // Fetched fresh every time, programs rewrite their own code
        let instr = Instruction::decode(self.memory.get(pc), pc)?;
        let opcode = instr.opcode;
        let next = pc + opcode.width();
        trace!(pc, %opcode, rb = self.relative_base, "execute");

        self.status = Status::Running;
        match opcode {
            Opcode::Add | Opcode::Multiply => {
                let a = self.read_param(&instr, 0)?;
                let b = self.read_param(&instr, 1)?;
                let dest = self.write_address(&instr, 2)?;
                let value = if opcode == Opcode::Add {
                    a.checked_add(b)
                } else {
                    a.checked_mul(b)
                }
                .ok_or(MachineError::Overflow { pc, opcode })?;
                self.memory.set(dest, value);
                self.pc = next;
            }

            Opcode::Input => {
                let dest = self.write_address(&instr, 0)?;
                match self.input.pop_front() {
                    Some(value) => {
                        self.memory.set(dest, value);
                        self.pc = next;
                    }
                    None => {
                        // Retried verbatim once input arrives
                        self.status = Status::AwaitingInput;
                        return Ok(self.status);
                    }
                }
            }

            Opcode::Output => {
                let value = self.read_param(&instr, 0)?;
                self.output.push_back(value);
                self.pc = next;
            }

            Opcode::JumpIfTrue | Opcode::JumpIfFalse => {
                let condition = self.read_param(&instr, 0)?;
                let target = self.read_param(&instr, 1)?;
                if (condition != 0) == (opcode == Opcode::JumpIfTrue) {
                    self.pc = self.to_address(target)?;
                } else {
                    self.pc = next;
                }
            }

            Opcode::LessThan | Opcode::Equals => {
                let a = self.read_param(&instr, 0)?;
                let b = self.read_param(&instr, 1)?;
                let dest = self.write_address(&instr, 2)?;
                let holds = if opcode == Opcode::LessThan {
                    a < b
                } else {
                    a == b
                };
                self.memory.set(dest, holds as i64);
                self.pc = next;
            }

            Opcode::AdjustBase => {
                let delta = self.read_param(&instr, 0)?;
                self.relative_base = self
                    .relative_base
                    .checked_add(delta)
                    .ok_or(MachineError::Overflow { pc, opcode })?;
                self.pc = next;
            }

            Opcode::Halt => {
                self.status = Status::Halted;
            }
        }

        self.steps += 1;
        Ok(self.status)
    }

    /// Raw operand word of parameter `index`
    fn operand(&self, index: usize) -> i64 {
        self.memory.get(self.pc + 1 + index)
    }

    /// Resolve a value-producing parameter
    fn read_param(&self, instr: &Instruction, index: usize) -> Result<i64, MachineError> {
        let operand = self.operand(index);
        match instr.modes[index] {
            Mode::Immediate => Ok(operand),
            Mode::Position => Ok(self.memory.get(self.to_address(operand)?)),
            Mode::Relative => Ok(self.memory.get(self.relative_address(instr, operand)?)),
        }
    }

    /// Resolve an address-producing parameter
    fn write_address(&self, instr: &Instruction, index: usize) -> Result<usize, MachineError> {
        let operand = self.operand(index);
        match instr.modes[index] {
            Mode::Position => self.to_address(operand),
            Mode::Relative => self.relative_address(instr, operand),
            Mode::Immediate => Err(MachineError::ImmediateWrite {
                pc: self.pc,
                word: self.memory.get(self.pc),
                param: index,
            }),
        }
    }

    fn relative_address(&self, instr: &Instruction, operand: i64) -> Result<usize, MachineError> {
        let address = operand
            .checked_add(self.relative_base)
            .ok_or(MachineError::Overflow {
                pc: self.pc,
                opcode: instr.opcode,
            })?;
        self.to_address(address)
    }

    fn to_address(&self, value: i64) -> Result<usize, MachineError> {
        usize::try_from(value).map_err(|_| MachineError::NegativeAddress {
            pc: self.pc,
            address: value,
        })
    }

    // ========== I/O ==========

    /// Append one value to the input queue
    pub fn push_input(&mut self, value: i64) {
        self.input.push_back(value);
    }

    /// Append values to the input queue in order
    pub fn push_inputs<I: IntoIterator<Item = i64>>(&mut self, values: I) {
        self.input.extend(values);
    }

    /// Output produced so far and not yet drained
    pub fn output(&self) -> &VecDeque<i64> {
        &self.output
    }

    /// Take every pending output value
    pub fn drain_output(&mut self) -> Vec<i64> {
        self.output.drain(..).collect()
    }

    /// Take the oldest pending output value
    pub fn pop_output(&mut self) -> Option<i64> {
        self.output.pop_front()
    }

    /// Input that has been supplied but not yet consumed
    pub fn input(&self) -> &VecDeque<i64> {
        &self.input
    }

    // ========== Memory access for harness code ==========

    /// Read a memory cell
    pub fn peek(&self, address: usize) -> i64 {
        self.memory.get(address)
    }

    /// Write a memory cell (e.g. flip a mode flag at address 0 before running)
    pub fn poke(&mut self, address: usize, value: i64) {
        self.memory.set(address, value);
    }

    // ========== Getters ==========

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_halted(&self) -> bool {
        self.status == Status::Halted
    }

    pub fn is_awaiting_input(&self) -> bool {
        self.status == Status::AwaitingInput
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn relative_base(&self) -> i64 {
        self.relative_base
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn program(&self) -> &[i64] {
        &self.program
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_halt() {
        let mut machine = Machine::new(vec![1, 0, 0, 0, 99]);
        let result = machine.run(&[]).unwrap();
        assert!(result.is_complete());
        assert_eq!(machine.peek(0), 2);
        assert_eq!(machine.steps(), 2);
        assert_eq!(machine.pc(), 4);
    }

    #[test]
    fn test_input_suspends_without_advancing() {
        // in [5]; out [5]; hlt
        let mut machine = Machine::new(vec![3, 5, 4, 5, 99, 0]);
        assert_eq!(machine.resume(), Ok(Status::AwaitingInput));
        assert_eq!(machine.pc(), 0);
        assert_eq!(machine.steps(), 0);
        assert!(machine.is_awaiting_input());

        // Resuming with nothing queued parks again
        assert_eq!(machine.resume(), Ok(Status::AwaitingInput));
        assert_eq!(machine.pc(), 0);

        machine.push_input(42);
        assert_eq!(machine.resume(), Ok(Status::Halted));
        assert_eq!(machine.output(), &[42]);
    }

    #[test]
    fn test_resume_after_halt_is_noop() {
        let mut machine = Machine::new(vec![104, 7, 99]);
        assert_eq!(machine.resume(), Ok(Status::Halted));
        let before = machine.clone();
        assert_eq!(machine.resume(), Ok(Status::Halted));
        assert_eq!(machine, before);
    }

    #[test]
    fn test_pc_past_end_halts() {
        // add with no halt: pc walks off the program
        let mut machine = Machine::new(vec![1101, 1, 1, 3]);
        let result = machine.run(&[]).unwrap();
        assert!(result.is_complete());
        assert_eq!(machine.peek(3), 2);
        assert_eq!(machine.pc(), 4);
    }

    #[test]
    fn test_jump_not_taken_advances() {
        // jz #1, #100 ; out #9 ; hlt
        let mut machine = Machine::new(vec![1106, 1, 100, 104, 9, 99]);
        let result = machine.run(&[]).unwrap();
        assert_eq!(result.output, vec![9]);
    }

    #[test]
    fn test_relative_mode_write() {
        // arb #10 ; in [rb+2] ; out [rb+2] ; hlt
        let mut machine = Machine::new(vec![109, 10, 203, 2, 204, 2, 99]);
        let result = machine.run(&[-3]).unwrap();
        assert_eq!(result.output, vec![-3]);
        assert_eq!(machine.peek(12), -3);
        assert_eq!(machine.relative_base(), 10);
    }

    #[test]
    fn test_unknown_opcode_leaves_state_untouched() {
        let mut machine = Machine::new(vec![104, 1, 55, 99]);
        let err = machine.resume().unwrap_err();
        assert_eq!(err, MachineError::UnknownOpcode { pc: 2, word: 55 });
        assert_eq!(machine.pc(), 2);
        assert_eq!(machine.output(), &[1]);

        // Deterministically fails again
        assert_eq!(machine.resume(), Err(err));
    }

    #[test]
    fn test_negative_address() {
        let mut machine = Machine::new(vec![4, -1, 99]);
        assert_eq!(
            machine.resume(),
            Err(MachineError::NegativeAddress { pc: 0, address: -1 })
        );

        let mut machine = Machine::new(vec![1105, 1, -4, 99]);
        assert_eq!(
            machine.resume(),
            Err(MachineError::NegativeAddress { pc: 0, address: -4 })
        );
    }

    #[test]
    fn test_overflow_is_reported() {
        let mut machine = Machine::new(vec![1102, i64::MAX, 2, 0, 99]);
        assert_eq!(
            machine.resume(),
            Err(MachineError::Overflow {
                pc: 0,
                opcode: Opcode::Multiply
            })
        );
        assert_eq!(machine.peek(0), 1102);
    }

    #[test]
    fn test_output_accessors() {
        let mut machine = Machine::new(vec![104, 1, 104, 2, 104, 3, 99]);
        machine.resume().unwrap();
        assert_eq!(machine.pop_output(), Some(1));
        assert_eq!(machine.drain_output(), vec![2, 3]);
        assert_eq!(machine.pop_output(), None);
    }

    #[test]
    fn test_pop_output_between_resumes() {
        // in [9]; out [9]; jnz #1, #0
        let mut machine = Machine::new(vec![3, 9, 4, 9, 1105, 1, 0, 0, 0, 0]);
        machine.push_inputs([1, 2]);
        machine.resume().unwrap();
        assert_eq!(machine.pop_output(), Some(1));

        machine.push_input(3);
        machine.resume().unwrap();
        assert_eq!(machine.pop_output(), Some(2));
        assert_eq!(machine.pop_output(), Some(3));
        assert_eq!(machine.pop_output(), None);
    }

    #[test]
    fn test_poke_highest_address() {
        let mut machine = Machine::new(vec![99]);
        machine.poke(usize::MAX, 1);
        assert_eq!(machine.peek(usize::MAX), 1);
        assert_eq!(machine.resume(), Ok(Status::Halted));
        assert_eq!(machine.pc(), 0);
    }

    #[test]
    fn test_reset_clears_far_writes() {
        // add #1, #1 -> [500]; hlt
        let mut machine = Machine::new(vec![1101, 1, 1, 500, 99]);
        machine.run(&[]).unwrap();
        assert_eq!(machine.peek(500), 2);

        machine.reset();
        assert_eq!(machine.peek(500), 0);
        assert_eq!(machine, Machine::new(vec![1101, 1, 1, 500, 99]));
    }
}

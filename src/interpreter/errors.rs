//! Error types for the Intcode machine
//!
//! This module defines [`MachineError`], which represents every way a program can
//! be malformed at run time (as opposed to parse errors in program text).
//!
//! All machine errors are fatal for the program being run. The failing instruction
//! is rejected before it touches memory, registers or queues, so the machine is
//! left exactly as it was when the instruction was fetched.

use super::opcode::Opcode;
use thiserror::Error;

/// Runtime errors raised while executing an Intcode program
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    /// The low two digits of the instruction word name no known operation
    #[error("unknown opcode in word {word} at address {pc}")]
    UnknownOpcode { pc: usize, word: i64 },

    /// A parameter mode digit other than 0, 1 or 2
    #[error("invalid mode {digit} for parameter {param} of word {word} at address {pc}")]
    InvalidMode {
        pc: usize,
        word: i64,
        digit: i64,
        param: usize,
    },

    /// Immediate mode used for a parameter the instruction writes to
    #[error("immediate mode on output parameter {param} of word {word} at address {pc}")]
    ImmediateWrite { pc: usize, word: i64, param: usize },

    /// An operand (or jump target) resolved to a negative address
    #[error("negative address {address} referenced at address {pc}")]
    NegativeAddress { pc: usize, address: i64 },

    /// Arithmetic left the signed 64-bit range
    #[error("integer overflow in {opcode} at address {pc}")]
    Overflow { pc: usize, opcode: Opcode },
}

impl MachineError {
    /// Address of the instruction that failed
    pub fn pc(&self) -> usize {
        match self {
            MachineError::UnknownOpcode { pc, .. }
            | MachineError::InvalidMode { pc, .. }
            | MachineError::ImmediateWrite { pc, .. }
            | MachineError::NegativeAddress { pc, .. }
            | MachineError::Overflow { pc, .. } => *pc,
        }
    }
}

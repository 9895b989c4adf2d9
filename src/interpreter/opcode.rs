//! Instruction decoding
//!
//! An instruction word packs the operation into its low two decimal digits and one
//! parameter mode per decimal digit above that, read right to left:
//!
//! ```text
//!   1002  →  modes 0,1,(0)  opcode 02
//!    ││└┴─ opcode (word % 100)
//!    │└─── mode of parameter 1
//!    └──── mode of parameter 2
//! ```
//!
//! Mode digits beyond the opcode's arity are ignored.

use super::errors::MachineError;
use std::fmt;

/// Largest number of parameters any instruction takes
pub const MAX_PARAMS: usize = 3;

/// The operation selected by an instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add = 1,
    Multiply = 2,
    Input = 3,
    Output = 4,
    JumpIfTrue = 5,
    JumpIfFalse = 6,
    LessThan = 7,
    Equals = 8,
    AdjustBase = 9,
    Halt = 99,
}

/// Whether a parameter produces a value or names the address to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    Read,
    Write,
}

use Param::{Read, Write};

impl Opcode {
    pub fn from_code(code: i64) -> Option<Self> {
        use Opcode::*;
        Some(match code {
            1 => Add,
            2 => Multiply,
            3 => Input,
            4 => Output,
            5 => JumpIfTrue,
            6 => JumpIfFalse,
            7 => LessThan,
            8 => Equals,
            9 => AdjustBase,
            99 => Halt,
            _ => return None,
        })
    }

    /// Parameter kinds in operand order
    pub fn params(self) -> &'static [Param] {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => {
                &[Read, Read, Write]
            }
            Opcode::Input => &[Write],
            Opcode::Output | Opcode::AdjustBase => &[Read],
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => &[Read, Read],
            Opcode::Halt => &[],
        }
    }

    pub fn arity(self) -> usize {
        self.params().len()
    }

    /// Total words occupied by the instruction, including the opcode word
    pub fn width(self) -> usize {
        1 + self.arity()
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "add",
            Opcode::Multiply => "mul",
            Opcode::Input => "in",
            Opcode::Output => "out",
            Opcode::JumpIfTrue => "jnz",
            Opcode::JumpIfFalse => "jz",
            Opcode::LessThan => "lt",
            Opcode::Equals => "eq",
            Opcode::AdjustBase => "arb",
            Opcode::Halt => "hlt",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Addressing mode of a single parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Operand is an address
    #[default]
    Position,
    /// Operand is the value itself (read parameters only)
    Immediate,
    /// Operand is an offset from the relative base
    Relative,
}

impl Mode {
    fn from_digit(digit: i64) -> Option<Self> {
        match digit {
            0 => Some(Mode::Position),
            1 => Some(Mode::Immediate),
            2 => Some(Mode::Relative),
            _ => None,
        }
    }
}

/// A decoded instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Modes for parameters `0..opcode.arity()`; the rest stay `Position`
    pub modes: [Mode; MAX_PARAMS],
}

impl Instruction {
    /// Decode the word fetched from `pc`
    ///
    /// Negative words are rejected as [`MachineError::UnknownOpcode`] rather than
    /// decoded through a floored `mod 100` (which would read `-1` as `hlt`). No
    /// well-formed program executes a negative word, so it is treated as a fault.
    pub fn decode(word: i64, pc: usize) -> Result<Self, MachineError> {
        if word < 0 {
            return Err(MachineError::UnknownOpcode { pc, word });
        }

        let opcode =
            Opcode::from_code(word % 100).ok_or(MachineError::UnknownOpcode { pc, word })?;

        let mut modes = [Mode::Position; MAX_PARAMS];
        let mut digits = word / 100;
        for (param, kind) in opcode.params().iter().enumerate() {
            let digit = digits % 10;
            digits /= 10;

            let mode = Mode::from_digit(digit).ok_or(MachineError::InvalidMode {
                pc,
                word,
                digit,
                param,
            })?;
            if *kind == Write && mode == Mode::Immediate {
                return Err(MachineError::ImmediateWrite { pc, word, param });
            }
            modes[param] = mode;
        }

        Ok(Instruction { opcode, modes })
    }
}

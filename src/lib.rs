//! # Introduction
//!
//! `intcode` runs Intcode programs: flat lists of signed integers that are both
//! code and data.  A [`interpreter::machine::Machine`] executes until it halts
//! or asks for input it does not have, and can be resumed once input arrives,
//! so several machines can be wired together as cooperating coroutines.
//!
//! ## Execution pipeline
//!
//! ```text
//! Text → Parser → Machine ⇄ Input/Output queues → Session → TUI
//! ```
//!
//! 1. [`parser`]: turns comma-separated program text into words.
//! 2. [`interpreter`]: decodes and executes instructions, disassembles memory,
//!    and records execution history in a [`interpreter::session::Session`].
//! 3. [`memory`]: zero-defaulting memory with a dense prefix and a sparse tail.
//! 4. [`ascii`]: text conventions for programs that talk in character codes.
//! 5. [`snapshot`]: snapshot store with a configurable memory limit.
//! 6. [`ui`]: ratatui-based debugger; not part of the stable library API.
//!
//! ## Instruction set
//!
//! `add` (1), `mul` (2), `in` (3), `out` (4), `jnz` (5), `jz` (6), `lt` (7),
//! `eq` (8), `arb` (9) and `hlt` (99), with position, immediate and relative
//! parameter modes.

pub mod ascii;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod snapshot;
pub mod ui;

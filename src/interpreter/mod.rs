//! Intcode execution engine
//!
//! This module provides the core execution logic:
//! - [`machine`]: The resumable fetch-decode-execute loop
//! - [`opcode`]: Instruction word decoding and parameter modes
//! - [`errors`]: Runtime error types
//! - [`disasm`]: Human-readable listings of memory
//! - [`session`]: Recorded history for stepping backward and forward
//!
//! # Execution Model
//!
//! A [`machine::Machine`] runs until it halts or reaches an input instruction with
//! nothing queued. At that point it returns control to the caller, which may feed
//! it more input and resume. Nothing else ever blocks, so any number of machines
//! can be interleaved on one thread by an outside scheduler.

pub mod constants;
pub mod disasm;
pub mod errors;
pub mod machine;
pub mod opcode;
pub mod session;

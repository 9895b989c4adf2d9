//! TUI pane rendering modules
//!
//! Each pane module exports a primary `render_*` function plus whatever scroll state
//! it needs to keep between frames.
//!
//! # Pane Modules
//!
//! - [`disasm`]: Disassembly listing with the current instruction highlighted
//! - [`registers`]: Status, program counter, relative base and queues
//! - [`memory`]: Raw memory dump around the program counter
//! - [`terminal`]: Program output decoded as ASCII text
//! - [`status`]: Status bar with keybindings and execution state
//! - `utils`: Shared block styling

mod utils;

pub mod disasm;
pub mod memory;
pub mod registers;
pub mod status;
pub mod terminal;

// Re-export render functions for convenience
pub use disasm::{render_disasm_pane, DisasmScrollState};
pub use memory::{render_memory_pane, MemoryScrollState};
pub use registers::{render_registers_pane, RegistersRenderData};
pub use status::{render_status_bar, StatusRenderData};
pub use terminal::render_terminal_pane;

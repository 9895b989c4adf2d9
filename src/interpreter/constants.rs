// Constants for the Intcode machine

/// Addresses below this limit live in a growable vector; anything higher is
/// stored sparsely. 1 Mi cells = 8 MiB worst case per machine.
pub const DENSE_MEMORY_LIMIT: usize = 1 << 20;

/// Default memory budget for the session history (1 GiB)
pub const DEFAULT_SNAPSHOT_LIMIT: usize = 1024 * 1024 * 1024;

/// Delay between steps while the debugger is auto-playing
pub const PLAY_INTERVAL_MS: u64 = 200;

/// Line terminator used by ASCII-speaking programs
pub const NEWLINE: i64 = 10;

/// Most instructions a single "run to pause" in the debugger will execute
pub const RUN_STEP_LIMIT: usize = 50_000;

/// Words listed on either side of the program counter in the disassembly pane
pub const DISASM_WINDOW: usize = 256;

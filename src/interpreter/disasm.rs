//! Disassembler: human-readable listing of machine memory.
//!
//! Operands are rendered by mode: position `[12]`, immediate `#12`,
//! relative `[rb+12]` / `[rb-3]`. Words that do not decode are shown as `.data`.

use crate::interpreter::opcode::{Instruction, Mode};
use crate::memory::Memory;
use std::fmt;

/// One line of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub address: usize,
    /// Raw words covered by this line
    pub words: Vec<i64>,
    pub text: String,
}

impl Line {
    /// Words this line spans
    pub fn width(&self) -> usize {
        self.words.len()
    }

    pub fn contains(&self, address: usize) -> bool {
        address >= self.address && address < self.address + self.width()
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}  {}", self.address, self.text)
    }
}

/// Disassemble the instruction starting at `address`
pub fn disassemble_at(memory: &Memory, address: usize) -> Line {
    let word = memory.get(address);
    let instr = match Instruction::decode(word, address) {
        Ok(instr) => instr,
        Err(_) => return data_line(address, word),
    };

    let words = memory.slice(address, instr.opcode.width());
    let operands: Vec<String> = words[1..]
        .iter()
        .zip(instr.modes.iter())
        .map(|(&operand, &mode)| format_operand(operand, mode))
        .collect();

    let text = if operands.is_empty() {
        instr.opcode.mnemonic().to_string()
    } else {
        format!("{} {}", instr.opcode.mnemonic(), operands.join(", "))
    };

    Line {
        address,
        words,
        text,
    }
}

/// Linear sweep over `0..end`.
///
/// Code and data are interleaved and programs rewrite themselves, so a sweep from 0
/// can straddle the current instruction. When a line would swallow `pc` it is cut
/// short into `.data` words and decoding resumes exactly at `pc`.
pub fn listing(memory: &Memory, pc: usize, end: usize) -> Vec<Line> {
    sweep(memory, 0, pc, end)
}

/// Listing of at most `before` words ahead of `pc` and `after` words from it.
///
/// The cost depends only on the window, not on how far `pc` is from 0. A `pc` at
/// or beyond the end of memory is listed on its own.
pub fn window(memory: &Memory, pc: usize, before: usize, after: usize) -> Vec<Line> {
    let extent = memory.extent();
    if pc >= extent {
        return vec![disassemble_at(memory, pc)];
    }
    let start = pc.saturating_sub(before);
    let end = pc.saturating_add(after).min(extent).max(pc + 1);
    sweep(memory, start, pc, end)
}

fn sweep(memory: &Memory, start: usize, pc: usize, end: usize) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut address = start;

    while address < end {
        let line = disassemble_at(memory, address);
        if address < pc && line.contains(pc) {
            for addr in address..pc {
                lines.push(data_line(addr, memory.get(addr)));
            }
            address = pc;
            continue;
        }
        address += line.width();
        lines.push(line);
    }

    lines
}

fn data_line(address: usize, word: i64) -> Line {
    Line {
        address,
        words: vec![word],
        text: format!(".data {}", word),
    }
}

fn format_operand(operand: i64, mode: Mode) -> String {
    match mode {
        Mode::Position => format!("[{}]", operand),
        Mode::Immediate => format!("#{}", operand),
        Mode::Relative if operand < 0 => format!("[rb-{}]", operand.unsigned_abs()),
        Mode::Relative => format!("[rb+{}]", operand),
    }
}

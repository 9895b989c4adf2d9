//! ASCII text layer
//!
//! Many programs talk in text: each character is sent as its character code and
//! lines end with `10`. Values outside printable ASCII in the output stream are not
//! text at all (a final score, a distance, a damage count) and are surfaced as
//! [`AsciiItem::Value`].

use crate::interpreter::constants::NEWLINE;
use crate::interpreter::machine::Machine;

/// A decoded piece of program output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsciiItem {
    Line(String),
    Value(i64),
}

fn is_printable(value: i64) -> bool {
    (32..=126).contains(&value)
}

/// Encode one line of text, terminator included
pub fn encode_line(line: &str) -> Vec<i64> {
    line.chars()
        .map(|c| c as i64)
        .chain(std::iter::once(NEWLINE))
        .collect()
}

/// Encode several lines back to back
pub fn encode_lines<I, S>(lines: I) -> Vec<i64>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .flat_map(|line| encode_line(line.as_ref()))
        .collect()
}

/// Split an output stream into text lines and out-of-band values.
///
/// A value that is not a character ends the line in progress, so text printed
/// before it is never lost. Text after the last newline becomes a final line.
pub fn decode<'a, I>(output: I) -> Vec<AsciiItem>
where
    I: IntoIterator<Item = &'a i64>,
{
    let mut items = Vec::new();
    let mut current = String::new();

    for &value in output {
        if value == NEWLINE {
            items.push(AsciiItem::Line(std::mem::take(&mut current)));
        } else if is_printable(value) {
            current.push(value as u8 as char);
        } else {
            if !current.is_empty() {
                items.push(AsciiItem::Line(std::mem::take(&mut current)));
            }
            items.push(AsciiItem::Value(value));
        }
    }

    if !current.is_empty() {
        items.push(AsciiItem::Line(current));
    }

    items
}

/// Render an output stream for a terminal, one item per line
pub fn render<'a, I>(output: I) -> String
where
    I: IntoIterator<Item = &'a i64>,
{
    decode(output)
        .into_iter()
        .map(|item| match item {
            AsciiItem::Line(text) => text,
            AsciiItem::Value(value) => value.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl Machine {
    /// Queue one line of text as input
    pub fn push_ascii_line(&mut self, line: &str) {
        self.push_inputs(encode_line(line));
    }

    /// Queue several lines of text as input
    pub fn push_ascii_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.push_inputs(encode_lines(lines));
    }
}

// intcode: resumable Intcode machine with a time-travel debugger

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use intcode::ascii;
use intcode::interpreter::constants::DEFAULT_SNAPSHOT_LIMIT;
use intcode::interpreter::disasm;
use intcode::interpreter::machine::{Machine, Status};
use intcode::interpreter::session::Session;
use intcode::parser::parse_program;
use intcode::ui::App;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// intcode: run, disassemble and debug Intcode programs
#[derive(Parser)]
#[command(name = "intcode", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a program to completion, printing its output
    Run {
        #[command(flatten)]
        load: LoadArgs,

        /// Text lines fed to the program as character codes
        #[arg(short, long = "line", value_name = "TEXT")]
        lines: Vec<String>,

        /// Print output as text instead of one value per line
        #[arg(long)]
        ascii: bool,

        /// Read more input from stdin whenever the program asks for it
        #[arg(long)]
        interactive: bool,
    },

    /// Print a disassembly listing of a program
    Disasm { file: PathBuf },

    /// Step through a program in the terminal debugger
    Debug {
        #[command(flatten)]
        load: LoadArgs,

        /// History budget in MiB
        #[arg(long, value_name = "MIB")]
        snapshot_limit: Option<usize>,
    },
}

#[derive(Args)]
struct LoadArgs {
    /// Program file (comma-separated integers)
    file: PathBuf,

    /// Input values, e.g. "5" or "1,2,3"
    #[arg(short, long, value_name = "N,N,...")]
    input: Option<String>,

    /// Overwrite a memory cell before running, e.g. "1=12"
    #[arg(long, value_name = "ADDR=VALUE", value_parser = parse_poke)]
    poke: Vec<(usize, i64)>,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            load,
            lines,
            ascii,
            interactive,
        } => cmd_run(&load, &lines, ascii, interactive),
        Command::Disasm { file } => cmd_disasm(&file),
        Command::Debug {
            load,
            snapshot_limit,
        } => cmd_debug(&load, snapshot_limit),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_run(load: &LoadArgs, lines: &[String], text: bool, interactive: bool) -> Result<()> {
    let mut machine = load.machine()?;
    machine.push_ascii_lines(lines);

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    loop {
        let status = machine
            .resume()
            .with_context(|| format!("{} failed", load.file.display()))?;
        write_output(&mut stdout, &machine.drain_output(), text)?;

        match status {
            // resume only returns once the machine has paused
            Status::Halted | Status::Running => return Ok(()),
            Status::AwaitingInput if interactive => {
                stdout.flush()?;
                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 {
                    bail!("program is waiting for input but stdin is closed");
                }
                let line = line.trim_end_matches(['\r', '\n']);
                if text {
                    machine.push_ascii_line(line);
                } else {
                    machine.push_inputs(parse_program(line).context("invalid input")?);
                }
            }
            Status::AwaitingInput => {
                bail!(
                    "program is waiting for input at address {} (pass more with --input or --interactive)",
                    machine.pc()
                );
            }
        }
    }
}

fn cmd_disasm(file: &Path) -> Result<()> {
    let machine = Machine::new(load_program(file)?);
    let memory = machine.memory();

    let mut stdout = io::stdout().lock();
    for line in disasm::listing(memory, 0, memory.extent()) {
        let words: Vec<String> = line.words.iter().map(i64::to_string).collect();
        writeln!(stdout, "{:<40} ; {}", line.to_string(), words.join(","))?;
    }
    Ok(())
}

fn cmd_debug(load: &LoadArgs, snapshot_limit: Option<usize>) -> Result<()> {
    let machine = load.machine()?;
    let limit = snapshot_limit
        .map(|mib| mib.saturating_mul(1024 * 1024))
        .unwrap_or(DEFAULT_SNAPSHOT_LIMIT);
    let session = Session::new(machine, limit)?;

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(session);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("debugger failed")
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl LoadArgs {
    fn machine(&self) -> Result<Machine> {
        let mut machine = Machine::new(load_program(&self.file)?);
        for &(address, value) in &self.poke {
            machine.poke(address, value);
        }
        if let Some(input) = &self.input {
            machine.push_inputs(parse_program(input).context("invalid --input")?);
        }
        Ok(machine)
    }
}

fn load_program(path: &Path) -> Result<Vec<i64>> {
    let source =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    parse_program(&source).with_context(|| format!("cannot parse {}", path.display()))
}

fn parse_poke(arg: &str) -> Result<(usize, i64), String> {
    let (address, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=VALUE, got '{}'", arg))?;
    let address = address
        .trim()
        .parse()
        .map_err(|_| format!("invalid address '{}'", address))?;
    let value = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid value '{}'", value))?;
    Ok((address, value))
}

fn write_output(out: &mut impl Write, values: &[i64], text: bool) -> io::Result<()> {
    if values.is_empty() {
        return Ok(());
    }
    if text {
        writeln!(out, "{}", ascii::render(values))
    } else {
        for value in values {
            writeln!(out, "{}", value)?;
        }
        Ok(())
    }
}

//! DCPU-16 Emulator - CLI Entry Point
//!
//! Commands:
//! - `dcpu16-emu run <image>` - Run a program image for a number of ticks
//! - `dcpu16-emu disasm <image>` - Disassemble a program image

use clap::{Parser, Subcommand};
use dcpu16::{Cpu, CpuState, Reg, Registers, Word};
use serde::Serialize;
use std::process::exit;
use tracing::{error, info, warn};
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(name = "dcpu16-emu")]
#[command(version)]
#[command(about = "An instruction-set emulator for the 16-bit DCPU-16 processor")]
struct Cli {
    /// Increase the level of verbosity. Can be used multiple times.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program for a fixed number of ticks
    Run {
        /// Path to the image (.hex/.txt text, anything else raw big-endian binary)
        program: String,
        /// Number of instructions to execute
        #[arg(short = 'n', long, default_value = "10000")]
        ticks: u64,
        /// Print the instruction trace
        #[arg(short, long)]
        trace: bool,
        /// Print the final state as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Disassemble a program image to readable text
    Disasm {
        /// Path to the image
        program: String,
    },
}

impl Cli {
    const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "dcpu16=info,dcpu16_emu=info,warn",
            2 => "dcpu16=debug,dcpu16_emu=debug,info",
            _ => "trace",
        }
    }

    fn filter_layer(&self) -> EnvFilter {
        // RUST_LOG wins over -v
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.log_filter()))
    }
}

/// Final machine state printed by `run --json`.
#[derive(Serialize)]
struct RunReport<'a> {
    ticks: u64,
    state: CpuState,
    registers: &'a Registers,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.filter_layer())
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Some(Commands::Run { program, ticks, trace, json }) => {
            run_program(&program, ticks, trace, json);
        }
        Some(Commands::Disasm { program }) => {
            disassemble_file(&program);
        }
        None => {
            println!("DCPU-16 Emulator v{}", env!("CARGO_PKG_VERSION"));
            println!("A 16-bit DCPU-16 instruction-set emulator");
            println!();
            println!("Use --help for available commands");
        }
    }
}

fn load_or_exit(path: &str) -> Vec<Word> {
    match dcpu16::load_image(path) {
        Ok(words) => words,
        Err(e) => {
            error!(path, "failed to load image: {}", e);
            exit(1);
        }
    }
}

fn run_program(path: &str, ticks: u64, trace: bool, json: bool) {
    let image = load_or_exit(path);
    if image.is_empty() {
        warn!(path, "image is empty, running zeroed memory");
    }

    let mut cpu = if trace { Cpu::with_trace() } else { Cpu::new() };
    let loaded = cpu.load(&image);
    info!(path, words = loaded, ticks, "running program");

    let snapshot = cpu.run(ticks);

    if let Some(log) = cpu.trace_mut() {
        print!("{}", log.take());
    }

    if json {
        let report = RunReport {
            ticks: snapshot.ticks,
            state: snapshot.state,
            registers: &snapshot.registers,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("failed to serialize report: {}", e);
                exit(1);
            }
        }
        return;
    }

    let regs = &snapshot.registers;
    println!();
    println!("━━━ Result ━━━");
    println!("Ticks: {}", snapshot.ticks);
    println!("State: {:?}", snapshot.state);
    for reg in Reg::GENERAL {
        println!("{:<2} = 0x{:04X}", reg.name(), regs.get(reg));
    }
    println!("PC = 0x{:04X}", regs.pc);
    println!("SP = 0x{:04X}", regs.sp);
    println!("O  = 0x{:04X}", regs.o);
}

fn disassemble_file(path: &str) {
    let image = load_or_exit(path);
    print!("{}", dcpu16::disassemble(&image));
}

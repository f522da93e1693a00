#![warn(clippy::all, rust_2018_idioms)]

//! `lc3sim`: the thin binary wrapping `lc3core`. Owns the four things the
//! core library deliberately doesn't: CLI parsing, the object-file loader
//! invocation, terminal raw-mode input, and the logging bootstrap.

mod cli;

use std::io::{IsTerminal, Read, Write};
use std::sync::mpsc;
use std::time::{SystemTime, UNIX_EPOCH};

use lc3core::debugger::{Debugger, ReplOutcome};
use lc3core::loader;
use lc3core::machine::Machine;

use cli::Args;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let parsed = match Args::parse(args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("lc3sim: {err}");
            std::process::exit(1);
        }
    };

    init_logging();

    if parsed.help {
        print!("{}", cli::HELP_TEXT);
        return;
    }

    if parsed.programs.is_empty() {
        eprintln!("lc3sim: {}", lc3core::error::CliError::NoProgramFile);
        eprintln!("{}", cli::HELP_TEXT);
        std::process::exit(1);
    }

    std::process::exit(run(parsed));
}

fn init_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt_layer)
        .try_init();
}

fn run(args: Args) -> i32 {
    let mut machine = Machine::new();

    if args.randomize {
        randomize_user_space(&mut machine);
    }

    let user_pc_slot = machine.rom_layout.bootstrap + 10;
    if let Err(err) = loader::load_all(&mut machine.memory, &args.programs, user_pc_slot) {
        eprintln!("lc3sim: {err}");
        return 1;
    }

    for &(addr, value) in &args.memory {
        machine.memory.write(addr, value);
    }

    let debugging = args.debug;

    // Stdin can't serve both the emulated keyboard and debugger commands at
    // once; when the debugger is attached, the REPL owns stdin and `--input`
    // is the only way to feed the emulated keyboard.
    let input_rx = if debugging { args.input.clone().map(literal_input_feed) } else { spawn_input_feed(args.input.clone()) };

    if !args.silent {
        println!("-- lc3sim --");
    }

    machine.start_running();

    let mut debugger = Debugger::new();
    if debugging {
        debugger.break_at_entry(machine.memory.read(user_pc_slot));
    }

    let stdin = std::io::stdin();
    let mut repl_input = stdin.lock();
    let mut repl_output = std::io::stdout();

    while machine.running() {
        if let Some(rx) = &input_rx {
            while let Ok(byte) = rx.try_recv() {
                machine.memory.feed_input([byte]);
            }
        }

        if debugging {
            let pc = machine.pc.get();
            if debugger.should_pause(pc, false) {
                match debugger.repl(&mut machine, &mut repl_input, &mut repl_output) {
                    Ok(ReplOutcome::Proceed) => {}
                    Ok(ReplOutcome::Quit) => break,
                    Err(err) => {
                        eprintln!("lc3sim: debugger I/O error: {err}");
                        break;
                    }
                }
            }
        }

        machine.memory.pump_input();
        let faulted = machine.step().is_some();
        let mcc = machine.memory.read(lc3core::memory::MCC_ADDR as u16).wrapping_add(1);
        machine.memory.write(lc3core::memory::MCC_ADDR as u16, mcc);

        if !args.silent {
            let produced = machine.memory.take_output();
            if !produced.is_empty() {
                std::io::stdout().write_all(&produced).ok();
                std::io::stdout().flush().ok();
            }
        }

        if debugging && faulted {
            let pc = machine.pc.get();
            debugger.should_pause(pc, true);
        }
    }

    if !args.silent {
        println!();
    }

    for &addr in &args.dump {
        println!("mem[0x{addr:04X}] = 0x{:04X}", machine.memory.read(addr));
    }

    0
}

/// Fills user space with pseudo-random words before loading. No `rand`
/// dependency: a small xorshift32 generator seeded from wall clock time is
/// plenty for "exercise uninitialized-memory bugs," which is the only
/// reason this flag exists.
fn randomize_user_space(machine: &mut Machine) {
    let seed = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.subsec_nanos()).unwrap_or(0x9E3779B9) | 1;
    let mut state = seed;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    };

    for addr in lc3core::memory::USER_SPACE_LOW..=lc3core::memory::USER_SPACE_HIGH {
        machine.memory.write(addr, next() as u16);
    }
}

/// Feeds a `--input` literal byte-by-byte with no background thread needed.
fn literal_input_feed(text: String) -> mpsc::Receiver<u8> {
    let (tx, rx) = mpsc::channel();
    for byte in text.into_bytes() {
        let _ = tx.send(byte);
    }
    rx
}

/// When `--input` supplies a literal string, feed it byte-by-byte with no
/// background thread needed. Otherwise, if stdin is a TTY, spawn a reader
/// thread so the run loop never blocks waiting on the keyboard. Terminal
/// raw-mode handling lives only here, never in the core library.
fn spawn_input_feed(literal: Option<String>) -> Option<mpsc::Receiver<u8>> {
    if let Some(text) = literal {
        return Some(literal_input_feed(text));
    }

    if !std::io::stdin().is_terminal() {
        return None;
    }

    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut byte = [0u8; 1];
        let mut stdin = std::io::stdin();
        while stdin.read(&mut byte).unwrap_or(0) == 1 {
            if tx.send(byte[0]).is_err() {
                break;
            }
        }
    });

    Some(rx)
}

//! Component I: the interactive debugger REPL.
//!
//! Breakpoint, step, and register/memory inspection handling, reimplemented
//! here as a line-oriented REPL rather than a GUI panel.
//!
//! The debugger is interposed by [`crate::machine::Machine`]'s caller (the
//! loop driver in the `lc3sim` binary) between loop iterations: breakpoints
//! and step state are checked *after* an instruction has run and *before*
//! the next one is fetched, which is exactly when [`Debugger::should_pause`]
//! is consulted.

use std::io::{BufRead, Write};

use crate::cell::Word;
use crate::decode::top_nibble;
use crate::disasm::disassemble;
use crate::hex::parse_u16;
use crate::machine::Machine;

/// Breakpoint list cap.
pub const MAX_BREAKPOINTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplOutcome {
    /// Release the REPL and let the driver execute instructions again.
    Proceed,
    /// Exit the emulator entirely (`q`/`quit`).
    Quit,
}

/// Debugger state carried across loop iterations: the breakpoint set, the
/// "continue until something interesting happens" flag, any pending
/// one-shot step-over target, and the last command (for empty-line repeat).
pub struct Debugger {
    /// Insertion-ordered so `break pop` can remove the most recent entry.
    breakpoints: Vec<u16>,
    continuing: bool,
    step_over_target: Option<u16>,
    last_command: Option<String>,
}

impl Debugger {
    pub fn new() -> Self {
        Self {
            breakpoints: Vec::new(),
            continuing: false,
            step_over_target: None,
            last_command: None,
        }
    }

    /// Places an automatic breakpoint at the user program entry point.
    /// Called once the loader has resolved the user PC.
    pub fn break_at_entry(&mut self, entry: u16) {
        if !self.breakpoints.contains(&entry) {
            self.breakpoints.push(entry);
        }
    }

    /// Should the REPL run again before the instruction at `pc` is fetched?
    /// `faulted` is true if the instruction that just ran dispatched an
    /// exception, which always interrupts a `continue` (run until
    /// breakpoint, clock-off, or exception).
    pub fn should_pause(&mut self, pc: u16, faulted: bool) -> bool {
        if faulted {
            self.continuing = false;
            self.step_over_target = None;
            return true;
        }
        if let Some(target) = self.step_over_target {
            if pc != target {
                return false;
            }
            self.step_over_target = None;
            self.continuing = false;
            return true;
        }
        if self.continuing {
            if !self.breakpoints.contains(&pc) {
                return false;
            }
            self.continuing = false;
        }
        true
    }

    /// Runs the REPL until a command releases execution (`step`, `next`,
    /// `continue`) or the user quits. Reads commands from `input`, one per
    /// line; an empty line repeats the previous command.
    pub fn repl(&mut self, machine: &mut Machine, input: &mut dyn BufRead, output: &mut dyn Write) -> std::io::Result<ReplOutcome> {
        loop {
            write!(output, "(lc3db) 0x{:04X}> ", machine.pc.get())?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                return Ok(ReplOutcome::Quit); // EOF on stdin
            }
            let trimmed = line.trim();
            let command = if trimmed.is_empty() {
                match self.last_command.clone() {
                    Some(prev) => prev,
                    None => continue,
                }
            } else {
                self.last_command = Some(trimmed.to_string());
                trimmed.to_string()
            };

            if let Some(outcome) = self.dispatch(&command, machine, output)? {
                return Ok(outcome);
            }
        }
    }

    fn dispatch(&mut self, command: &str, machine: &mut Machine, output: &mut dyn Write) -> std::io::Result<Option<ReplOutcome>> {
        let mut parts = command.split_whitespace();
        let head = parts.next().unwrap_or("");
        let rest: Vec<&str> = parts.collect();

        match head {
            "s" | "step" => return Ok(Some(ReplOutcome::Proceed)),
            "c" | "continue" => {
                self.continuing = true;
                return Ok(Some(ReplOutcome::Proceed));
            }
            "n" | "next" => {
                if self.instruction_at_pc_is_call(machine) {
                    self.step_over_target = Some(machine.pc.get().wrapping_add(1));
                    self.continuing = true;
                }
                return Ok(Some(ReplOutcome::Proceed));
            }
            "q" | "quit" => return Ok(Some(ReplOutcome::Quit)),
            "clear" => {
                write!(output, "\x1B[2J\x1B[H")?;
            }
            "help" => self.print_help(rest.first().copied(), output)?,
            "read" => self.cmd_read(&rest, machine, output)?,
            "write" => self.cmd_write(&rest, machine, output)?,
            "decode" => self.cmd_decode(&rest, machine, output)?,
            "decode-i" => self.cmd_decode_i(&rest, output)?,
            "goto" => self.cmd_goto(&rest, machine, output)?,
            "reg" => self.cmd_reg(&rest, machine, output)?,
            "break" => self.cmd_break(&rest, output)?,
            "" => {}
            other => writeln!(output, "unknown command: {other} (try 'help')")?,
        }
        Ok(None)
    }

    /// `next` steps over the call if the instruction about to execute is
    /// JSR/JSRR or TRAP, otherwise it behaves like `step`.
    fn instruction_at_pc_is_call(&self, machine: &Machine) -> bool {
        let ir = Word::new(machine.memory.read(machine.pc.get()));
        matches!(top_nibble(ir), 0b0100 | 0b1111)
    }

    fn cmd_read(&self, args: &[&str], machine: &Machine, output: &mut dyn Write) -> std::io::Result<()> {
        match args.first().and_then(|t| parse_u16(t)) {
            Some(addr) => writeln!(output, "mem[0x{addr:04X}] = 0x{:04X}", machine.memory.read(addr)),
            None => writeln!(output, "usage: read <hex>"),
        }
    }

    fn cmd_write(&self, args: &[&str], machine: &mut Machine, output: &mut dyn Write) -> std::io::Result<()> {
        match (args.first().and_then(|t| parse_u16(t)), args.get(1).and_then(|t| parse_u16(t))) {
            (Some(addr), Some(value)) => {
                machine.memory.write(addr, value);
                writeln!(output, "mem[0x{addr:04X}] <- 0x{value:04X}")
            }
            _ => writeln!(output, "usage: write <hex addr> <hex value>"),
        }
    }

    fn cmd_decode(&self, args: &[&str], machine: &Machine, output: &mut dyn Write) -> std::io::Result<()> {
        let addr = match args.first() {
            Some(&"PC") | Some(&"pc") => Some(machine.pc.get()),
            Some(token) => parse_u16(token),
            None => None,
        };
        match addr {
            Some(addr) => writeln!(output, "0x{addr:04X}: {}", disassemble(machine.memory.read(addr))),
            None => writeln!(output, "usage: decode <hex|PC>"),
        }
    }

    fn cmd_decode_i(&self, args: &[&str], output: &mut dyn Write) -> std::io::Result<()> {
        match args.first().and_then(|t| parse_u16(t)) {
            Some(word) => writeln!(output, "{}", disassemble(word)),
            None => writeln!(output, "usage: decode-i <hex>"),
        }
    }

    fn cmd_goto(&self, args: &[&str], machine: &mut Machine, output: &mut dyn Write) -> std::io::Result<()> {
        match args.first().and_then(|t| parse_u16(t)) {
            Some(addr) => {
                machine.pc.set(addr);
                writeln!(output, "PC <- 0x{addr:04X}")
            }
            None => writeln!(output, "usage: goto <hex>"),
        }
    }

    fn cmd_reg(&self, args: &[&str], machine: &mut Machine, output: &mut dyn Write) -> std::io::Result<()> {
        match args.first().copied() {
            Some("list") | Some("show") => {
                for i in 0..8 {
                    writeln!(output, "R{i} = 0x{:04X}", machine.r[i].get())?;
                }
                writeln!(output, "PC  = 0x{:04X}", machine.pc.get())?;
                writeln!(output, "IR  = 0x{:04X}", machine.ir.get())?;
                writeln!(output, "PSR = 0x{:04X}", machine.psr())
            }
            Some("clear") => {
                for i in 0..8 {
                    machine.r[i].set(0);
                }
                writeln!(output, "R0..R7 cleared")
            }
            Some("set") => match (args.get(1).and_then(|t| parse_register(t)), args.get(2).and_then(|t| parse_u16(t))) {
                (Some(reg), Some(value)) => {
                    machine.r[reg].set(value);
                    writeln!(output, "R{reg} <- 0x{value:04X}")
                }
                _ => writeln!(output, "usage: reg set R# <hex>"),
            },
            _ => writeln!(output, "usage: reg list|show|clear|set R# <hex>"),
        }
    }

    fn cmd_break(&mut self, args: &[&str], output: &mut dyn Write) -> std::io::Result<()> {
        match args.first().copied() {
            Some("add") | Some("push") => match args.get(1).and_then(|t| parse_u16(t)) {
                Some(addr) => {
                    if self.breakpoints.len() >= MAX_BREAKPOINTS {
                        writeln!(output, "breakpoint list full (max {MAX_BREAKPOINTS})")
                    } else if self.breakpoints.contains(&addr) {
                        writeln!(output, "breakpoint already set at 0x{addr:04X}")
                    } else {
                        self.breakpoints.push(addr);
                        writeln!(output, "breakpoint set at 0x{addr:04X}")
                    }
                }
                None => writeln!(output, "usage: break add <hex>"),
            },
            Some("rm") | Some("remove") => match args.get(1).and_then(|t| parse_u16(t)) {
                Some(addr) => {
                    let before = self.breakpoints.len();
                    self.breakpoints.retain(|&b| b != addr);
                    if self.breakpoints.len() == before {
                        writeln!(output, "no breakpoint at 0x{addr:04X}")
                    } else {
                        writeln!(output, "breakpoint removed at 0x{addr:04X}")
                    }
                }
                None => writeln!(output, "usage: break rm <hex>"),
            },
            Some("pop") => match self.breakpoints.pop() {
                Some(addr) => writeln!(output, "removed 0x{addr:04X}"),
                None => writeln!(output, "no breakpoints to pop"),
            },
            Some("list") | Some("show") => {
                if self.breakpoints.is_empty() {
                    writeln!(output, "no breakpoints set")
                } else {
                    for addr in &self.breakpoints {
                        writeln!(output, "0x{addr:04X}")?;
                    }
                    Ok(())
                }
            }
            Some("clear") => {
                self.breakpoints.clear();
                writeln!(output, "all breakpoints cleared")
            }
            _ => writeln!(output, "usage: break add|rm|pop|list|clear <hex>"),
        }
    }

    fn print_help(&self, topic: Option<&str>, output: &mut dyn Write) -> std::io::Result<()> {
        match topic {
            Some("break") => writeln!(
                output,
                "break add|push <hex>   add a breakpoint\n\
                 break rm|remove <hex>  remove a breakpoint\n\
                 break pop              remove the most recently added\n\
                 break list|show        print all breakpoints\n\
                 break clear            remove all breakpoints"
            ),
            Some("reg") => writeln!(
                output,
                "reg list|show          dump R0..R7, PSR, PC, IR\n\
                 reg clear              zero R0..R7\n\
                 reg set R# <hex>       set one register"
            ),
            _ => writeln!(
                output,
                "s, step                execute one instruction\n\
                 c, continue            run until breakpoint, clock-off, or exception\n\
                 n, next                step over JSR/JSRR/TRAP, else like step\n\
                 q, quit                exit the emulator\n\
                 clear                  clear the screen\n\
                 read <hex>             print memory at an address\n\
                 write <hex> <hex>      set memory at an address\n\
                 decode <hex|PC>        disassemble memory at an address\n\
                 decode-i <hex>         disassemble an immediate word\n\
                 goto <hex>             set PC directly\n\
                 reg ...                see 'help reg'\n\
                 break ...              see 'help break'"
            ),
        }
    }
}

impl Default for Debugger {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_register(token: &str) -> Option<usize> {
    let digits = token.strip_prefix(['R', 'r'])?;
    let n: usize = digits.parse().ok()?;
    (n < 8).then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn repl_with(input: &str, machine: &mut Machine) -> (ReplOutcome, String) {
        let mut dbg = Debugger::new();
        let mut stdin = Cursor::new(input.as_bytes().to_vec());
        let mut stdout = Vec::new();
        let outcome = dbg.repl(machine, &mut stdin, &mut stdout).unwrap();
        (outcome, String::from_utf8(stdout).unwrap())
    }

    #[test]
    fn step_releases_immediately() {
        let mut m = Machine::new();
        let (outcome, _) = repl_with("step\n", &mut m);
        assert_eq!(outcome, ReplOutcome::Proceed);
    }

    #[test]
    fn quit_is_recognized() {
        let mut m = Machine::new();
        let (outcome, _) = repl_with("q\n", &mut m);
        assert_eq!(outcome, ReplOutcome::Quit);
    }

    #[test]
    fn eof_quits_like_explicit_quit() {
        let mut m = Machine::new();
        let (outcome, _) = repl_with("", &mut m);
        assert_eq!(outcome, ReplOutcome::Quit);
    }

    #[test]
    fn read_write_round_trip() {
        let mut m = Machine::new();
        let (outcome, transcript) = repl_with("write 3000 abcd\nread 3000\nstep\n", &mut m);
        assert_eq!(outcome, ReplOutcome::Proceed);
        assert!(transcript.contains("mem[0x3000] <- 0xABCD"));
        assert!(transcript.contains("mem[0x3000] = 0xABCD"));
    }

    #[test]
    fn empty_line_repeats_last_command() {
        let mut m = Machine::new();
        let (_, transcript) = repl_with("read 3000\n\nstep\n", &mut m);
        assert_eq!(transcript.matches("mem[0x3000]").count(), 2);
    }

    #[test]
    fn reg_set_and_show() {
        let mut m = Machine::new();
        let (_, transcript) = repl_with("reg set R2 2A\nreg show\nstep\n", &mut m);
        assert_eq!(m.r[2].get(), 0x2A);
        assert!(transcript.contains("R2 = 0x002A"));
    }

    #[test]
    fn break_add_list_and_pop() {
        let mut dbg = Debugger::new();
        let mut out = Vec::new();
        dbg.cmd_break(&["add", "3000"], &mut out).unwrap();
        dbg.cmd_break(&["add", "4000"], &mut out).unwrap();
        out.clear();
        dbg.cmd_break(&["list"], &mut out).unwrap();
        let listed = String::from_utf8(out).unwrap();
        assert!(listed.contains("0x3000"));
        assert!(listed.contains("0x4000"));
        let mut out2 = Vec::new();
        dbg.cmd_break(&["pop"], &mut out2).unwrap();
        assert!(String::from_utf8(out2).unwrap().contains("0x4000"));
    }

    #[test]
    fn should_pause_by_default_after_every_instruction() {
        let mut dbg = Debugger::new();
        dbg.break_at_entry(0x3000);
        assert!(dbg.should_pause(0x2999, false));
    }

    #[test]
    fn continue_runs_until_breakpoint() {
        let mut dbg = Debugger::new();
        dbg.breakpoints.push(0x3005);
        dbg.continuing = true;
        assert!(!dbg.should_pause(0x3001, false));
        assert!(dbg.should_pause(0x3005, false));
    }

    #[test]
    fn exception_always_interrupts_continue_mode() {
        let mut dbg = Debugger::new();
        dbg.continuing = true;
        assert!(dbg.should_pause(0x0102, true));
    }

    #[test]
    fn next_sets_one_shot_breakpoint_over_trap() {
        let mut m = Machine::new();
        m.pc.set(0x3000);
        m.memory.write(0x3000, 0xF025); // TRAP x25
        let (outcome, _) = repl_with("next\n", &mut m);
        assert_eq!(outcome, ReplOutcome::Proceed);
    }
}

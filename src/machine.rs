//! Components B, E (dispatch), F (executor), and G (loop driver).
//!
//! A single `step()` executes one instruction to completion: one step of
//! the fetch-execute loop is one whole instruction here, not a cycle-level
//! micro-op breakdown.

use std::collections::HashSet;

use crate::cell::Word;
use crate::exception::Exception;
use crate::memory::{Memory, PrivilegeLevel, MCC_ADDR, MCR_ADDR, PSR_ADDR};
use crate::ops::OpCode;
use crate::rom;

/// Supervisor mode's stack pointer at boot.
pub const INITIAL_SSP: u16 = 0x3000;

pub struct Machine {
    pub memory: Memory,
    pub r: [Word; 8],
    pub pc: Word,
    /// Last fetched instruction, kept around for `reg show`/disassembly.
    pub ir: Word,
    /// Shadow stack pointer for the mode currently *not* active.
    pub saved_ssp: Word,
    pub saved_usp: Word,
    pub breakpoints: HashSet<u16>,
    /// Addresses of the named ROM handlers, for the debugger and tests.
    pub rom_layout: rom::RomLayout,
}

impl Machine {
    pub fn new() -> Self {
        let mut memory = Memory::new();
        let (image, rom_layout) = rom::build();
        for (addr, word) in image.into_iter().enumerate() {
            memory.write(addr as u16, word);
        }

        Self {
            memory,
            r: [Word::new(0); 8],
            pc: Word::new(rom_layout.bootstrap),
            ir: Word::new(0),
            saved_ssp: Word::new(INITIAL_SSP),
            saved_usp: Word::new(0),
            breakpoints: HashSet::new(),
            rom_layout,
        }
    }

    pub fn priv_level(&self) -> PrivilegeLevel {
        if self.memory.read(PSR_ADDR as u16) & 0x8000 == 0 {
            PrivilegeLevel::Supervisor
        } else {
            PrivilegeLevel::User
        }
    }

    pub fn set_priv_level(&mut self, level: PrivilegeLevel) {
        let psr = self.memory.read(PSR_ADDR as u16);
        let new_psr = match level {
            PrivilegeLevel::User => psr | 0x8000,
            PrivilegeLevel::Supervisor => psr & !0x8000,
        };
        self.memory.write(PSR_ADDR as u16, new_psr);
    }

    pub fn psr(&self) -> u16 {
        self.memory.read(PSR_ADDR as u16)
    }

    pub fn running(&self) -> bool {
        self.memory.read(MCR_ADDR as u16) & 0x8000 != 0
    }

    pub fn start_running(&mut self) {
        self.memory.write(MCR_ADDR as u16, 0x8000);
    }

    pub fn stop_running(&mut self) {
        self.memory.write(MCR_ADDR as u16, 0);
    }

    /// Set exactly one of N/Z/P from the signed value written to `reg`.
    pub fn update_flags(&mut self, reg: usize) {
        let value = self.r[reg].get();
        let psr = self.memory.read(PSR_ADDR as u16);
        let nzp = if (value >> 15) & 1 == 1 {
            0b100
        } else if value == 0 {
            0b010
        } else {
            0b001
        };
        self.memory.write(PSR_ADDR as u16, (psr & !0b111) | nzp);
    }

    pub fn nzp(&self) -> (bool, bool, bool) {
        let psr = self.psr();
        (psr & 0b100 != 0, psr & 0b010 != 0, psr & 0b001 != 0)
    }

    /// Predecrement R6 and store `value` there (used for TRAP/exception
    /// pushes and OS-handler pushes alike; always supervisor-stack writes
    /// issued by already-supervisor code, so unchecked).
    pub fn push_stack(&mut self, value: u16) {
        let sp = self.r[6].get().wrapping_sub(1);
        self.r[6].set(sp);
        self.memory.write(sp, value);
    }

    pub fn pop_stack(&mut self) -> u16 {
        let sp = self.r[6].get();
        let value = self.memory.read(sp);
        self.r[6].set(sp.wrapping_add(1));
        value
    }

    /// Fetch the instruction at PC, advancing PC by one.
    fn fetch(&mut self) -> Word {
        let word = Word::new(self.memory.read(self.pc.get()));
        self.pc.set(self.pc.get().wrapping_add(1));
        self.ir = word;
        word
    }

    /// Common exception/trap dispatch.
    fn dispatch_exception(&mut self, exc: Exception) {
        tracing::warn!(%exc, "dispatching exception");
        let psr = self.psr();

        if self.priv_level() == PrivilegeLevel::User {
            self.saved_usp = self.r[6];
            self.r[6] = self.saved_ssp;
        }
        self.set_priv_level(PrivilegeLevel::Supervisor);

        self.push_stack(psr);
        self.push_stack(self.pc.get());

        let handler = self.memory.read(exc.vector_table_entry());
        self.pc.set(handler);
    }

    /// Execute one fetch-decode-execute step. Returns the exception raised,
    /// if any (already dispatched before returning).
    pub fn step(&mut self) -> Option<Exception> {
        let ir = self.fetch();
        let opcode = match OpCode::decode(ir) {
            Some(op) => op,
            None => {
                self.dispatch_exception(Exception::IllegalInstruction);
                return Some(Exception::IllegalInstruction);
            }
        };

        if let Err(exc) = opcode.execute(ir, self) {
            self.dispatch_exception(exc);
            return Some(exc);
        }
        None
    }

    /// One iteration of the component-G loop driver: service input, run one
    /// instruction, advance MCC. Returns `false` once MCR is cleared.
    pub fn tick(&mut self) -> bool {
        self.memory.pump_input();
        self.step();
        let mcc = self.memory.read(MCC_ADDR as u16).wrapping_add(1);
        self.memory.write(MCC_ADDR as u16, mcc);
        self.running()
    }

    /// DDR writes enqueue to the output sink; this just exposes it for
    /// CLI/debugger consumption.
    pub fn output(&self) -> &[u8] {
        self.memory.output()
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

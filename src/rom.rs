//! Component D: the fixed supervisor ROM image.
//!
//! Follows the common bring-up pattern of writing a fixed image into memory
//! before the run loop starts, generalised here to a small internal builder
//! that emits hand-assembled LC-3 machine words directly. This is not a
//! general assembler (no text parsing, no user-facing label syntax): it is a
//! fixed procedure, run once at `Machine::new()`, that happens to compute
//! branch/load offsets from actual emitted positions instead of literal hex,
//! so the arithmetic can't drift out of sync with the layout as it's
//! written.
//!
//! Six addresses are pinned byte-for-byte: the OS bootstrap (0x0230), PUTS
//! (0x023B), OUT (0x024A), GETC (0x0254), IN (0x025A), and PUTSP (0x027A).
//! Everything else (vector table defaults, the diagnostic handlers, and
//! their message data) is free to live wherever this builder puts it.

/// Resolved addresses of every named ROM handler, exposed for the debugger,
/// the disassembler's trap-name table, and tests asserting the fixed
/// addresses this image pins.
#[derive(Debug, Clone, Copy)]
pub struct RomLayout {
    pub bootstrap: u16,
    pub puts: u16,
    pub out: u16,
    pub getc: u16,
    pub in_: u16,
    pub putsp: u16,
    pub bad_trap: u16,
    pub halt: u16,
    pub priv_handler: u16,
    pub ill: u16,
    pub acv: u16,
    pub bad_int: u16,
}

const NZP_N: u16 = 0b100;
const NZP_Z: u16 = 0b010;
const NZP_ZP: u16 = 0b011;

fn i_add_imm(dr: u16, sr1: u16, imm5: i16) -> u16 {
    0x1000 | (dr << 9) | (sr1 << 6) | 0x20 | ((imm5 as u16) & 0x1F)
}
fn i_add_reg(dr: u16, sr1: u16, sr2: u16) -> u16 {
    0x1000 | (dr << 9) | (sr1 << 6) | sr2
}
fn i_and_imm(dr: u16, sr1: u16, imm5: i16) -> u16 {
    0x5000 | (dr << 9) | (sr1 << 6) | 0x20 | ((imm5 as u16) & 0x1F)
}
fn i_and_reg(dr: u16, sr1: u16, sr2: u16) -> u16 {
    0x5000 | (dr << 9) | (sr1 << 6) | sr2
}
fn i_br(nzp: u16, off9: u16) -> u16 {
    (nzp << 9) | (off9 & 0x1FF)
}
fn i_ld(dr: u16, off9: u16) -> u16 {
    0x2000 | (dr << 9) | (off9 & 0x1FF)
}
fn i_ldr(dr: u16, base: u16, off6: u16) -> u16 {
    0x6000 | (dr << 9) | (base << 6) | (off6 & 0x3F)
}
fn i_str(sr: u16, base: u16, off6: u16) -> u16 {
    0x7000 | (sr << 9) | (base << 6) | (off6 & 0x3F)
}
fn i_lea(dr: u16, off9: u16) -> u16 {
    0xE000 | (dr << 9) | (off9 & 0x1FF)
}
fn i_trap(vector: u8) -> u16 {
    0xF000 | vector as u16
}
fn i_rti() -> u16 {
    0x8000
}

/// Sign-extended PC-relative displacement from the instruction at
/// `instr_addr` to `target`, truncated to the field width (9 bits for
/// LD/LDI/LEA/ST/STI/BR, 11 for JSR — only 9-bit users appear in this ROM).
fn off9(instr_addr: u16, target: u16) -> u16 {
    let pc_after = instr_addr.wrapping_add(1);
    target.wrapping_sub(pc_after) & 0x1FF
}

/// Incremental builder for the handler region, addresses starting at
/// 0x0200 (right after the interrupt vector table).
struct RomBuilder {
    words: Vec<u16>,
}

impl RomBuilder {
    fn new() -> Self {
        Self { words: Vec::new() }
    }

    fn here(&self) -> u16 {
        0x0200 + self.words.len() as u16
    }

    fn emit(&mut self, word: u16) -> u16 {
        let addr = self.here();
        self.words.push(word);
        addr
    }

    fn pad_to(&mut self, addr: u16) {
        while self.here() < addr {
            self.words.push(0);
        }
    }

    /// Null-terminated, one character per word (PUTS/LEA contract).
    fn fill_string(&mut self, s: &str) -> u16 {
        let start = self.here();
        for byte in s.bytes() {
            self.emit(byte as u16);
        }
        self.emit(0);
        start
    }

    /// Two characters packed per word, low byte first, null-terminated
    /// (PUTSP's packing contract).
    fn fill_packed_string(&mut self, s: &str) -> u16 {
        let start = self.here();
        let bytes: Vec<u8> = s.bytes().collect();
        let mut i = 0;
        while i < bytes.len() {
            let lo = bytes[i] as u16;
            let hi = bytes.get(i + 1).copied().unwrap_or(0) as u16;
            self.emit(lo | (hi << 8));
            i += 2;
        }
        self.emit(0);
        start
    }
}

/// Build the ROM image and return it alongside the resolved handler
/// addresses. Called once from [`crate::machine::Machine::new`].
pub fn build() -> (Vec<u16>, RomLayout) {
    let mut b = RomBuilder::new();

    // --- pre-bootstrap data (0x0200..), referenced by backward offsets
    // from the pinned handlers that follow.
    let user_psr_val_addr = b.emit(0x8002); // user mode, Z set
    let ssp_init_addr = b.emit(0x3000);
    let dsr_ptr_addr = b.emit(crate::memory::DSR_ADDR as u16);
    let ddr_ptr_addr = b.emit(crate::memory::DDR_ADDR as u16);
    let kbsr_ptr_addr = b.emit(crate::memory::KBSR_ADDR as u16);
    let kbdr_ptr_addr = b.emit(crate::memory::KBDR_ADDR as u16);
    let in_msg_addr = b.fill_string("Enter a Character: ");
    b.pad_to(0x0230);

    // --- OS bootstrap: load the user PSR and PC, push them onto
    // the (freshly initialised) supervisor stack, RTI into user mode.
    let bootstrap = b.here();
    debug_assert_eq!(bootstrap, 0x0230);
    let user_pc_addr = bootstrap + 10; // last word of this block; loader fills it in
    b.emit(i_ld(0, off9(bootstrap, user_psr_val_addr)));
    b.emit(i_ld(1, off9(bootstrap + 1, user_pc_addr)));
    b.emit(i_ld(6, off9(bootstrap + 2, ssp_init_addr)));
    b.emit(i_add_imm(6, 6, -1));
    b.emit(i_str(0, 6, 0));
    b.emit(i_add_imm(6, 6, -1));
    b.emit(i_str(1, 6, 0));
    b.emit(i_rti());
    b.pad_to(user_pc_addr);
    b.emit(0); // user PC slot, overwritten by the loader at load time
    b.pad_to(0x023B);

    // --- PUTS: stream words from R0 through TRAP OUT until a
    // zero word.
    let puts = b.here();
    debug_assert_eq!(puts, 0x023B);
    b.emit(i_add_imm(1, 0, 0)); // R1 <- R0 (walking pointer)
    let puts_loop = b.here();
    b.emit(i_ldr(0, 1, 0)); // R0 <- mem[R1]
    let puts_brz_idx = b.here();
    b.emit(0); // patched below: BRz DONE
    b.emit(i_trap(0x21)); // OUT
    b.emit(i_add_imm(1, 1, 1));
    let puts_br_back_idx = b.here();
    b.emit(0); // patched below: BR puts_loop
    let puts_done = b.here();
    b.emit(i_rti());
    b.words[(puts_brz_idx - 0x0200) as usize] = i_br(NZP_Z, off9(puts_brz_idx, puts_done));
    b.words[(puts_br_back_idx - 0x0200) as usize] = i_br(0b111, off9(puts_br_back_idx, puts_loop));
    b.pad_to(0x024A);

    // --- OUT: spin on DSR, then store R0 to DDR.
    let out = b.here();
    debug_assert_eq!(out, 0x024A);
    b.emit(i_ld(2, off9(out, dsr_ptr_addr)));
    let out_poll = b.here();
    b.emit(i_ldr(1, 2, 0));
    b.emit(i_br(NZP_ZP, off9(out_poll + 1, out_poll)));
    b.emit(i_ld(2, off9(out_poll + 2, ddr_ptr_addr)));
    b.emit(i_str(0, 2, 0));
    b.emit(i_rti());
    b.pad_to(0x0254);

    // --- GETC: spin on KBSR, then load KBDR into R0.
    let getc = b.here();
    debug_assert_eq!(getc, 0x0254);
    b.emit(i_ld(1, off9(getc, kbsr_ptr_addr)));
    let getc_poll = b.here();
    b.emit(i_ldr(2, 1, 0));
    b.emit(i_br(NZP_ZP, off9(getc_poll + 1, getc_poll)));
    b.emit(i_ld(1, off9(getc_poll + 2, kbdr_ptr_addr)));
    b.emit(i_ldr(0, 1, 0));
    b.emit(i_rti());
    b.pad_to(0x025A);

    // --- IN: print a prompt, GETC, echo via OUT, print a
    // newline, leave the character in R0.
    let in_ = b.here();
    debug_assert_eq!(in_, 0x025A);
    b.emit(i_lea(0, off9(in_, in_msg_addr)));
    b.emit(i_trap(0x22)); // PUTS the prompt
    b.emit(i_trap(0x20)); // GETC -> R0
    b.emit(i_add_imm(1, 0, 0)); // R1 <- R0 (save char)
    b.emit(i_trap(0x21)); // OUT (echo)
    b.emit(i_and_imm(2, 2, 0));
    b.emit(i_add_imm(2, 2, 10)); // R2 <- '\n'
    b.emit(i_add_imm(3, 0, 0)); // R3 <- R0 (save char again, R0 about to change)
    b.emit(i_add_imm(0, 2, 0)); // R0 <- R2 (the newline)
    b.emit(i_trap(0x21)); // OUT the newline
    b.emit(i_add_imm(0, 3, 0)); // restore R0 <- original char
    b.emit(i_rti());
    b.pad_to(0x027A);

    // --- PUTSP: like PUTS, but two packed characters per word,
    // low byte first. Extracting the high byte needs a shift; the base ISA
    // has no shift instruction, so it's done by repeated subtraction of
    // 256.
    let putsp = b.here();
    debug_assert_eq!(putsp, 0x027A);
    let ff00_addr = putsp + 19; // word right after this handler's 19 instructions
    b.emit(i_add_imm(1, 0, 0)); // R1 <- R0 (pointer)
    b.emit(i_and_imm(4, 4, 0)); // R4 <- 0 (high-byte count)
    let putsp_loop = b.here();
    b.emit(i_ldr(2, 1, 0)); // R2 <- mem[R1]
    let putsp_brz_idx = b.here();
    b.emit(0); // patched: BRz DONE
    b.emit(i_add_imm(0, 2, 0)); // R0 <- low byte (OUT masks to 8 bits)
    b.emit(i_trap(0x21));
    b.emit(i_ld(5, off9(putsp + 6, ff00_addr))); // R5 <- 0xFF00 (mask / -256)
    b.emit(i_and_reg(3, 2, 5)); // R3 <- R2 & 0xFF00
    let high_loop = b.here();
    let high_brz_idx = b.here();
    b.emit(0); // patched: BRz HIGH_DONE
    b.emit(i_add_imm(4, 4, 1)); // count++
    b.emit(i_add_reg(3, 3, 5)); // R3 -= 256
    let high_br_idx = b.here();
    b.emit(0); // patched: BR high_loop
    let high_done = b.here();
    b.emit(i_add_imm(0, 4, 0)); // R0 <- R4, flags reflect the high-byte count
    let skip_high_brz_idx = b.here();
    b.emit(0); // patched: BRz SKIP_HIGH
    b.emit(i_trap(0x21)); // OUT the high byte
    let skip_high = b.here();
    b.emit(i_add_imm(1, 1, 1)); // pointer++
    b.emit(i_and_imm(4, 4, 0)); // reset count for the next word
    let putsp_br_idx = b.here();
    b.emit(0); // patched: BR putsp_loop
    let putsp_done = b.here();
    b.emit(i_rti());
    b.words[(putsp_brz_idx - 0x0200) as usize] = i_br(NZP_Z, off9(putsp_brz_idx, putsp_done));
    b.words[(high_brz_idx - 0x0200) as usize] = i_br(NZP_Z, off9(high_brz_idx, high_done));
    b.words[(high_br_idx - 0x0200) as usize] = i_br(0b111, off9(high_br_idx, high_loop));
    b.words[(skip_high_brz_idx - 0x0200) as usize] = i_br(NZP_Z, off9(skip_high_brz_idx, skip_high));
    b.words[(putsp_br_idx - 0x0200) as usize] = i_br(0b111, off9(putsp_br_idx, putsp_loop));
    debug_assert_eq!(b.here(), ff00_addr);
    b.emit(0xFF00);

    // --- diagnostic handlers: address-free, so data is emitted before the
    // code that references it and every offset is a known backward jump.
    let bad_trap_msg = b.fill_string("\n\nBad Trap Executed!\n\n");
    let bad_trap = b.here();
    b.emit(i_lea(0, off9(bad_trap, bad_trap_msg)));
    b.emit(i_trap(0x22));
    b.emit(i_trap(0x25));

    let halt_msg = b.fill_string("\n\nHalting!\n\n");
    let mcr_ptr_addr = b.emit(crate::memory::MCR_ADDR as u16);
    let mask_ptr_addr = b.emit(0x7FFF);
    let halt = b.here();
    b.emit(i_lea(0, off9(halt, halt_msg)));
    b.emit(i_trap(0x22));
    b.emit(i_ld(1, off9(halt + 1, mcr_ptr_addr)));
    b.emit(i_ld(3, off9(halt + 2, mask_ptr_addr)));
    let halt_spin = b.here();
    b.emit(i_ldr(2, 1, 0));
    b.emit(i_and_reg(2, 2, 3));
    b.emit(i_str(2, 1, 0));
    b.emit(i_br(0b111, off9(halt_spin + 3, halt_spin)));

    let priv_msg = b.fill_string("Privilege mode exception!");
    let priv_handler = b.here();
    b.emit(i_lea(0, off9(priv_handler, priv_msg)));
    b.emit(i_trap(0x22));
    b.emit(i_trap(0x25));

    let ill_msg = b.fill_string("Illegal opcode exception!");
    let ill = b.here();
    b.emit(i_lea(0, off9(ill, ill_msg)));
    b.emit(i_trap(0x22));
    b.emit(i_trap(0x25));

    let acv_msg = b.fill_string("Access control violation!");
    let acv = b.here();
    b.emit(i_lea(0, off9(acv, acv_msg)));
    b.emit(i_trap(0x22));
    b.emit(i_trap(0x25));

    // The bad-interrupt banner is packed two chars per word, matching the
    // PUTSP contract rather than PUTS's.
    let bad_int_msg = b.fill_packed_string("Unhandled interrupt!\n");
    let bad_int = b.here();
    b.emit(i_lea(0, off9(bad_int, bad_int_msg)));
    b.emit(i_trap(0x24));
    b.emit(i_trap(0x25));

    // --- vector tables, built last now that every handler
    // address is known.
    let mut trap_vectors = vec![bad_trap; 256];
    trap_vectors[0x20] = getc;
    trap_vectors[0x21] = out;
    trap_vectors[0x22] = puts;
    trap_vectors[0x23] = in_;
    trap_vectors[0x24] = putsp;
    trap_vectors[0x25] = halt;

    let mut interrupt_vectors = vec![bad_int; 256];
    interrupt_vectors[0x00] = priv_handler;
    interrupt_vectors[0x01] = ill;
    interrupt_vectors[0x02] = acv;

    let mut image = Vec::with_capacity(0x0200 + b.words.len());
    image.extend(trap_vectors);
    image.extend(interrupt_vectors);
    image.extend(b.words);

    let layout = RomLayout {
        bootstrap,
        puts,
        out,
        getc,
        in_,
        putsp,
        bad_trap,
        halt,
        priv_handler,
        ill,
        acv,
        bad_int,
    };
    (image, layout)
}

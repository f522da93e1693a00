//! Pure disassembly of a single 16-bit word, used by the debugger's
//! `decode`/`decode-i` commands and by `--dump` style diagnostics.
//!
//! Collapsed into one pure function rather than a per-op `Display` impl,
//! since this crate's op modules are bare executor functions, not structs,
//! so there's no natural `Display` seam to hang per-op formatting off of.

use crate::cell::Word;
use crate::decode::{dr, imm5, is_imm_mode, is_jsr_offset_mode, nzp_mask, offset11, offset6, offset9, sr1, sr2, trap_vector};
use crate::ops::OpCode;

/// The six standard trap vectors this ROM wires up; used by the
/// disassembler and by debugger help text.
pub fn name_of_trap(vector: u8) -> Option<&'static str> {
    match vector {
        0x20 => Some("GETC"),
        0x21 => Some("OUT"),
        0x22 => Some("PUTS"),
        0x23 => Some("IN"),
        0x24 => Some("PUTSP"),
        0x25 => Some("HALT"),
        _ => None,
    }
}

fn nzp_suffix(mask: u8) -> String {
    let mut s = String::new();
    if mask & 0b100 != 0 {
        s.push('n');
    }
    if mask & 0b010 != 0 {
        s.push('z');
    }
    if mask & 0b001 != 0 {
        s.push('p');
    }
    s
}

/// Render `word` as an LC-3 assembly mnemonic. Reserved and malformed
/// encodings fall back to a raw `.FILL` line rather than panicking, since
/// this is also used to print arbitrary data words from `--dump`.
pub fn disassemble(raw: u16) -> String {
    let ir = Word::new(raw);
    let Some(op) = OpCode::decode(ir) else {
        return format!(".FILL x{:04X}", raw);
    };

    match op {
        OpCode::Add if is_imm_mode(ir) => {
            format!("ADD R{}, R{}, #{}", dr(ir), sr1(ir), imm5(ir))
        }
        OpCode::Add => format!("ADD R{}, R{}, R{}", dr(ir), sr1(ir), sr2(ir)),
        OpCode::And if is_imm_mode(ir) => {
            format!("AND R{}, R{}, #{}", dr(ir), sr1(ir), imm5(ir))
        }
        OpCode::And => format!("AND R{}, R{}, R{}", dr(ir), sr1(ir), sr2(ir)),
        OpCode::Not => format!("NOT R{}, R{}", dr(ir), sr1(ir)),
        OpCode::Br => {
            let mask = nzp_mask(ir);
            if mask == 0 {
                format!("NOP #{}", offset9(ir))
            } else {
                format!("BR{} #{}", nzp_suffix(mask), offset9(ir))
            }
        }
        OpCode::Jmp if sr1(ir) == 7 => "RET".to_string(),
        OpCode::Jmp => format!("JMP R{}", sr1(ir)),
        OpCode::Jsr if is_jsr_offset_mode(ir) => format!("JSR #{}", offset11(ir)),
        OpCode::Jsr => format!("JSRR R{}", sr1(ir)),
        OpCode::Ld => format!("LD R{}, #{}", dr(ir), offset9(ir)),
        OpCode::Ldi => format!("LDI R{}, #{}", dr(ir), offset9(ir)),
        OpCode::Ldr => format!("LDR R{}, R{}, #{}", dr(ir), sr1(ir), offset6(ir)),
        OpCode::Lea => format!("LEA R{}, #{}", dr(ir), offset9(ir)),
        OpCode::St => format!("ST R{}, #{}", dr(ir), offset9(ir)),
        OpCode::Sti => format!("STI R{}, #{}", dr(ir), offset9(ir)),
        OpCode::Str => format!("STR R{}, R{}, #{}", dr(ir), sr1(ir), offset6(ir)),
        OpCode::Rti => "RTI".to_string(),
        OpCode::Trap => {
            let vector = trap_vector(ir);
            match name_of_trap(vector) {
                Some(name) => name.to_string(),
                None => format!("TRAP x{:02X}", vector),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disassembles_add_immediate() {
        assert_eq!(disassemble(0b0001_001_000_1_11101), "ADD R1, R0, #-3");
    }

    #[test]
    fn disassembles_add_register_mode() {
        assert_eq!(disassemble(0b0001_010_001_0_00_011), "ADD R2, R1, R3");
    }

    #[test]
    fn disassembles_standard_trap_names() {
        assert_eq!(disassemble(0xF022), "PUTS");
        assert_eq!(disassemble(0xF025), "HALT");
        assert_eq!(disassemble(0xF099), "TRAP x99");
    }

    #[test]
    fn reserved_opcode_falls_back_to_fill() {
        assert_eq!(disassemble(0b1101_000_000_000_000), ".FILL xD000");
    }

    #[test]
    fn jmp_r7_disassembles_as_ret() {
        assert_eq!(disassemble(0b1100_000_111_000000), "RET");
    }
}

use crate::cell::Word;
use crate::decode::{dr, offset9};
use crate::exception::Exception;
use crate::machine::Machine;

/// DR <- PC + sext9(off9); set NZP.
///
/// LEA (1110) rounds out the full 15-opcode set alongside the rest of this
/// module: standard LC-3 semantics, a pure address computation with no
/// memory access and hence no ACV check (only LD/LDI/LDR/ST/STI/STR touch
/// memory).
pub(super) fn execute(ir: Word, m: &mut Machine) -> Result<(), Exception> {
    let dst = dr(ir);
    let value = m.pc.get().wrapping_add(offset9(ir) as u16);
    m.r[dst].set(value);
    m.update_flags(dst);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lea_computes_address_and_sets_flags() {
        let mut m = Machine::new();
        m.pc.set(0x3001);
        // LEA R0, #1
        let ir = Word::new(0b1110_000_0_00000001);
        execute(ir, &mut m).unwrap();
        assert_eq!(m.r[0].get(), 0x3002);
        assert_eq!(m.nzp(), (false, false, true));
    }
}

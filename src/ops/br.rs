use crate::cell::Word;
use crate::decode::{nzp_mask, offset9};
use crate::exception::Exception;
use crate::machine::Machine;

/// if (nzp & PSR[2:0]) != 0: PC <- PC + sext9(off9).
pub(super) fn execute(ir: Word, m: &mut Machine) -> Result<(), Exception> {
    let mask = nzp_mask(ir);
    let (n, z, p) = m.nzp();
    let current = (n as u8) << 2 | (z as u8) << 1 | (p as u8);
    if mask & current != 0 {
        m.pc.set(m.pc.get().wrapping_add(offset9(ir) as u16));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_taken_on_matching_condition() {
        let mut m = Machine::new();
        m.r[0].set(0);
        m.update_flags(0); // Z set
        m.pc.set(0x3000);
        // BRz #5
        let ir = Word::new(0b0000_010_0_00000101);
        execute(ir, &mut m).unwrap();
        assert_eq!(m.pc.get(), 0x3005);
    }

    #[test]
    fn branch_not_taken_on_mismatched_condition() {
        let mut m = Machine::new();
        m.r[0].set(1);
        m.update_flags(0); // P set
        m.pc.set(0x3000);
        // BRn #5 (only negative)
        let ir = Word::new(0b0000_100_0_00000101);
        execute(ir, &mut m).unwrap();
        assert_eq!(m.pc.get(), 0x3000);
    }

    #[test]
    fn br_nzp_always_taken() {
        let mut m = Machine::new();
        m.pc.set(0x3000);
        // BRnzp #-1
        let ir = Word::new(0b0000_111_1_11111111);
        execute(ir, &mut m).unwrap();
        assert_eq!(m.pc.get(), 0x2FFF);
    }
}

use crate::cell::Word;
use crate::decode::{dr, imm5, is_imm_mode, sr1, sr2};
use crate::exception::Exception;
use crate::machine::Machine;

/// DR <- SR1 + (bit5 ? sext5(imm5) : SR2); set NZP.
pub(super) fn execute(ir: Word, m: &mut Machine) -> Result<(), Exception> {
    let dst = dr(ir);
    let a = m.r[sr1(ir)].get();
    let b = if is_imm_mode(ir) {
        imm5(ir) as u16
    } else {
        m.r[sr2(ir)].get()
    };
    m.r[dst].set(a.wrapping_add(b));
    m.update_flags(dst);
    Ok(())
}

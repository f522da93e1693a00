use crate::cell::Word;
use crate::decode::{is_jsr_offset_mode, offset11, sr1};
use crate::exception::Exception;
use crate::machine::Machine;

/// R7 <- PC; bit11 ? PC <- PC + sext11(off11) : PC <- R[SR1].
pub(super) fn execute(ir: Word, m: &mut Machine) -> Result<(), Exception> {
    let return_addr = m.pc.get();
    if is_jsr_offset_mode(ir) {
        m.pc.set(m.pc.get().wrapping_add(offset11(ir) as u16));
    } else {
        m.pc.set(m.r[sr1(ir)].get());
    }
    m.r[7].set(return_addr);
    Ok(())
}

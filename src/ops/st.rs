use crate::cell::Word;
use crate::decode::{dr, offset9};
use crate::exception::Exception;
use crate::machine::Machine;

/// EA <- PC + sext9(off9); ACV-check; memory[EA] <- SR.
pub(super) fn execute(ir: Word, m: &mut Machine) -> Result<(), Exception> {
    let src = dr(ir);
    let ea = m.pc.get().wrapping_add(offset9(ir) as u16);
    let value = m.r[src].get();
    m.memory.write_checked(ea, value, m.priv_level())?;
    Ok(())
}

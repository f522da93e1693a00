use crate::cell::Word;
use crate::decode::{dr, offset9};
use crate::exception::Exception;
use crate::machine::Machine;

/// DR <- memory[PC + sext9(off9)]; set NZP; ACV-checks the effective address.
pub(super) fn execute(ir: Word, m: &mut Machine) -> Result<(), Exception> {
    let dst = dr(ir);
    let ea = m.pc.get().wrapping_add(offset9(ir) as u16);
    let value = m.memory.read_checked(ea, m.priv_level())?;
    m.r[dst].set(value);
    m.update_flags(dst);
    Ok(())
}

use crate::cell::Word;
use crate::decode::{dr, offset6, sr1};
use crate::exception::Exception;
use crate::machine::Machine;

/// EA <- R[SR1] + sext6(off6); ACV-check; memory[EA] <- SR.
pub(super) fn execute(ir: Word, m: &mut Machine) -> Result<(), Exception> {
    let src = dr(ir);
    let ea = m.r[sr1(ir)].get().wrapping_add(offset6(ir) as u16);
    let value = m.r[src].get();
    m.memory.write_checked(ea, value, m.priv_level())?;
    Ok(())
}

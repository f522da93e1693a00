use crate::cell::Word;
use crate::decode::{dr, offset9};
use crate::exception::Exception;
use crate::machine::Machine;

/// EA1 <- PC + sext9(off9); ACV-check EA1; EA2 <- memory[EA1]; ACV-check
/// EA2; DR <- memory[EA2]; set NZP.
///
/// Both the pointer (EA1) and the dereferenced address (EA2) are checked:
/// a user-mode program can't use one in-bounds hop to read or write through
/// a pointer stored in restricted memory, nor use an in-bounds pointer to
/// reach a restricted target.
pub(super) fn execute(ir: Word, m: &mut Machine) -> Result<(), Exception> {
    let dst = dr(ir);
    let level = m.priv_level();
    let ea1 = m.pc.get().wrapping_add(offset9(ir) as u16);
    let ea2 = m.memory.read_checked(ea1, level)?;
    let value = m.memory.read_checked(ea2, level)?;
    m.r[dst].set(value);
    m.update_flags(dst);
    Ok(())
}

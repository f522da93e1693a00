use crate::cell::Word;
use crate::decode::{dr, sr1};
use crate::exception::Exception;
use crate::machine::Machine;

/// DR <- ~SR1; set NZP.
pub(super) fn execute(ir: Word, m: &mut Machine) -> Result<(), Exception> {
    let dst = dr(ir);
    let value = !m.r[sr1(ir)].get();
    m.r[dst].set(value);
    m.update_flags(dst);
    Ok(())
}

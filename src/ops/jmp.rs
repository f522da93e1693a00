use crate::cell::Word;
use crate::decode::sr1;
use crate::exception::Exception;
use crate::machine::Machine;

/// PC <- R[SR1]. RET is the assembler alias for `JMP R7`; no distinct
/// encoding exists so there is nothing special to do here.
pub(super) fn execute(ir: Word, m: &mut Machine) -> Result<(), Exception> {
    m.pc.set(m.r[sr1(ir)].get());
    Ok(())
}

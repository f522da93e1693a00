use crate::cell::Word;
use crate::decode::trap_vector;
use crate::exception::Exception;
use crate::machine::Machine;
use crate::memory::PrivilegeLevel;

/// Push PSR then the already-advanced PC; switch to the supervisor stack
/// if called from user mode; PC <- memory[trap_vector].
pub(super) fn execute(ir: Word, m: &mut Machine) -> Result<(), Exception> {
    let vector = trap_vector(ir);
    let psr = m.psr();
    let return_pc = m.pc.get();

    if m.priv_level() == PrivilegeLevel::User {
        m.saved_usp = m.r[6];
        m.r[6] = m.saved_ssp;
    }
    m.set_priv_level(PrivilegeLevel::Supervisor);

    m.push_stack(psr);
    m.push_stack(return_pc);

    let handler = m.memory.read(vector as u16);
    m.pc.set(handler);
    Ok(())
}

use crate::cell::Word;
use crate::exception::Exception;
use crate::machine::Machine;
use crate::memory::{PrivilegeLevel, PSR_ADDR};

/// PC <- pop(); PSR <- pop(); if the restored PSR selects user mode, swap
/// R6 back to the saved user stack pointer. Only legal from supervisor
/// mode, else raises `PrivilegeViolation`.
pub(super) fn execute(_ir: Word, m: &mut Machine) -> Result<(), Exception> {
    if m.priv_level() == PrivilegeLevel::User {
        return Err(Exception::PrivilegeViolation);
    }
    let pc = m.pop_stack();
    let psr = m.pop_stack();
    m.pc.set(pc);
    m.memory.write(PSR_ADDR as u16, psr);
    if m.priv_level() == PrivilegeLevel::User {
        m.saved_ssp = m.r[6];
        m.r[6] = m.saved_usp;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rti_restores_pc_and_returns_to_user_mode() {
        let mut m = Machine::new();
        m.set_priv_level(PrivilegeLevel::Supervisor);
        m.r[6].set(0x2FFE);
        m.saved_usp.set(0x4000);
        m.memory.write(0x2FFE, 0x3050); // saved PC
        m.memory.write(0x2FFF, 0x8002); // saved PSR: user mode, Z flag
        m.r[6].set(0x2FFE);
        execute(Word::new(0), &mut m).unwrap();
        assert_eq!(m.pc.get(), 0x3050);
        assert_eq!(m.priv_level(), PrivilegeLevel::User);
        assert_eq!(m.r[6].get(), 0x4000);
    }

    #[test]
    fn rti_from_user_mode_is_a_privilege_violation() {
        let mut m = Machine::new();
        m.set_priv_level(PrivilegeLevel::User);
        assert_eq!(execute(Word::new(0), &mut m).unwrap_err(), Exception::PrivilegeViolation);
    }
}

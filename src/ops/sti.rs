use crate::cell::Word;
use crate::decode::{dr, offset9};
use crate::exception::Exception;
use crate::machine::Machine;

/// EA1 <- PC + sext9(off9); ACV-check EA1; EA2 <- memory[EA1]; ACV-check
/// EA2; memory[EA2] <- SR.
///
/// Mirrors LDI's check: both the pointer and the dereferenced address are
/// validated against user space.
pub(super) fn execute(ir: Word, m: &mut Machine) -> Result<(), Exception> {
    let src = dr(ir);
    let level = m.priv_level();
    let ea1 = m.pc.get().wrapping_add(offset9(ir) as u16);
    let ea2 = m.memory.read_checked(ea1, level)?;
    let value = m.r[src].get();
    m.memory.write_checked(ea2, value, level)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::PrivilegeLevel;

    #[test]
    fn sti_double_indirection() {
        let mut m = Machine::new();
        m.set_priv_level(PrivilegeLevel::Supervisor);
        m.pc.set(0x3001);
        m.memory.write(0x3003, 0x4000);
        m.r[0].set(0x5678);
        // STI R0, #2
        let ir = Word::new(0b1011_000_0_00000010);
        execute(ir, &mut m).unwrap();
        assert_eq!(m.memory.read(0x4000), 0x5678);
    }

    #[test]
    fn sti_rejects_when_dereferenced_address_is_privileged() {
        let mut m = Machine::new();
        m.set_priv_level(PrivilegeLevel::User);
        m.pc.set(0x3001);
        m.memory.write(0x3003, 0x0000);
        let ir = Word::new(0b1011_000_0_00000010);
        assert_eq!(execute(ir, &mut m).unwrap_err(), Exception::AccessControlViolation);
    }
}

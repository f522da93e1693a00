use crate::cell::Word;
use crate::decode::{dr, offset6, sr1};
use crate::exception::Exception;
use crate::machine::Machine;

/// EA <- R[SR1] + sext6(off6); ACV-check; DR <- memory[EA]; set NZP.
pub(super) fn execute(ir: Word, m: &mut Machine) -> Result<(), Exception> {
    let dst = dr(ir);
    let ea = m.r[sr1(ir)].get().wrapping_add(offset6(ir) as u16);
    let value = m.memory.read_checked(ea, m.priv_level())?;
    m.r[dst].set(value);
    m.update_flags(dst);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::PrivilegeLevel;

    #[test]
    fn ldr_base_plus_offset() {
        let mut m = Machine::new();
        m.set_priv_level(PrivilegeLevel::Supervisor);
        m.r[1].set(0x4000);
        m.memory.write(0x4005, 99);
        // LDR R0, R1, #5
        let ir = Word::new(0b0110_000_001_000101);
        execute(ir, &mut m).unwrap();
        assert_eq!(m.r[0].get(), 99);
    }
}

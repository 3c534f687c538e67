use crate::fault::Fault;
use crate::memory::Byte;

/// Number of general purpose registers
pub const REGISTER_COUNT: usize = 8;
/// Index of the register used as stack pointer
pub const SP: Byte = 7;
/// Initial stack pointer. The stack grows downwards from here.
pub const STACK_TOP: Byte = 0xF4;
/// Flag bit set by CMP when both registers are equal
pub const FL_EQUAL: Byte = 0b0000_0001;

/// The register file. R7 holds the stack pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registers {
    pub data: [Byte; REGISTER_COUNT],
}

impl Default for Registers {
    fn default() -> Self {
        let mut data = [0; REGISTER_COUNT];
        data[SP as usize] = STACK_TOP;
        Registers { data }
    }
}

impl Registers {
    /// Checks that `index` names a register and returns it as array index
    pub fn check(index: Byte) -> Result<usize, Fault> {
        let idx = index as usize;
        if idx < REGISTER_COUNT {
            Ok(idx)
        } else {
            Err(Fault::InvalidRegister { index })
        }
    }

    pub fn get(&self, index: Byte) -> Result<Byte, Fault> {
        Ok(self.data[Self::check(index)?])
    }

    pub fn set(&mut self, index: Byte, value: Byte) -> Result<(), Fault> {
        self.data[Self::check(index)?] = value;
        Ok(())
    }

    pub fn sp(&self) -> Byte {
        self.data[SP as usize]
    }

    pub fn set_sp(&mut self, value: Byte) {
        self.data[SP as usize] = value;
    }
}

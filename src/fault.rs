use std::error;
use std::fmt;

use crate::alu::AluOp;
use crate::memory::{Byte, Word};
use crate::processor::Instruction;

/// Fatal conditions which stop the processor. None of them are recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The byte at `pc` is not in the opcode table
    UnknownInstruction { opcode: Byte, pc: Word },
    MemoryOutOfRange { address: usize },
    InvalidRegister { index: Byte },
    /// Push with the stack pointer already at address 0
    StackOverflow { sp: Byte },
    /// Pop with nothing on the stack
    StackUnderflow { sp: Byte },
    DivisionByZero { op: AluOp },
    /// An instruction which is not an ALU operation was routed to the ALU
    UnsupportedAluOperation(Instruction),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::UnknownInstruction { opcode, pc } => write!(
                f,
                "unknown instruction `0b{:08b}` (0x{:02X}) at 0x{:02X}",
                opcode, opcode, pc
            ),
            Fault::MemoryOutOfRange { address } => {
                write!(f, "memory has no address `0x{:x}`", address)
            }
            Fault::InvalidRegister { index } => write!(f, "no register with index `{}`", index),
            Fault::StackOverflow { sp } => write!(f, "stack overflow (sp: 0x{:02X})", sp),
            Fault::StackUnderflow { sp } => write!(f, "stack underflow (sp: 0x{:02X})", sp),
            Fault::DivisionByZero { op } => write!(f, "{}: division by zero", op),
            Fault::UnsupportedAluOperation(instruction) => {
                write!(f, "unsupported ALU operation `{}`", instruction)
            }
        }
    }
}

impl error::Error for Fault {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_instruction_keeps_opcode() {
        let fault = Fault::UnknownInstruction {
            opcode: 0b1111_0000,
            pc: 0x12,
        };

        assert_eq!(
            fault.to_string(),
            "unknown instruction `0b11110000` (0xF0) at 0x12"
        );
    }

    #[test]
    fn test_division_by_zero_names_operation() {
        let fault = Fault::DivisionByZero { op: AluOp::Mod };

        assert_eq!(fault.to_string(), "MOD: division by zero");
    }
}

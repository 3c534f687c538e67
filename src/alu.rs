//! Arithmetic logic unit. Operates on register indices and only ever touches
//! the registers it is given and the flag register.

use std::convert::TryFrom;
use std::fmt;

use crate::fault::Fault;
use crate::memory::Byte;
use crate::processor::Instruction;
use crate::registers::{Registers, FL_EQUAL};
use log::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Inc,
    Dec,
    Cmp,
}

impl AluOp {
    pub fn name(&self) -> &'static str {
        match self {
            AluOp::Add => "ADD",
            AluOp::Sub => "SUB",
            AluOp::Mul => "MUL",
            AluOp::Div => "DIV",
            AluOp::Mod => "MOD",
            AluOp::Inc => "INC",
            AluOp::Dec => "DEC",
            AluOp::Cmp => "CMP",
        }
    }
}

impl fmt::Display for AluOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<Instruction> for AluOp {
    type Error = Fault;

    fn try_from(instruction: Instruction) -> Result<Self, Self::Error> {
        match instruction {
            Instruction::ADD => Ok(AluOp::Add),
            Instruction::SUB => Ok(AluOp::Sub),
            Instruction::MUL => Ok(AluOp::Mul),
            Instruction::DIV => Ok(AluOp::Div),
            Instruction::MOD => Ok(AluOp::Mod),
            Instruction::INC => Ok(AluOp::Inc),
            Instruction::DEC => Ok(AluOp::Dec),
            Instruction::CMP => Ok(AluOp::Cmp),
            other => Err(Fault::UnsupportedAluOperation(other)),
        }
    }
}

/// Applies `op` to the registers `reg_a` and `reg_b`. The result is written
/// to `reg_a`, except for CMP which only updates the equal bit of `fl`.
/// The unary operations INC and DEC never read `reg_b`.
///
/// # Errors
///
/// Fails on an invalid register index and when DIV or MOD would divide by
/// zero. The registers are left unchanged in both cases.
pub fn execute(
    op: AluOp,
    reg_a: Byte,
    reg_b: Byte,
    registers: &mut Registers,
    fl: &mut Byte,
) -> Result<(), Fault> {
    let a = registers.get(reg_a)?;

    let result = match op {
        AluOp::Add => a.wrapping_add(registers.get(reg_b)?),
        AluOp::Sub => a.wrapping_sub(registers.get(reg_b)?),
        AluOp::Mul => a.wrapping_mul(registers.get(reg_b)?),
        AluOp::Div => a
            .checked_div(registers.get(reg_b)?)
            .ok_or(Fault::DivisionByZero { op })?,
        AluOp::Mod => a
            .checked_rem(registers.get(reg_b)?)
            .ok_or(Fault::DivisionByZero { op })?,
        AluOp::Inc => a.wrapping_add(1),
        AluOp::Dec => a.wrapping_sub(1),
        AluOp::Cmp => {
            let b = registers.get(reg_b)?;
            if a == b {
                *fl |= FL_EQUAL;
            } else {
                *fl &= !FL_EQUAL;
            }
            trace!("CMP {} {}: fl 0b{:08b}", a, b, fl);
            return Ok(());
        }
    };

    registers.set(reg_a, result)?;
    trace!("{} R{}: {} -> {}", op, reg_a, a, result);

    Ok(())
}

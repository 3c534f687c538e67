use std::convert::TryFrom;
use std::fmt;
use std::io::Write;

use crate::alu::{self, AluOp};
use crate::fault::Fault;
use crate::memory::{Byte, Memory, Word};
use crate::registers::{Registers, FL_EQUAL, REGISTER_COUNT, STACK_TOP};
use color_eyre::eyre::{Result, WrapErr};
use log::*;
use num_enum::IntoPrimitive;
use num_enum::TryFromPrimitive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Running,
    /// Stopped by HLT
    Halted,
    /// Stopped by a fault. There is no way to resume.
    Faulted,
}

/// Emulates a CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Processor {
    /// Program counter
    pub pc: Word,
    /// General purpose registers, R7 is the stack pointer
    pub reg: Registers,
    /// Flag register
    pub fl: Byte,
    pub state: State,
}

impl Default for Processor {
    /// Initializes a new CPU
    fn default() -> Self {
        Self::new(0x00)
    }
}

impl Processor {
    /// Initializes a new CPU
    /// @param entrypoint The start of the program
    pub fn new(entrypoint: Word) -> Self {
        Self {
            pc: entrypoint,
            reg: Registers::default(),
            fl: 0,
            state: State::Running,
        }
    }

    /// Reads the operand `n` bytes after the opcode
    fn operand<const S: usize>(&self, memory: &Memory<S>, n: Word) -> Result<Byte, Fault> {
        let address = self
            .pc
            .checked_add(n)
            .ok_or(Fault::MemoryOutOfRange {
                address: self.pc as usize + n as usize,
            })?;
        memory.read_byte(address)
    }

    /// Reads the register named by the first operand, used as jump target
    fn target<const S: usize>(&self, memory: &Memory<S>) -> Result<Word, Fault> {
        let reg = self.operand(memory, 1)?;
        Ok(self.reg.get(reg)? as Word)
    }

    fn advance(&mut self, instruction: Instruction) {
        self.pc += 1 + instruction.operands();
    }

    fn push<const S: usize>(&mut self, memory: &mut Memory<S>, value: Byte) -> Result<(), Fault> {
        let sp = self.reg.sp();
        let sp = sp.checked_sub(1).ok_or(Fault::StackOverflow { sp })?;
        memory.write_byte(sp as Word, value)?;
        self.reg.set_sp(sp);
        Ok(())
    }

    fn pop<const S: usize>(&mut self, memory: &Memory<S>) -> Result<Byte, Fault> {
        let sp = self.reg.sp();
        if sp >= STACK_TOP {
            return Err(Fault::StackUnderflow { sp });
        }
        let value = memory.read_byte(sp as Word)?;
        self.reg.set_sp(sp + 1);
        Ok(value)
    }

    /// Executes a single instruction
    pub fn execute_instruction<const S: usize, W: Write>(
        &mut self,
        instruction: Instruction,
        memory: &mut Memory<S>,
        out: &mut W,
    ) -> Result<()> {
        match instruction {
            Instruction::LDI => {
                let reg = self.operand(memory, 1)?;
                let value = self.operand(memory, 2)?;
                self.reg.set(reg, value)?;
                self.advance(instruction);

                debug!("LDI R{} {}", reg, value);
            }
            Instruction::PRN => {
                let reg = self.operand(memory, 1)?;
                let value = self.reg.get(reg)?;
                writeln!(out, "{}", value).wrap_err("Failed to write to output")?;
                self.advance(instruction);

                debug!("PRN R{}: {}", reg, value);
            }
            Instruction::HLT => {
                self.state = State::Halted;

                debug!("HLT");
            }
            Instruction::PSH => {
                let reg = self.operand(memory, 1)?;
                let value = self.reg.get(reg)?;
                self.push(memory, value)?;
                self.advance(instruction);

                debug!("PSH R{}: {}", reg, value);
            }
            Instruction::POP => {
                let reg = self.operand(memory, 1)?;
                Registers::check(reg)?;
                let value = self.pop(memory)?;
                self.reg.set(reg, value)?;
                self.advance(instruction);

                debug!("POP R{}: {}", reg, value);
            }
            Instruction::CALL => {
                let addr = self.target(memory)?;
                let ret = self.pc + 1 + instruction.operands();
                let ret = Byte::try_from(ret).map_err(|_| Fault::MemoryOutOfRange {
                    address: ret as usize,
                })?;
                self.push(memory, ret)?;
                self.pc = addr;

                debug!("CALL {} (return to {})", addr, ret);
            }
            Instruction::RET => {
                let addr = self.pop(memory)?;
                self.pc = addr as Word;

                debug!("RET {}", addr);
            }
            Instruction::JMP => {
                let addr = self.target(memory)?;
                self.pc = addr;

                debug!("JMP {}", addr);
            }
            Instruction::JEQ | Instruction::JNE => {
                let equal = (self.fl & FL_EQUAL) != 0;
                let jump = equal == (instruction == Instruction::JEQ);

                if jump {
                    self.pc = self.target(memory)?;
                } else {
                    self.advance(instruction);
                }

                debug!("{} {}: {}", instruction, jump, self.pc);
            }
            Instruction::ADD
            | Instruction::SUB
            | Instruction::MUL
            | Instruction::DIV
            | Instruction::MOD
            | Instruction::INC
            | Instruction::DEC
            | Instruction::CMP => {
                let op = AluOp::try_from(instruction)?;
                let reg_a = self.operand(memory, 1)?;
                let reg_b = match instruction.operands() {
                    2 => self.operand(memory, 2)?,
                    _ => reg_a,
                };
                alu::execute(op, reg_a, reg_b, &mut self.reg, &mut self.fl)?;
                self.advance(instruction);

                debug!("{} R{} R{}", op, reg_a, reg_b);
            }
        }

        Ok(())
    }

    /// Runs one execution step. Does nothing once the processor stopped.
    pub fn execute<const S: usize, W: Write>(
        &mut self,
        memory: &mut Memory<S>,
        out: &mut W,
    ) -> Result<()> {
        if self.state != State::Running {
            return Ok(());
        }

        trace!("{}", self.snapshot(memory));

        let result = self.step(memory, out);
        if result.is_err() {
            self.state = State::Faulted;
        }
        result
    }

    fn step<const S: usize, W: Write>(&mut self, memory: &mut Memory<S>, out: &mut W) -> Result<()> {
        let opcode = memory.read_byte(self.pc)?; // Read opcode where PC is
        let instruction = Instruction::try_from(opcode).map_err(|_| Fault::UnknownInstruction {
            opcode,
            pc: self.pc,
        })?;
        self.execute_instruction(instruction, memory, out)
    }

    /// Run program until HLT or a fault
    pub fn execute_until_hlt<const S: usize, W: Write>(
        &mut self,
        memory: &mut Memory<S>,
        out: &mut W,
    ) -> Result<()> {
        while self.state == State::Running {
            self.execute(memory, out)?;
        }

        info!("Program halted at 0x{:02X}", self.pc);

        Ok(())
    }

    /// Captures the registers and the bytes at the program counter without
    /// changing anything
    pub fn snapshot<const S: usize>(&self, memory: &Memory<S>) -> Snapshot {
        let mut window = [None; 3];
        for (offset, byte) in window.iter_mut().enumerate() {
            *byte = self
                .pc
                .checked_add(offset as Word)
                .and_then(|address| memory.get(address));
        }

        Snapshot {
            pc: self.pc,
            fl: self.fl,
            registers: self.reg.data,
            window,
        }
    }
}

/// Read-only view of the processor state used for tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub pc: Word,
    pub fl: Byte,
    pub registers: [Byte; REGISTER_COUNT],
    /// The instruction bytes at `pc`, `None` past the end of memory
    pub window: [Option<Byte>; 3],
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TRACE: {:02X} {:02X} |", self.pc, self.fl)?;
        for byte in &self.window {
            match byte {
                Some(byte) => write!(f, " {:02X}", byte)?,
                None => f.write_str(" --")?,
            }
        }
        f.write_str(" |")?;
        for value in &self.registers {
            write!(f, " {:02X}", value)?;
        }
        Ok(())
    }
}

macro_rules! instructions {
    ( $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal => $operands:literal , )+ ) => {
        /// Defines the instructions. Bits 6-7 of each opcode hold the number
        /// of operand bytes following it.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(TryFromPrimitive, IntoPrimitive)]
        pub enum Instruction {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl Instruction {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name) , )+
                }
            }

            /// Number of operand bytes following the opcode
            pub const fn operands(&self) -> Word {
                match self {
                    $( Self::$name => $operands , )+
                }
            }
        }

        impl ::std::fmt::Display for Instruction {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    }
}

instructions! {
    /// Load an immediate value into a register
    /// @param register The register to write
    /// @param value The value to load
    LDI = 0b10000010 => 2,
    /// Prints the decimal value of a register
    /// @param register The register to print
    PRN = 0b01000111 => 1,
    /// Stop the execution of the program
    HLT = 0b00000001 => 0,
    /// Push a register onto the stack
    /// @param register The register to push
    PSH = 0b01000101 => 1,
    /// Pop the top of the stack into a register
    /// @param register The register to write
    POP = 0b01000110 => 1,
    /// Push the return address and jump to the address in a register
    /// @param register The register holding the address
    CALL = 0b01010000 => 1,
    /// Pop the return address into the program counter
    RET = 0b00010001 => 0,
    /// Jump to the address in a register
    /// @param register The register holding the address
    JMP = 0b01010100 => 1,
    /// Jump if the equal flag is set
    /// @param register The register holding the address
    JEQ = 0b01010101 => 1,
    /// Jump if the equal flag is clear
    /// @param register The register holding the address
    JNE = 0b01010110 => 1,
    /// regA = regA + regB
    ADD = 0b10100000 => 2,
    /// regA = regA - regB
    SUB = 0b10100001 => 2,
    /// regA = regA * regB
    MUL = 0b10100010 => 2,
    /// regA = regA / regB
    DIV = 0b10100011 => 2,
    /// regA = regA % regB
    MOD = 0b10100100 => 2,
    /// regA = regA + 1
    INC = 0b01100101 => 1,
    /// regA = regA - 1
    DEC = 0b01100110 => 1,
    /// Set the equal flag if regA == regB
    CMP = 0b10100111 => 2,
}

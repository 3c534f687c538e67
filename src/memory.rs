use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::fault::Fault;
use color_eyre::eyre::{eyre, Result, WrapErr};
use log::*;

pub mod parse;

pub type Byte = u8; // 1 byte
pub type Word = u16; // 2 bytes

/// Number of addressable bytes
pub const MEMORY_SIZE: usize = 256;

/// Default memory
pub type StdMem = Memory<MEMORY_SIZE>;

/// Emulates memory for use with the CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memory<const S: usize> {
    /// The actual data of the memory
    pub data: [Byte; S],
}

impl<const S: usize> Default for Memory<S> {
    /// Initializes the memory
    fn default() -> Self {
        Memory { data: [0; S] }
    }
}

impl<const S: usize> Memory<S> {
    /// Reads a byte from the memory
    pub fn read_byte(&self, position: Word) -> Result<Byte, Fault> {
        self.get(position).ok_or(Fault::MemoryOutOfRange {
            address: position as usize,
        })
    }

    /// Writes a byte to the memory
    pub fn write_byte(&mut self, position: Word, value: Byte) -> Result<(), Fault> {
        let cell = self
            .data
            .get_mut(position as usize)
            .ok_or(Fault::MemoryOutOfRange {
                address: position as usize,
            })?;
        *cell = value;
        Ok(())
    }

    /// Reads a byte without failing. Returns `None` outside of the memory.
    pub fn get(&self, position: Word) -> Option<Byte> {
        self.data.get(position as usize).copied()
    }

    /// Writes an array of bytes to the memory
    pub fn write_array(&mut self, position: Word, data: &[Byte]) -> Result<(), Fault> {
        let start = position as usize;
        let end = start + data.len();
        if end > S {
            return Err(Fault::MemoryOutOfRange {
                address: start.max(S),
            });
        }

        self.data[start..end].copy_from_slice(data);
        Ok(())
    }

    /// Loads a program in the LS-8 text format from `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read program `{}`", path.display()))?;

        data.parse().map_err(|errors: Vec<parse::ParseError>| {
            let messages = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");
            eyre!("Failed to parse program `{}`:\n{}", path.display(), messages)
        })
    }

    /// Logs every row of 16 bytes which is not all zeroes
    pub fn dump(&self) {
        for (row, chunk) in self.data.chunks(16).enumerate() {
            if chunk.iter().all(|&byte| byte == 0) {
                continue;
            }

            let bytes = chunk
                .iter()
                .map(|byte| format!("{:02X}", byte))
                .collect::<Vec<_>>()
                .join(" ");
            debug!("0x{:02X}: {}", row * 16, bytes);
        }
    }
}

impl<const S: usize> FromStr for Memory<S> {
    type Err = Vec<parse::ParseError>;

    fn from_str(data: &str) -> std::result::Result<Self, Self::Err> {
        parse::Parser::new(data, Self::default()).parse()
    }
}

/// Writes a block of instructions directly into the memory
#[macro_export]
macro_rules! write_instructions {
    ( $mem:ident : $pos:expr => $( $byte:expr ),+ ) => {
        $mem.write_array($pos, &[
            $(
                $byte as $crate::memory::Byte,
            )+
        ])
    };
}

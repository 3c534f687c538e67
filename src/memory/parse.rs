//! Loader for the LS-8 text format. Every line holds one byte written in
//! binary, anything after a `#` is a comment:
//!
//! ```text
//! 10000010 # LDI R0,8
//! 00000000
//! 00001000
//! 01000111 # PRN R0
//! 00000000
//! 00000001 # HLT
//! ```

use std::borrow::Cow;
use std::error;
use std::{fmt, str::Lines};

use super::{Byte, Memory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidAddress { address: usize },
    InvalidNumber { radix: u32 },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::InvalidAddress { address } => {
                write!(f, "memory has no address `0x{:x}`", address)
            }
            ParseErrorKind::InvalidNumber { radix } => {
                write!(f, "failed to parse number with radix `{}`", radix)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl ParseError {
    fn new<C, S>(kind: ParseErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(
                f,
                "error [ln: {}]: {} - {}",
                self.line_nr, self.kind, context
            )
        } else {
            write!(f, "error [ln: {}]: {}", self.line_nr, self.kind)
        }
    }
}

impl error::Error for ParseError {}

#[derive(Debug, Clone)]
pub struct Parser<'a, const S: usize> {
    lines: Lines<'a>,
    line_nr: usize,
    position: usize,
    memory: Memory<S>,
}

impl<'a, const S: usize> Parser<'a, S> {
    /// Creates a new parser for `data` which will populate `memory` starting
    /// at address 0.
    pub fn new(data: &'a str, memory: Memory<S>) -> Self {
        Self {
            lines: data.lines(),
            line_nr: 0,
            position: 0,
            memory,
        }
    }

    /// Consumes `self` and tries to parse all `self.data` into memory.
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end.
    pub fn parse(mut self) -> Result<Memory<S>, Vec<ParseError>> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(err) = res {
                log::debug!("{}", err);
                errors.push(err);
            }
        }

        if errors.is_empty() {
            log::debug!("Loaded {} bytes", self.position);
            Ok(self.memory)
        } else {
            Err(errors)
        }
    }

    /// Tries to parse the next line of [`Parser::lines`]. Each byte should
    /// be located on it's own line.
    fn parse_next_line(&mut self) -> Option<Result<(), ParseError>> {
        let line = self.lines.next()?;
        self.line_nr += 1;

        let line = match line.split('#').next() {
            Some(code) => code.trim(),
            None => return Some(Ok(())),
        };

        if line.is_empty() {
            // Comment or empty line; skip
            return Some(Ok(()));
        }

        Some(self.parse_byte(line).and_then(|byte| self.write_byte(byte)))
    }

    /// Tries to parse `line` as a byte written in binary, with the comment
    /// already stripped.
    ///
    /// # Examples
    ///
    /// - `10000010`
    /// - `101`
    fn parse_byte(&self, line: &str) -> Result<Byte, ParseError> {
        if !line.bytes().all(|digit| digit == b'0' || digit == b'1') {
            return Err(ParseError::new(
                ParseErrorKind::InvalidNumber { radix: 2 },
                format!("`{}` is not a binary number", line),
                self.line_nr,
            ));
        }

        Byte::from_str_radix(line, 2).map_err(|_| {
            ParseError::new(
                ParseErrorKind::InvalidNumber { radix: 2 },
                format!("`{}` does not fit into a byte", line),
                self.line_nr,
            )
        })
    }

    /// Writes `byte` into memory at [`Parser::position`]. Then it
    /// increments the position by one.
    ///
    /// # Errors
    ///
    /// This will return an error if the program does not fit into memory.
    fn write_byte(&mut self, byte: Byte) -> Result<(), ParseError> {
        match self.memory.data.get_mut(self.position) {
            Some(cell) => {
                log::trace!(
                    "[{}] 0x{:02X} = 0b{:08b}",
                    self.line_nr,
                    self.position,
                    byte
                );
                *cell = byte;
                self.position += 1;
                Ok(())
            }
            None => Err(ParseError::new(
                ParseErrorKind::InvalidAddress {
                    address: self.position,
                },
                "program does not fit into memory",
                self.line_nr,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::memory::StdMem;
    use crate::processor::Instruction;
    use std::str::FromStr;

    use super::*;
    use color_eyre::Result;

    #[test]
    fn parse_mult() -> Result<()> {
        let mem = StdMem::from_str(include_str!("../../programs/mult.ls8")).unwrap();

        assert_eq!(mem.read_byte(0)?, Instruction::LDI.into());
        assert_eq!(mem.read_byte(1)?, 0);
        assert_eq!(mem.read_byte(2)?, 8);
        assert_eq!(mem.read_byte(3)?, Instruction::LDI.into());
        assert_eq!(mem.read_byte(4)?, 1);
        assert_eq!(mem.read_byte(5)?, 9);
        assert_eq!(mem.read_byte(6)?, Instruction::MUL.into());
        assert_eq!(mem.read_byte(7)?, 0);
        assert_eq!(mem.read_byte(8)?, 1);
        assert_eq!(mem.read_byte(9)?, Instruction::PRN.into());
        assert_eq!(mem.read_byte(10)?, 0);
        assert_eq!(mem.read_byte(11)?, Instruction::HLT.into());

        Ok(())
    }

    #[test]
    fn parse_comments_and_blank_lines() -> Result<()> {
        let data = r#"
            # a program with nothing but a halt

            00000001    # HLT
            #10000010
            101#no space before the comment
        "#;

        let mem = StdMem::from_str(data).unwrap();

        assert_eq!(mem.read_byte(0)?, Instruction::HLT.into());
        assert_eq!(mem.read_byte(1)?, 0b101);
        assert_eq!(mem.read_byte(2)?, 0);

        Ok(())
    }

    #[test]
    fn parse_invalid_lines() {
        let data = "00000001\nLDI\n2\n100000000\n00000001";

        let errors = StdMem::from_str(data).unwrap_err();

        let lines: Vec<_> = errors.iter().map(ParseError::line_nr).collect();
        assert_eq!(lines, vec![2, 3, 4]);
        assert!(errors
            .iter()
            .all(|err| err.kind() == ParseErrorKind::InvalidNumber { radix: 2 }));
    }

    #[test]
    fn parse_program_too_large() {
        let data = "1\n10\n11\n100\n";

        let errors = Parser::new(data, Memory::<3>::default()).parse().unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].kind(),
            ParseErrorKind::InvalidAddress { address: 3 }
        );
        assert_eq!(errors[0].line_nr(), 4);
    }

    #[test]
    fn display_error() {
        let err = ParseError::new(
            ParseErrorKind::InvalidNumber { radix: 2 },
            "`2` is not a binary number",
            7,
        );

        assert_eq!(
            err.to_string(),
            "error [ln: 7]: failed to parse number with radix `2` - `2` is not a binary number"
        );
    }
}

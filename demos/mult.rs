use std::io;

use color_eyre::eyre::{eyre, Result};
use log::LevelFilter;
use ls8::memory::StdMem;
use ls8::processor::Processor;
use ls8::write_instructions;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new()
        .with_level(LevelFilter::Debug)
        .init()
        .map_err(|err| eyre!("{}", err))?; // logging

    let mut mem = StdMem::default();
    let mut cpu = Processor::default();

    use ls8::processor::Instruction::*;
    write_instructions!(mem : 0 =>
        LDI, 0, 8,
        LDI, 1, 9,
        MUL, 0, 1,
        PRN, 0,
        HLT
    )?;

    cpu.execute_until_hlt(&mut mem, &mut io::stdout())?;

    Ok(())
}

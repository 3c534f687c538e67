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
        .with_level(LevelFilter::Trace)
        .init()
        .map_err(|err| eyre!("{}", err))?; // logging

    let mut mem = StdMem::default();
    let mut cpu = Processor::default();

    use ls8::processor::Instruction::*;
    write_instructions!(mem : 0 =>
        LDI, 0, 10, // counter
        LDI, 1, 0,
        LDI, 2, 9, // loop
        PRN, 0,
        DEC, 0,
        CMP, 0, 1,
        JNE, 2,
        HLT
    )?;
    mem.dump();

    cpu.execute_until_hlt(&mut mem, &mut io::stdout())?;

    Ok(())
}

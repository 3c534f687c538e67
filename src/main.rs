use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::{env, process};

use color_eyre::eyre::{eyre, Report, Result};
use log::LevelFilter;
use ls8::memory::StdMem;
use ls8::processor::Processor;
use simple_logger::SimpleLogger;

/// Exit status when the program cannot be read or parsed
const EXIT_LOAD_FAILURE: i32 = 2;
/// Exit status when the program faults while running
const EXIT_RUNTIME_FAULT: i32 = 1;

const USAGE: &str = "usage: ls8 [-v|--verbose] [-t|--trace] <program.ls8>";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Options {
    program: PathBuf,
    level: LevelFilter,
}

impl Options {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut program = None;
        let mut level = LevelFilter::Warn;

        for arg in args {
            match arg.as_str() {
                "-v" | "--verbose" => level = level.max(LevelFilter::Debug),
                "-t" | "--trace" => level = LevelFilter::Trace,
                flag if flag.starts_with('-') => return Err(eyre!("unknown option `{}`", flag)),
                path if program.is_none() => program = Some(PathBuf::from(path)),
                other => return Err(eyre!("unexpected argument `{}`", other)),
            }
        }

        let program = program.ok_or_else(|| eyre!("missing program file"))?;
        Ok(Self { program, level })
    }
}

/// Why a run did not end with HLT
#[derive(Debug)]
enum Failure {
    /// The program could not be read or parsed
    Load(Report),
    /// The program faulted while running
    Fault(Report),
}

impl Failure {
    fn exit_code(&self) -> i32 {
        match self {
            Failure::Load(_) => EXIT_LOAD_FAILURE,
            Failure::Fault(_) => EXIT_RUNTIME_FAULT,
        }
    }

    fn report(&self) -> &Report {
        match self {
            Failure::Load(report) | Failure::Fault(report) => report,
        }
    }
}

/// Loads `program` and runs it until HLT, writing PRN output to `out`
fn run<W: Write>(program: &Path, out: &mut W) -> Result<(), Failure> {
    let mut mem = StdMem::from_file(program).map_err(Failure::Load)?;
    mem.dump();

    let mut cpu = Processor::default();
    cpu.execute_until_hlt(&mut mem, out).map_err(Failure::Fault)
}

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling

    let options = match Options::parse(env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{}\n{}", err, USAGE);
            process::exit(EXIT_LOAD_FAILURE);
        }
    };

    SimpleLogger::new()
        .with_level(options.level)
        .init()
        .map_err(|err| eyre!("Failed to set up logging: {}", err))?; // logging

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Err(failure) = run(&options.program, &mut out) {
        out.flush().ok();
        eprintln!("{:?}", failure.report());
        process::exit(failure.exit_code());
    }

    out.flush()?;
    Ok(())
}

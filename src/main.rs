use clap::Parser;
use std::path::PathBuf;
use std::process::exit;
use toyasm::{
    error,
    error::Result,
    executor::{Executor, State},
    info,
    log::{self, Level},
    runner::build_source,
    warn,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs a toy four-register assembly program")]
struct Args {
    /// Assembly source file
    file: PathBuf,

    /// Stop with an error after this many executed instructions
    #[arg(long)]
    max_steps: Option<usize>,

    /// Print the program listing before running it
    #[arg(long)]
    dump: bool,

    /// Log every executed instruction
    #[arg(long)]
    trace: bool,
}

fn unwrap_or_error<T>(result: Result<T>, file: &str, source: &str) -> T {
    match result {
        Ok(x) => x,
        Err(e) => {
            if e.print(file, source).is_err() {
                error!("{}", e);
            }
            exit(if e.error_type.is_build_time() { 1 } else { 3 });
        }
    }
}

fn main() {
    let args = Args::parse();

    if args.trace {
        log::set_level(Level::Trace);
    }

    let file = args.file.display().to_string();
    let source = match std::fs::read_to_string(&args.file) {
        Ok(source) => source,
        Err(e) => {
            error!("Could not read '{}': {}", file, e);
            exit(1);
        }
    };

    let program = unwrap_or_error(build_source(&source), &file, &source);

    if args.dump {
        print!("{}", program);
    }

    let mut executor = Executor::new(&program);
    let mut steps = 0usize;

    while executor.state() == State::Running {
        if args.max_steps.map_or(false, |max| steps >= max) {
            warn!(
                "program did not finish within {} steps ({})",
                steps,
                executor.registers()
            );
            exit(2);
        }

        if let Err(e) = executor.step() {
            warn!("registers at failure: {}", executor.registers());
            unwrap_or_error::<()>(Err(e), &file, &source);
        }
        steps += 1;
    }

    info!("finished after {} steps", steps);

    let (ax, bx, cx, dx) = executor.registers().snapshot();
    println!("ax={} bx={} cx={} dx={}", ax, bx, cx, dx);
}

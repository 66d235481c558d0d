use log::{debug, info};
use std::env;
use std::fs::File;
use std::io::{self, BufRead, Write};
use synacor::debugger::Debugger;
use synacor::{Interpreter, MachineConfig, MachineState, ProgramImage, VM};

fn print_usage(program: &str) {
    println!("synacor - virtual machine for the Synacor challenge binary");
    println!();
    println!(
        "Usage: {} <challenge.bin> [--config file.toml] [--trace] [--debug]",
        program
    );
    println!();
    println!("  --config  Load machine settings from a TOML file");
    println!("  --trace   Record an execution trace (shown after errors)");
    println!("  --debug   Accept debugger commands on input lines starting with '!'");
}

/// argv[0], or a fallback when the OS passes an empty argv
fn program_name(args: &[String]) -> &str {
    args.first().map(String::as_str).unwrap_or("synacor")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let program = program_name(&args);
    if args.len() < 2 {
        print_usage(program);
        return Ok(());
    }

    let mut image_path = None;
    let mut config_path = None;
    let mut force_trace = false;
    let mut debug_commands = false;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config_path = Some(args.get(i).ok_or("--config needs a file")?.clone());
            }
            "--trace" => force_trace = true,
            "--debug" => debug_commands = true,
            "-h" | "--help" => {
                print_usage(program);
                return Ok(());
            }
            arg if !arg.starts_with('-') => image_path = Some(arg.to_string()),
            other => return Err(format!("Unknown option: {}", other).into()),
        }
        i += 1;
    }
    let image_path = image_path.ok_or("No program image given")?;

    let mut config = match config_path {
        Some(path) => MachineConfig::load(path)?,
        None => MachineConfig::default(),
    };
    // Scripted input is otherwise invisible in the transcript
    if !atty::is(atty::Stream::Stdin) {
        config.echo = true;
    }
    config.apply_env()?;
    if force_trace || debug_commands {
        config.trace.enabled = true;
    }

    let file = match File::open(&image_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error: Cannot open program image '{}': {}", image_path, e);
            std::process::exit(1);
        }
    };
    let image = ProgramImage::from_reader(io::BufReader::new(file))?;
    info!("Loaded {} words from {}", image.loaded_len(), image_path);

    let interpreter = Interpreter::with_config(VM::new(image), &config);
    let mut debugger = Debugger::new(interpreter);

    if let Err(e) = drive(&mut debugger, &config, debug_commands) {
        // Output the program produced before the fault is still pending
        print!("{}", debugger.take_output());
        io::stdout().flush().ok();
        eprintln!("\nError during execution: {}", e);
        eprintln!("{}", debugger.state_report());
        std::process::exit(1);
    }
    Ok(())
}

/// Poll-and-resume loop: run while the machine can make progress, read a
/// line whenever it waits for input.
fn drive(
    debugger: &mut Debugger,
    config: &MachineConfig,
    debug_commands: bool,
) -> Result<(), synacor::VmError> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        match debugger.interpreter.state() {
            MachineState::Halted => {
                debug!("Program halted.");
                return Ok(());
            }
            MachineState::Running => {
                // Output left behind by debugger commands comes first
                print!("{}", debugger.take_output());
                print!("{}", debugger.interpreter.run()?.text());
                io::stdout().flush().ok();
            }
            MachineState::AwaitingInput => {
                let line = match lines.next() {
                    Some(line) => line?,
                    None => {
                        debug!("End of input while awaiting input");
                        return Ok(());
                    }
                };
                if debug_commands {
                    if let Some(command) = line.strip_prefix('!') {
                        println!("{}", debugger.execute_command(command));
                        continue;
                    }
                }
                if config.echo {
                    println!("{}", line);
                }
                debugger.interpreter.run_text(&line, true)?;
            }
        }
    }
}

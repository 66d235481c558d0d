use log::debug;
use std::env;
use std::fs::File;
use synacor::disassembler::Disassembler;
use synacor::ProgramImage;

fn usage(program: &str) {
    eprintln!("Usage: {} [options] <image> [start] [count]", program);
    eprintln!("\nOptions:");
    eprintln!("  -d   Dump the raw words of each instruction");
    eprintln!("  -h   Show this help message");
}

fn parse_number(text: &str) -> Option<usize> {
    match text.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

/// argv[0], or a fallback when the OS passes an empty argv
fn program_name(args: &[String]) -> &str {
    args.first().map(String::as_str).unwrap_or("synacor-dasm")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let program = program_name(&args);

    let mut dump_words = false;
    let mut positional = Vec::new();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "-d" => dump_words = true,
            "-h" | "--help" => {
                usage(program);
                std::process::exit(0);
            }
            a if !a.starts_with('-') => positional.push(a.to_string()),
            _ => {
                eprintln!("Unknown option: {}", arg);
                std::process::exit(1);
            }
        }
    }

    let filename = match positional.first() {
        Some(name) => name.clone(),
        None => {
            usage(program);
            std::process::exit(1);
        }
    };
    let start = match positional.get(1) {
        Some(text) => parse_number(text).ok_or_else(|| format!("Bad start address: {}", text))?,
        None => 0,
    };
    if start > u16::MAX as usize {
        return Err(format!("Start address out of range: {}", start).into());
    }

    let image = ProgramImage::from_reader(File::open(&filename)?)?;
    debug!("Loaded {} words from {}", image.loaded_len(), filename);

    let disasm = Disassembler::new(image.words()).with_words(dump_words);
    let listing = match positional.get(2) {
        Some(text) => {
            let count = parse_number(text).ok_or_else(|| format!("Bad count: {}", text))?;
            disasm.disassemble(start as u16, count)
        }
        None => {
            let end = image.loaded_len().min(u16::MAX as usize) as u16;
            disasm.disassemble_range(start as u16, end)
        }
    };
    for line in listing {
        println!("{}", line);
    }

    Ok(())
}

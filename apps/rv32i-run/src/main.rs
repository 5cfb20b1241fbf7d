//! Command-line runner for the RV32I core.
//!
//! Loads a program image at word address 0, runs it until the `ret`
//! sentinel, and prints the instruction count and final register state.

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rv32i_encoder::assemble_words;
use rv32i_fde::{parse_hex_image, HaltPolicy, InstructionMemory, LogLevel, RegisterId, Rv32iCore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ImageFormat {
    /// Comma/whitespace separated hex words
    Hex,
    /// Raw little-endian instruction words
    Bin,
    /// RV32I assembly text
    Asm,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Halt {
    /// Stop when `ret` lands on address 0
    ReturnToZero,
    /// Stop on any `ret`
    OnReturn,
}

impl From<Halt> for HaltPolicy {
    fn from(halt: Halt) -> Self {
        match halt {
            Halt::ReturnToZero => HaltPolicy::ReturnToZero,
            Halt::OnReturn => HaltPolicy::OnReturn,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "rv32i-run", version, about = "Run an RV32I program image")]
struct Args {
    /// Program image
    image: PathBuf,

    /// Image format; inferred from the extension when omitted
    #[arg(long, value_enum)]
    format: Option<ImageFormat>,

    /// Word address to start at (decimal or 0x-prefixed hex)
    #[arg(long, default_value = "0", value_parser = parse_word_address)]
    start_pc: u16,

    /// Halt convention
    #[arg(long, value_enum, default_value_t = Halt::ReturnToZero)]
    halt: Halt,

    /// Give up after this many instructions
    #[arg(long)]
    max_instructions: Option<u64>,

    /// Print the last executed instructions
    #[arg(long)]
    trace: bool,

    /// Log filter, overrides RUST_LOG (e.g. `rv32i_fde=trace`)
    #[arg(long)]
    log: Option<String>,
}

fn parse_word_address(text: &str) -> Result<u16, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => text.parse::<u16>(),
    };
    parsed.map_err(|e| format!("invalid word address `{text}`: {e}"))
}

fn infer_format(path: &Path) -> ImageFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("hex") => ImageFormat::Hex,
        Some("s") | Some("S") | Some("asm") => ImageFormat::Asm,
        _ => ImageFormat::Bin,
    }
}

fn load_image(path: &Path, format: ImageFormat) -> Result<InstructionMemory> {
    let memory = match format {
        ImageFormat::Hex => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let words = parse_hex_image(&text)
                .with_context(|| format!("parsing {}", path.display()))?;
            InstructionMemory::from_words(&words)?
        }
        ImageFormat::Bin => {
            let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            InstructionMemory::from_le_bytes(&bytes)?
        }
        ImageFormat::Asm => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let words = assemble_words(&text)
                .with_context(|| format!("assembling {}", path.display()))?;
            InstructionMemory::from_words(&words)?
        }
    };
    Ok(memory)
}

fn init_tracing(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log.as_deref())?;

    let format = args.format.unwrap_or_else(|| infer_format(&args.image));
    let memory = load_image(&args.image, format)?;
    info!(image = %args.image.display(), ?format, "image loaded");

    let mut core = Rv32iCore::new().with_halt_policy(args.halt.into());
    if let Some(limit) = args.max_instructions {
        core = core.with_max_instructions(limit);
    }
    if args.trace {
        core = core.with_log_level(LogLevel::Instructions);
    }

    let result = core.run(args.start_pc, &memory);
    if args.trace {
        print!("{}", core.format_logs());
    }
    let count = match result {
        Ok(count) => count,
        Err(e) => {
            eprintln!("{}", core.format_debug_info(&memory, 10));
            return Err(e).context("execution failed");
        }
    };

    println!("instructions: {count}");
    println!("halted at pc 0x{:04x}", core.read_register(RegisterId::Pc));
    print!("{}", core.dump_state());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_word_address() {
        assert_eq!(parse_word_address("16"), Ok(16));
        assert_eq!(parse_word_address("0x10"), Ok(16));
        assert!(parse_word_address("0x10000").is_err());
        assert!(parse_word_address("pc").is_err());
    }

    #[test]
    fn test_infer_format() {
        assert_eq!(infer_format(Path::new("test_op_imm.hex")), ImageFormat::Hex);
        assert_eq!(infer_format(Path::new("loop.s")), ImageFormat::Asm);
        assert_eq!(infer_format(Path::new("prog.bin")), ImageFormat::Bin);
        assert_eq!(infer_format(Path::new("prog")), ImageFormat::Bin);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "rv32i-run",
            "prog.hex",
            "--halt",
            "on-return",
            "--start-pc",
            "0x4",
            "--max-instructions",
            "10",
        ])
        .unwrap();
        assert_eq!(args.halt, Halt::OnReturn);
        assert_eq!(args.start_pc, 4);
        assert_eq!(args.max_instructions, Some(10));
        assert!(!args.trace);
        assert_eq!(HaltPolicy::from(args.halt), HaltPolicy::OnReturn);
    }
}

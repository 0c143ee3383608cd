use std::{
    fs,
    io::{self, BufWriter, Write},
    path::PathBuf,
    process,
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

use dasm68k::{DasmConfig, Dialect, Disassembler, MemoryImage, MemoryReader, NumberFormat};

/// Disassemble a raw big-endian 68000-family memory image.
#[derive(Parser)]
#[command(name = "dasm68k", version)]
struct Args {
    /// Raw image file
    image: PathBuf,
    /// Address the first byte of the image is loaded at
    #[arg(long, default_value = "0", value_parser = parse_address)]
    origin: u32,
    /// First address to decode (defaults to the origin)
    #[arg(long, value_parser = parse_address)]
    start: Option<u32>,
    /// Stop after this many instructions
    #[arg(short = 'n', long, conflicts_with = "end")]
    count: Option<usize>,
    /// Stop before this address (defaults to the end of the image)
    #[arg(long, value_parser = parse_address)]
    end: Option<u32>,
    /// native, musashi, motorola or mit
    #[arg(short, long, default_value = "native")]
    dialect: Dialect,
    /// hex, HEX, c or dec
    #[arg(short, long, default_value = "hex")]
    radix: NumberFormat,
    /// Print zero without a radix prefix
    #[arg(long)]
    plain_zero: bool,
    /// Print the instruction words in front of the text
    #[arg(short, long)]
    words: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let data = fs::read(&args.image)
        .with_context(|| format!("failed to read {}", args.image.display()))?;
    let len = u32::try_from(data.len()).context("image exceeds the 32-bit address space")?;
    let image_end = args
        .origin
        .checked_add(len)
        .context("image does not fit above its origin")?;
    info!(
        "loaded {} bytes at {:#010x} from {}",
        data.len(),
        args.origin,
        args.image.display()
    );
    let image = MemoryImage::from_bytes(args.origin, data);

    let start = args.start.unwrap_or(args.origin);
    let end = args.end.unwrap_or(image_end);
    if end < start {
        bail!("end address {end:#x} lies below start address {start:#x}");
    }
    if start < end && !image.covers_range(start, 2) {
        bail!(
            "start address {start:#x} lies outside the image ({:#x}..{image_end:#x})",
            args.origin
        );
    }

    let number_format = if args.plain_zero {
        args.radix.with_plain_zero()
    } else {
        args.radix
    };
    let config = DasmConfig::new(args.dialect, number_format);
    let limit = args.count.unwrap_or(usize::MAX);
    let mut out = BufWriter::new(io::stdout().lock());

    for (addr, line) in Disassembler::new(&image, config, start, end).take(limit) {
        if args.words {
            let words = instruction_words(&image, addr, line.next);
            writeln!(out, "{addr:08x}: {words:<24} {}", line.text)?;
        } else {
            writeln!(out, "{addr:08x}: {}", line.text)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn instruction_words(image: &MemoryImage, addr: u32, next: u32) -> String {
    let count = next.wrapping_sub(addr) / 2;
    (0..count)
        .map(|i| format!("{:04x}", image.read16(addr.wrapping_add(i * 2))))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Accepts `0x`/`$` prefixed hexadecimal or plain decimal.
fn parse_address(text: &str) -> Result<u32> {
    let (digits, radix) = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix('$'))
    {
        Some(hex) => (hex, 16),
        None => (text, 10),
    };
    u32::from_str_radix(digits, radix).with_context(|| format!("invalid address `{text}`"))
}

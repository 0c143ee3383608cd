use dasm68k::{
    Dialect, NumberFormat, decode_one, decode_tokens,
    decoder::{Operation, table},
};
use libtest_mimic::{Arguments, Failed, Trial};

const ORIGIN: u32 = 0x0001_0000;

/// Extension-word fillers. `full` is a full-format index word with long base
/// and outer displacements, so indexed operands take their longest form.
const FILLERS: [(&str, u16); 3] = [("zero", 0x0000), ("ones", 0xFFFF), ("full", 0x0133)];

fn sweep(dialect: Dialect, filler: u16) -> Result<(), Failed> {
    for opcode in 0..=u16::MAX {
        let mem = |addr: u32| if addr == ORIGIN { opcode } else { filler };
        let line = decode_one(ORIGIN, &mem, dialect, NumberFormat::hex());
        let len = line.next.wrapping_sub(ORIGIN);

        if line.text.is_empty() {
            return Err(format!("{opcode:#06x}: empty text").into());
        }
        if !(2..=22).contains(&len) || len % 2 != 0 {
            return Err(format!("{opcode:#06x}: advanced {len} bytes ({})", line.text).into());
        }

        let decoded = decode_tokens(ORIGIN, &mem, dialect);
        let reserved = matches!(
            decoded.entry.op,
            Operation::Undefined | Operation::LineA | Operation::LineF
        );
        if reserved == table::is_assigned(opcode) {
            return Err(format!("{opcode:#06x}: bound to {:?}", decoded.entry.op).into());
        }
        if reserved && len != 2 {
            return Err(format!("{opcode:#06x}: reserved slot read extension words").into());
        }
        if decoded.render(dialect, NumberFormat::hex()) != line.text {
            return Err(format!("{opcode:#06x}: token rendering differs").into());
        }
    }
    Ok(())
}

fn main() {
    let args = Arguments::from_args();

    let trials = Dialect::ALL
        .iter()
        .flat_map(|&dialect| {
            FILLERS.iter().map(move |&(name, filler)| {
                Trial::test(format!("{}::{name}", dialect.name()), move || {
                    sweep(dialect, filler)
                })
            })
        })
        .collect();

    libtest_mimic::run(&args, trials).exit();
}

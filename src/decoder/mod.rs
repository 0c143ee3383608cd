use log::debug;

use crate::{
    config::{DasmConfig, Dialect, NumberFormat},
    memory::{Cursor, MemoryReader},
};

pub mod display;
pub mod ea;
mod routines;
pub mod sink;
pub mod table;

pub use display::{Token, TokenList, format_register_list, parse_register_list};
pub use ea::{Ea, Indirection, resolve_ea};
pub use sink::OutputSink;
pub use table::{Entry, lookup};

/// One rendered instruction and the address following it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub next: u32,
}

/// An instruction decoded down to tokens. Can be rendered any number of
/// times without touching memory again.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub address: u32,
    pub opcode: u16,
    pub next: u32,
    pub entry: Entry,
    pub tokens: TokenList,
}

impl Decoded {
    /// Number of extension words that followed the opcode.
    pub fn extension_words(&self) -> u32 {
        self.next.wrapping_sub(self.address).wrapping_sub(2) / 2
    }

    pub fn render_into(&self, dialect: Dialect, nf: NumberFormat, sink: &mut OutputSink) {
        display::render(self.tokens.as_slice(), dialect, nf, sink);
    }

    pub fn render(&self, dialect: Dialect, nf: NumberFormat) -> String {
        let mut sink = OutputSink::new();
        self.render_into(dialect, nf, &mut sink);
        sink.text()
    }
}

/// State threaded through a decode routine.
pub(crate) struct Dasm<'m> {
    pub(crate) cursor: Cursor<'m>,
    pub(crate) entry: Entry,
    pub(crate) drop_outer: bool,
    pub(crate) out: TokenList,
}

impl Dasm<'_> {
    pub(crate) fn ea(&mut self, mode: AddressingMode, reg: u8, size: Size) -> Ea {
        resolve_ea(mode, reg, size, &mut self.cursor, self.drop_outer)
    }

    /// The operand encoded in the low six bits of the opcode.
    pub(crate) fn op_ea(&mut self, op: u16) -> Ea {
        self.ea(self.entry.mode, bit_range(op, 0, 3), self.entry.size)
    }

    pub(crate) fn read(&mut self, size: Size) -> u32 {
        self.cursor.read(size)
    }

    pub(crate) fn read16(&mut self) -> u16 {
        self.cursor.read16()
    }

    pub(crate) fn read32(&mut self) -> u32 {
        self.cursor.read32()
    }
}

/// Decodes the instruction at `address` into tokens.
///
/// Only the outer-displacement handling of full-format extension words
/// depends on the dialect; everything else is dialect-free until rendering.
pub fn decode_tokens(address: u32, mem: &dyn MemoryReader, dialect: Dialect) -> Decoded {
    let opcode = mem.read16(address);
    let entry = lookup(opcode);
    let mut dasm = Dasm {
        cursor: Cursor::new(mem, address.wrapping_add(2)),
        entry,
        drop_outer: dialect.drops_outer_displacement(),
        out: TokenList::new(),
    };
    (entry.routine)(&mut dasm, opcode);

    Decoded {
        address,
        opcode,
        next: dasm.cursor.addr(),
        entry,
        tokens: dasm.out,
    }
}

/// Decodes one instruction into a caller-owned sink and returns the address
/// of the next instruction.
pub fn decode_into(
    address: u32,
    mem: &dyn MemoryReader,
    config: DasmConfig,
    sink: &mut OutputSink,
) -> u32 {
    let decoded = decode_tokens(address, mem, config.dialect);
    decoded.render_into(config.dialect, config.number_format, sink);
    decoded.next
}

/// Decodes and renders the instruction at `address`. Never fails: every
/// opcode has a routine and unassigned slots render as data.
pub fn decode_one(
    address: u32,
    mem: &dyn MemoryReader,
    dialect: Dialect,
    number_format: NumberFormat,
) -> Line {
    let mut sink = OutputSink::new();
    let next = decode_into(
        address,
        mem,
        DasmConfig::new(dialect, number_format),
        &mut sink,
    );
    Line {
        text: sink.text(),
        next,
    }
}

/// Sequential listing over `[start, end)`.
pub struct Disassembler<'m> {
    mem: &'m dyn MemoryReader,
    config: DasmConfig,
    addr: u32,
    end: u32,
}

impl<'m> Disassembler<'m> {
    pub fn new(mem: &'m dyn MemoryReader, config: DasmConfig, start: u32, end: u32) -> Self {
        debug!("disassembling {start:#010x}..{end:#010x} as {}", config.dialect);
        Self {
            mem,
            config,
            addr: start,
            end,
        }
    }
}

impl Iterator for Disassembler<'_> {
    type Item = (u32, Line);

    fn next(&mut self) -> Option<Self::Item> {
        if self.addr >= self.end {
            return None;
        }
        let addr = self.addr;
        let line = decode_one(
            addr,
            self.mem,
            self.config.dialect,
            self.config.number_format,
        );
        // Stop instead of wrapping around the top of the address space.
        self.addr = if line.next > addr { line.next } else { self.end };
        Some((addr, line))
    }
}

pub(crate) fn bit_range(word: u16, start: u8, end: u8) -> u8 {
    debug_assert!(end > start && end - start <= 8);
    let width = end - start;
    ((word >> start) & ((1 << width) - 1)) as u8
}

/// Operation identity. One variant per mnemonic family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Abcd,
    Add,
    Adda,
    Addi,
    Addq,
    Addx,
    And,
    Andi,
    AndiCcr,
    AndiSr,
    Asl,
    Asr,
    Bcc,
    Bchg,
    Bclr,
    Bfchg,
    Bfclr,
    Bfexts,
    Bfextu,
    Bfffo,
    Bfins,
    Bfset,
    Bftst,
    Bkpt,
    Bra,
    Bset,
    Bsr,
    Btst,
    Callm,
    Cas,
    Cas2,
    Chk,
    Chk2,
    Clr,
    Cmp,
    Cmp2,
    Cmpa,
    Cmpi,
    Cmpm,
    /// Coprocessor general instruction.
    CpGen,
    CpBcc,
    CpDbcc,
    CpScc,
    CpTrapcc,
    CpSave,
    CpRestore,
    Dbcc,
    Divs,
    Divsl,
    Divu,
    Divul,
    /// Long divide; renders as one of the four divide mnemonics.
    Divl,
    Eor,
    Eori,
    EoriCcr,
    EoriSr,
    Exg,
    Ext,
    Extb,
    Illegal,
    Jmp,
    Jsr,
    Lea,
    Link,
    Lsl,
    Lsr,
    Move,
    Movea,
    MoveFromCcr,
    MoveToCcr,
    MoveFromSr,
    MoveToSr,
    MoveUsp,
    Movec,
    Movem,
    Movep,
    Moveq,
    Moves,
    Muls,
    Mulu,
    /// Long multiply; renders as `muls` or `mulu`.
    Mull,
    Nbcd,
    Neg,
    Negx,
    Nop,
    Not,
    Or,
    Ori,
    OriCcr,
    OriSr,
    Pack,
    Pea,
    Reset,
    Rol,
    Ror,
    Roxl,
    Roxr,
    Rtd,
    Rte,
    Rtm,
    Rtr,
    Rts,
    Sbcd,
    Scc,
    Stop,
    Sub,
    Suba,
    Subi,
    Subq,
    Subx,
    Swap,
    Tas,
    Trap,
    Trapcc,
    Trapv,
    Tst,
    Unlk,
    Unpk,
    /// Slot not claimed by any instruction.
    Undefined,
    LineA,
    LineF,
}

impl Operation {
    pub fn mnemonic(self) -> &'static str {
        use Operation::*;
        match self {
            Abcd => "abcd",
            Add => "add",
            Adda => "adda",
            Addi => "addi",
            Addq => "addq",
            Addx => "addx",
            And => "and",
            Andi | AndiCcr | AndiSr => "andi",
            Asl => "asl",
            Asr => "asr",
            Bcc => "b",
            Bchg => "bchg",
            Bclr => "bclr",
            Bfchg => "bfchg",
            Bfclr => "bfclr",
            Bfexts => "bfexts",
            Bfextu => "bfextu",
            Bfffo => "bfffo",
            Bfins => "bfins",
            Bfset => "bfset",
            Bftst => "bftst",
            Bkpt => "bkpt",
            Bra => "bra",
            Bset => "bset",
            Bsr => "bsr",
            Btst => "btst",
            Callm => "callm",
            Cas => "cas",
            Cas2 => "cas2",
            Chk => "chk",
            Chk2 => "chk2",
            Clr => "clr",
            Cmp => "cmp",
            Cmp2 => "cmp2",
            Cmpa => "cmpa",
            Cmpi => "cmpi",
            Cmpm => "cmpm",
            CpGen => "cpgen",
            CpBcc => "b",
            CpDbcc => "db",
            CpScc => "s",
            CpTrapcc => "trap",
            CpSave => "save",
            CpRestore => "restore",
            Dbcc => "db",
            Divs => "divs",
            Divsl => "divsl",
            Divu => "divu",
            Divul => "divul",
            Divl => "divl",
            Eor => "eor",
            Eori | EoriCcr | EoriSr => "eori",
            Exg => "exg",
            Ext => "ext",
            Extb => "extb",
            Illegal => "illegal",
            Jmp => "jmp",
            Jsr => "jsr",
            Lea => "lea",
            Link => "link",
            Lsl => "lsl",
            Lsr => "lsr",
            Move | MoveFromCcr | MoveToCcr | MoveFromSr | MoveToSr | MoveUsp => "move",
            Movea => "movea",
            Movec => "movec",
            Movem => "movem",
            Movep => "movep",
            Moveq => "moveq",
            Moves => "moves",
            Muls => "muls",
            Mulu => "mulu",
            Mull => "mull",
            Nbcd => "nbcd",
            Neg => "neg",
            Negx => "negx",
            Nop => "nop",
            Not => "not",
            Or => "or",
            Ori | OriCcr | OriSr => "ori",
            Pack => "pack",
            Pea => "pea",
            Reset => "reset",
            Rol => "rol",
            Ror => "ror",
            Roxl => "roxl",
            Roxr => "roxr",
            Rtd => "rtd",
            Rte => "rte",
            Rtm => "rtm",
            Rtr => "rtr",
            Rts => "rts",
            Sbcd => "sbcd",
            Scc => "s",
            Stop => "stop",
            Sub => "sub",
            Suba => "suba",
            Subi => "subi",
            Subq => "subq",
            Subx => "subx",
            Swap => "swap",
            Tas => "tas",
            Trap => "trap",
            Trapcc => "trap",
            Trapv => "trapv",
            Tst => "tst",
            Unlk => "unlk",
            Unpk => "unpk",
            Undefined | LineA | LineF => "dc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    DataDirect,     // Dn          b000 reg
    AddrDirect,     // An          b001 reg
    Indirect,       // (An)        b010 reg
    PostIncrement,  // (An)+       b011 reg
    PreDecrement,   // -(An)       b100 reg
    Displacement,   // (d16,An)    b101 reg
    Indexed,        // (d8,An,Xn)  b110 reg
    AbsoluteShort,  // (xxx).w     b111 b000
    AbsoluteLong,   // (xxx).l     b111 b001
    PcDisplacement, // (d16,PC)    b111 b010
    PcIndexed,      // (d8,PC,Xn)  b111 b011
    Immediate,      // #imm        b111 b100
    /// No effective address operand.
    Implied,
}

impl AddressingMode {
    pub const ALL: [AddressingMode; 12] = [
        AddressingMode::DataDirect,
        AddressingMode::AddrDirect,
        AddressingMode::Indirect,
        AddressingMode::PostIncrement,
        AddressingMode::PreDecrement,
        AddressingMode::Displacement,
        AddressingMode::Indexed,
        AddressingMode::AbsoluteShort,
        AddressingMode::AbsoluteLong,
        AddressingMode::PcDisplacement,
        AddressingMode::PcIndexed,
        AddressingMode::Immediate,
    ];

    pub fn from_bits(mode: u8, reg: u8) -> Option<Self> {
        match (mode, reg) {
            (0b000, _) => Some(Self::DataDirect),
            (0b001, _) => Some(Self::AddrDirect),
            (0b010, _) => Some(Self::Indirect),
            (0b011, _) => Some(Self::PostIncrement),
            (0b100, _) => Some(Self::PreDecrement),
            (0b101, _) => Some(Self::Displacement),
            (0b110, _) => Some(Self::Indexed),
            (0b111, 0b000) => Some(Self::AbsoluteShort),
            (0b111, 0b001) => Some(Self::AbsoluteLong),
            (0b111, 0b010) => Some(Self::PcDisplacement),
            (0b111, 0b011) => Some(Self::PcIndexed),
            (0b111, 0b100) => Some(Self::Immediate),
            _ => None,
        }
    }

    /// Mode field, and the register field when the mode fixes it.
    pub fn encoding(self) -> (u8, Option<u8>) {
        match self {
            Self::DataDirect => (0b000, None),
            Self::AddrDirect => (0b001, None),
            Self::Indirect => (0b010, None),
            Self::PostIncrement => (0b011, None),
            Self::PreDecrement => (0b100, None),
            Self::Displacement => (0b101, None),
            Self::Indexed => (0b110, None),
            Self::AbsoluteShort => (0b111, Some(0b000)),
            Self::AbsoluteLong => (0b111, Some(0b001)),
            Self::PcDisplacement => (0b111, Some(0b010)),
            Self::PcIndexed => (0b111, Some(0b011)),
            Self::Immediate => (0b111, Some(0b100)),
            Self::Implied => (0, Some(0)),
        }
    }

    pub fn is_pc_relative(self) -> bool {
        matches!(self, Self::PcDisplacement | Self::PcIndexed)
    }

    pub fn is_indexed(self) -> bool {
        matches!(self, Self::Indexed | Self::PcIndexed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Size {
    Byte, // .b
    Word, // .w
    Long, // .l
}

impl Size {
    pub fn bytes(self) -> u32 {
        match self {
            Size::Byte => 1,
            Size::Word => 2,
            Size::Long => 4,
        }
    }

    pub fn mask(self) -> u32 {
        match self {
            Size::Byte => 0xFF,
            Size::Word => 0xFFFF,
            Size::Long => 0xFFFF_FFFF,
        }
    }

    pub fn sign_extend(self, value: u32) -> i32 {
        match self {
            Size::Byte => value as u8 as i8 as i32,
            Size::Word => value as u16 as i16 as i32,
            Size::Long => value as i32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    True,           // T   b0000
    False,          // F   b0001
    Higher,         // HI  b0010
    LowerOrSame,    // LS  b0011
    CarryClear,     // CC  b0100
    CarrySet,       // CS  b0101
    NotEqual,       // NE  b0110
    Equal,          // EQ  b0111
    OverflowClear,  // VC  b1000
    OverflowSet,    // VS  b1001
    Plus,           // PL  b1010
    Minus,          // MI  b1011
    GreaterOrEqual, // GE  b1100
    LessThan,       // LT  b1101
    GreaterThan,    // GT  b1110
    LessOrEqual,    // LE  b1111
}

impl Condition {
    pub fn name(self) -> &'static str {
        match self {
            Condition::True => "t",
            Condition::False => "f",
            Condition::Higher => "hi",
            Condition::LowerOrSame => "ls",
            Condition::CarryClear => "cc",
            Condition::CarrySet => "cs",
            Condition::NotEqual => "ne",
            Condition::Equal => "eq",
            Condition::OverflowClear => "vc",
            Condition::OverflowSet => "vs",
            Condition::Plus => "pl",
            Condition::Minus => "mi",
            Condition::GreaterOrEqual => "ge",
            Condition::LessThan => "lt",
            Condition::GreaterThan => "gt",
            Condition::LessOrEqual => "le",
        }
    }
}

impl From<u8> for Condition {
    fn from(value: u8) -> Self {
        match value & 0xF {
            0b0000 => Self::True,
            0b0001 => Self::False,
            0b0010 => Self::Higher,
            0b0011 => Self::LowerOrSame,
            0b0100 => Self::CarryClear,
            0b0101 => Self::CarrySet,
            0b0110 => Self::NotEqual,
            0b0111 => Self::Equal,
            0b1000 => Self::OverflowClear,
            0b1001 => Self::OverflowSet,
            0b1010 => Self::Plus,
            0b1011 => Self::Minus,
            0b1100 => Self::GreaterOrEqual,
            0b1101 => Self::LessThan,
            0b1110 => Self::GreaterThan,
            _ => Self::LessOrEqual,
        }
    }
}

/// Coprocessor condition names, indexed by the six-bit predicate field.
/// Codes past `st` are reserved.
const CP_CONDITIONS: [&str; 32] = [
    "f", "eq", "ogt", "oge", "olt", "ole", "ogl", "or", "un", "ueq", "ugt", "uge", "ult", "ule",
    "ne", "t", "sf", "seq", "gt", "ge", "lt", "le", "gl", "gle", "ngle", "ngl", "nle", "nlt",
    "nge", "ngt", "sne", "st",
];

pub fn cp_condition_name(code: u8) -> &'static str {
    CP_CONDITIONS.get(code as usize).copied().unwrap_or("?")
}

/// Earliest CPU an instruction form exists on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Availability {
    /// 68010 and later.
    M68010,
    /// 68020 and later.
    M68020,
    /// 68020 only.
    M68020Only,
    /// 68020 and 68030 with an attached coprocessor.
    M68020Coprocessor,
}

impl Availability {
    pub fn tag(self) -> &'static str {
        match self {
            Availability::M68010 => "(1+)",
            Availability::M68020 => "(2+)",
            Availability::M68020Only => "(2)",
            Availability::M68020Coprocessor => "(2-3)",
        }
    }
}

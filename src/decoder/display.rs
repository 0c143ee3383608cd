use std::fmt::{self, Write};

use arrayvec::ArrayVec;

use super::{
    AddressingMode, Availability, Condition, Ea, Indirection, Operation, Size, cp_condition_name,
    sink::OutputSink,
};
use crate::config::{Dialect, NumberFormat, Radix};

pub const MAX_TOKENS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitFieldArg {
    Imm(u8),
    Dn(u8),
}

/// Dialect-neutral pieces of a decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Mnemonic(Operation),
    /// Bcc, Scc, DBcc and TRAPcc with their condition.
    Conditional(Operation, Condition),
    /// Coprocessor id written in front of the mnemonic.
    Coprocessor(u8),
    /// cpBcc, cpScc, cpDBcc and cpTRAPcc with their six-bit predicate.
    CpConditional(Operation, u8),
    Size(Size),
    /// A size the instruction fixes. Only the vda68k dialects print it.
    ImpliedSize(Size),
    Tab,
    Sep,
    Dn(u8),
    An(u8),
    /// D0-D7 as 0-7, A0-A7 as 8-15.
    Rn(u8),
    Ccr,
    Sr,
    Usp,
    Control(u16),
    /// Signed when printed in decimal.
    Imm(u32, Size),
    ImmUnsigned(u32, Size),
    /// Small constant printed in decimal in every radix.
    Count(u8),
    Address(u32),
    Ea(Ea),
    RegList(u16),
    /// Dh:Dl of a 64-bit multiply or divide.
    RegPair(u8, u8),
    /// Compare or update operands of CAS2.
    CasPair(u8, u8),
    /// Memory operands of CAS2.
    IndirectPair(u8, u8),
    BitField {
        offset: BitFieldArg,
        width: BitFieldArg,
    },
    /// Raw opcode word of an unassigned slot.
    Data(u16),
    LineTrap(u16),
    Comment(&'static str),
    Availability(Availability),
    /// Branch target and opaque extension word of a conditional
    /// coprocessor instruction.
    CpExtension {
        target: Option<u32>,
        extension: u16,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenList {
    tokens: ArrayVec<Token, MAX_TOKENS>,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Panics when full. No routine emits more than [`MAX_TOKENS`].
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Renders `tokens` in `dialect` into `sink`.
pub fn render(tokens: &[Token], dialect: Dialect, nf: NumberFormat, sink: &mut OutputSink) {
    let syntax = syntax(dialect);
    let mut w = Writer {
        sink,
        nf,
        upper: syntax.upper_case(),
    };
    for token in tokens {
        if syntax.token(&mut w, token).is_err() {
            break;
        }
    }
}

/// The rendering strategy of a dialect.
pub(crate) fn syntax(dialect: Dialect) -> &'static dyn Syntax {
    match dialect {
        Dialect::Native => &Native,
        Dialect::ReferenceCompatible => &Musashi,
        Dialect::MotorolaSyntax => &Motorola,
        Dialect::MitSyntax => &Mit,
    }
}

fn write_unsigned(out: &mut impl Write, nf: NumberFormat, value: u32) -> fmt::Result {
    if value == 0 && nf.plain_zero {
        return out.write_str("0");
    }
    match nf.radix {
        Radix::Decimal => write!(out, "{}{value}", nf.prefix),
        Radix::Hexadecimal if nf.upper_case => write!(out, "{}{value:X}", nf.prefix),
        Radix::Hexadecimal => write!(out, "{}{value:x}", nf.prefix),
    }
}

fn write_signed(out: &mut impl Write, nf: NumberFormat, value: i32) -> fmt::Result {
    if value < 0 {
        out.write_char('-')?;
    }
    write_unsigned(out, nf, value.unsigned_abs())
}

fn write_register_list(out: &mut impl Write, mask: u16, upper: bool) -> fmt::Result {
    if mask == 0 {
        return out.write_str("#0");
    }
    let groups = [
        (mask & 0xFF, if upper { 'D' } else { 'd' }),
        (mask >> 8, if upper { 'A' } else { 'a' }),
    ];
    let mut first = true;
    for (group, prefix) in groups {
        let mut i = 0u32;
        while i < 8 {
            if group & (1 << i) == 0 {
                i += 1;
                continue;
            }
            let start = i;
            while i < 7 && group & (1 << (i + 1)) != 0 {
                i += 1;
            }
            if !first {
                out.write_char('/')?;
            }
            first = false;
            write!(out, "{prefix}{start}")?;
            if i > start {
                write!(out, "-{prefix}{i}")?;
            }
            i += 1;
        }
    }
    Ok(())
}

/// Formats a MOVEM mask (bit 0 = D0, bit 15 = A7) as `D0-D3/A0`, or `#0`
/// when no register is selected.
pub fn format_register_list(mask: u16, dialect: Dialect) -> String {
    let mut out = String::new();
    let _ = write_register_list(&mut out, mask, syntax(dialect).upper_case());
    out
}

fn parse_register(text: &str) -> Option<u8> {
    let text = text.trim().to_ascii_lowercase();
    if text == "sp" {
        return Some(15);
    }
    let (kind, number) = text.split_at_checked(1)?;
    let n = number.parse::<u8>().ok().filter(|n| *n < 8)?;
    match kind {
        "d" => Some(n),
        "a" => Some(n + 8),
        _ => None,
    }
}

/// Inverse of [`format_register_list`]. Accepts any case and `sp` for A7.
pub fn parse_register_list(text: &str) -> Option<u16> {
    let text = text.trim();
    if text == "#0" {
        return Some(0);
    }
    let mut mask = 0u16;
    for part in text.split('/') {
        let (first, last) = match part.split_once('-') {
            Some((a, b)) => (parse_register(a)?, parse_register(b)?),
            None => {
                let reg = parse_register(part)?;
                (reg, reg)
            }
        };
        if first > last || (first < 8) != (last < 8) {
            return None;
        }
        for reg in first..=last {
            mask |= 1 << reg;
        }
    }
    Some(mask)
}

fn control_register_name(cr: u16) -> Option<&'static str> {
    let name = match cr {
        0x000 => "sfc",
        0x001 => "dfc",
        0x002 => "cacr",
        0x800 => "usp",
        0x801 => "vbr",
        0x802 => "caar",
        0x803 => "msp",
        0x804 => "isp",
        _ => return None,
    };
    Some(name)
}

fn size_letter(size: Size) -> char {
    match size {
        Size::Byte => 'b',
        Size::Word => 'w',
        Size::Long => 'l',
    }
}

/// Dialect-free primitives over one sink.
pub(crate) struct Writer<'s> {
    sink: &'s mut OutputSink,
    nf: NumberFormat,
    upper: bool,
}

impl Write for Writer<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.sink.write_str(s)
    }
}

impl Writer<'_> {
    fn str(&mut self, s: &str) -> fmt::Result {
        self.sink.write_str(s)
    }

    /// Register and special-register names, upper-cased where the dialect
    /// wants it.
    fn cased(&mut self, lower: &str) -> fmt::Result {
        if self.upper {
            for c in lower.chars() {
                self.sink.write_char(c.to_ascii_uppercase())?;
            }
            Ok(())
        } else {
            self.str(lower)
        }
    }

    fn unsigned(&mut self, value: u32) -> fmt::Result {
        write_unsigned(&mut *self.sink, self.nf, value)
    }

    fn signed(&mut self, value: i32) -> fmt::Result {
        write_signed(&mut *self.sink, self.nf, value)
    }

    fn comment(&mut self, text: &str) -> fmt::Result {
        self.sink.comment_writer().write_str(text)
    }

    fn comment_unsigned(&mut self, value: u32) -> fmt::Result {
        let nf = self.nf;
        write_unsigned(&mut self.sink.comment_writer(), nf, value)
    }

    /// Opcode words are always four hex digits.
    fn word(&mut self, value: u16) -> fmt::Result {
        let prefix = match self.nf.radix {
            Radix::Hexadecimal => self.nf.prefix,
            Radix::Decimal => "$",
        };
        if self.nf.upper_case {
            write!(self.sink, "{prefix}{value:04X}")
        } else {
            write!(self.sink, "{prefix}{value:04x}")
        }
    }

    /// Pads to `column`, with at least one space.
    fn pad_to(&mut self, column: usize) -> fmt::Result {
        let pad = column.saturating_sub(self.sink.column()).max(1);
        write!(self.sink, "{:pad$}", "")
    }

    fn dn(&mut self, reg: u8) -> fmt::Result {
        self.cased("d")?;
        write!(self.sink, "{reg}")
    }

    fn immediate(&mut self, value: u32, size: Size, signed: bool) -> fmt::Result {
        self.sink.write_char('#')?;
        if signed && self.nf.is_decimal() {
            self.signed(size.sign_extend(value))
        } else {
            self.unsigned(value & size.mask())
        }
    }

    fn register_list(&mut self, mask: u16) -> fmt::Result {
        let upper = self.upper;
        write_register_list(&mut *self.sink, mask, upper)
    }

    fn bitfield_arg(&mut self, arg: BitFieldArg) -> fmt::Result {
        match arg {
            BitFieldArg::Imm(n) => write!(self.sink, "{n}"),
            BitFieldArg::Dn(reg) => self.dn(reg),
        }
    }
}

/// How one dialect spells tokens. The defaults are the native syntax;
/// every other dialect overrides what it writes differently.
pub(crate) trait Syntax {
    fn upper_case(&self) -> bool {
        true
    }

    fn tab_column(&self) -> usize {
        8
    }

    fn separator(&self) -> &'static str {
        ", "
    }

    /// Spelling of DBcc with the false condition.
    fn dbf(&self) -> &'static str {
        "dbf"
    }

    fn bitfield_open(&self) -> &'static str {
        " {"
    }

    fn size(&self, w: &mut Writer<'_>, size: Size) -> fmt::Result {
        w.write_char('.')?;
        w.write_char(size_letter(size))
    }

    fn implied_size(&self, _w: &mut Writer<'_>, _size: Size) -> fmt::Result {
        Ok(())
    }

    fn an(&self, w: &mut Writer<'_>, reg: u8) -> fmt::Result {
        w.cased("a")?;
        write!(w, "{reg}")
    }

    fn register_pair(&self, w: &mut Writer<'_>, hi: u8, lo: u8) -> fmt::Result {
        w.dn(hi)?;
        w.str(":")?;
        w.dn(lo)
    }

    fn indirect_pair(&self, w: &mut Writer<'_>, a: u8, b: u8) -> fmt::Result {
        w.str("(")?;
        self.rn(w, a)?;
        w.str("):(")?;
        self.rn(w, b)?;
        w.str(")")
    }

    fn line_trap(&self, w: &mut Writer<'_>, word: u16) -> fmt::Result {
        w.str("dc.w")?;
        self.tab(w)?;
        w.word(word)?;
        w.comment(if word >> 12 == 0xA {
            "; opcode 1010"
        } else {
            "; opcode 1111"
        })
    }

    fn availability(&self, _w: &mut Writer<'_>, _availability: Availability) -> fmt::Result {
        Ok(())
    }

    fn pc_annotation(&self, _w: &mut Writer<'_>, _ea: &Ea) -> fmt::Result {
        Ok(())
    }

    fn cp_extension(
        &self,
        w: &mut Writer<'_>,
        target: Option<u32>,
        extension: u16,
    ) -> fmt::Result {
        cp_extension_comment(w, target, extension)
    }

    fn index(&self, w: &mut Writer<'_>, ea: &Ea) -> fmt::Result {
        index_register(self, w, ea)?;
        w.write_char('.')?;
        w.write_char(size_letter(ea.index_size()))?;
        if ea.scale() > 1 {
            write!(w, "*{}", ea.scale())?;
        }
        Ok(())
    }

    fn ea(&self, w: &mut Writer<'_>, ea: &Ea) -> fmt::Result {
        paren_ea(self, w, ea)
    }

    fn absolute(&self, w: &mut Writer<'_>, addr: u32, size: Size) -> fmt::Result {
        w.unsigned(addr)?;
        self.size(w, size)
    }

    /// Brief extension word: 8-bit displacement and one index register. A
    /// zero displacement is left out.
    fn brief(&self, w: &mut Writer<'_>, ea: &Ea) -> fmt::Result {
        let disp = ea.brief_displacement();
        w.str("(")?;
        if disp != 0 {
            w.signed(disp)?;
            w.str(",")?;
        }
        self.base(w, ea)?;
        w.str(",")?;
        self.index(w, ea)?;
        w.str(")")
    }

    /// Full extension word. Every displacement that is encoded is shown,
    /// zero or not.
    fn full(&self, w: &mut Writer<'_>, ea: &Ea) -> fmt::Result {
        let indirection = ea.indirection();
        let index_inside = indirection != Indirection::PostIndexed && !ea.index_suppressed();

        w.str("(")?;
        if indirection != Indirection::None {
            w.str("[")?;
        }

        let mut empty = true;
        if ea.dw > 0 {
            w.signed(ea.ext2)?;
            empty = false;
        }
        if !ea.base_suppressed() {
            if !empty {
                w.str(",")?;
            }
            self.base(w, ea)?;
            empty = false;
        }
        if index_inside {
            if !empty {
                w.str(",")?;
            }
            self.index(w, ea)?;
            empty = false;
        }
        if empty {
            w.str("0")?;
        }

        if indirection != Indirection::None {
            w.str("]")?;
            if indirection == Indirection::PostIndexed && !ea.index_suppressed() {
                w.str(",")?;
                self.index(w, ea)?;
            }
            if ea.ow > 0 {
                w.str(",")?;
                w.signed(ea.ext3)?;
            }
        }
        w.str(")")
    }

    fn rn(&self, w: &mut Writer<'_>, reg: u8) -> fmt::Result {
        if reg < 8 {
            w.dn(reg)
        } else {
            self.an(w, reg & 7)
        }
    }

    /// `A0` or `PC`, whichever the mode is based on.
    fn base(&self, w: &mut Writer<'_>, ea: &Ea) -> fmt::Result {
        if ea.mode.is_pc_relative() {
            w.cased("pc")
        } else {
            self.an(w, ea.reg)
        }
    }

    fn tab(&self, w: &mut Writer<'_>) -> fmt::Result {
        w.pad_to(self.tab_column())
    }

    fn token(&self, w: &mut Writer<'_>, token: &Token) -> fmt::Result {
        match *token {
            Token::Mnemonic(op) => w.str(op.mnemonic()),
            Token::Conditional(Operation::Dbcc, Condition::False) => w.str(self.dbf()),
            Token::Conditional(op, cond) => {
                w.str(op.mnemonic())?;
                w.str(cond.name())
            }
            Token::Coprocessor(id) => write!(w, "{id}"),
            Token::CpConditional(op, predicate) => {
                w.str(op.mnemonic())?;
                w.str(cp_condition_name(predicate))
            }
            Token::Size(size) => self.size(w, size),
            Token::ImpliedSize(size) => self.implied_size(w, size),
            Token::Tab => self.tab(w),
            Token::Sep => w.str(self.separator()),
            Token::Dn(reg) => w.dn(reg),
            Token::An(reg) => self.an(w, reg),
            Token::Rn(reg) => self.rn(w, reg),
            Token::Ccr => w.cased("ccr"),
            Token::Sr => w.cased("sr"),
            Token::Usp => w.cased("usp"),
            Token::Control(cr) => match control_register_name(cr) {
                Some(name) => w.cased(name),
                None => w.unsigned(cr as u32),
            },
            Token::Imm(value, size) => w.immediate(value, size, true),
            Token::ImmUnsigned(value, size) => w.immediate(value, size, false),
            Token::Count(n) => write!(w, "#{n}"),
            Token::Address(addr) => w.unsigned(addr),
            Token::Ea(ref ea) => self.ea(w, ea),
            Token::RegList(mask) => w.register_list(mask),
            Token::RegPair(hi, lo) => self.register_pair(w, hi, lo),
            Token::CasPair(a, b) => {
                w.dn(a)?;
                w.str(":")?;
                w.dn(b)
            }
            Token::IndirectPair(a, b) => self.indirect_pair(w, a, b),
            Token::BitField { offset, width } => {
                w.str(self.bitfield_open())?;
                w.bitfield_arg(offset)?;
                w.str(":")?;
                w.bitfield_arg(width)?;
                w.str("}")
            }
            Token::Data(word) => {
                w.str("dc.w ")?;
                w.word(word)
            }
            Token::LineTrap(word) => self.line_trap(w, word),
            Token::Comment(text) => w.comment(text),
            Token::Availability(availability) => self.availability(w, availability),
            Token::CpExtension { target, extension } => self.cp_extension(w, target, extension),
        }
    }
}

fn index_register<S: Syntax + ?Sized>(s: &S, w: &mut Writer<'_>, ea: &Ea) -> fmt::Result {
    if ea.index_is_address() {
        s.an(w, ea.index_reg())
    } else {
        w.dn(ea.index_reg())
    }
}

/// Operands in parenthesised Motorola notation.
fn paren_ea<S: Syntax + ?Sized>(s: &S, w: &mut Writer<'_>, ea: &Ea) -> fmt::Result {
    use AddressingMode::*;

    match ea.mode {
        DataDirect => w.dn(ea.reg),
        AddrDirect => s.an(w, ea.reg),
        Indirect => {
            w.str("(")?;
            s.an(w, ea.reg)?;
            w.str(")")
        }
        PostIncrement => {
            w.str("(")?;
            s.an(w, ea.reg)?;
            w.str(")+")
        }
        PreDecrement => {
            w.str("-(")?;
            s.an(w, ea.reg)?;
            w.str(")")
        }
        Displacement | PcDisplacement => {
            w.str("(")?;
            w.signed(ea.displacement())?;
            w.str(",")?;
            s.base(w, ea)?;
            w.str(")")?;
            if ea.mode == PcDisplacement {
                s.pc_annotation(w, ea)?;
            }
            Ok(())
        }
        Indexed | PcIndexed if ea.is_full_format() => s.full(w, ea),
        Indexed | PcIndexed => {
            s.brief(w, ea)?;
            if ea.mode == PcIndexed {
                s.pc_annotation(w, ea)?;
            }
            Ok(())
        }
        AbsoluteShort => s.absolute(w, ea.short_address(), Size::Word),
        AbsoluteLong => s.absolute(w, ea.ext1, Size::Long),
        Immediate => w.immediate(ea.ext1, ea.size, true),
        Implied => Ok(()),
    }
}

/// Suppressed base registers print with a `z` prefix.
fn suppressible_base<S: Syntax + ?Sized>(s: &S, w: &mut Writer<'_>, ea: &Ea) -> fmt::Result {
    if ea.base_suppressed() {
        w.str("z")?;
    }
    s.base(w, ea)
}

/// `; $1010 (extension = $1)`, the target only for branches.
fn cp_extension_comment(w: &mut Writer<'_>, target: Option<u32>, extension: u16) -> fmt::Result {
    w.comment("; ")?;
    if let Some(target) = target {
        w.comment_unsigned(target)?;
        w.comment(" ")?;
    }
    w.comment("(extension = ")?;
    w.comment_unsigned(extension as u32)?;
    w.comment(")")
}

fn vda_an(w: &mut Writer<'_>, reg: u8) -> fmt::Result {
    if reg == 7 {
        w.str("sp")
    } else {
        write!(w, "a{reg}")
    }
}

fn vda_line_trap(w: &mut Writer<'_>, word: u16) -> fmt::Result {
    w.str(if word >> 12 == 0xA { "linea" } else { "linef" })
}

/// Moira's own syntax.
pub(crate) struct Native;

impl Syntax for Native {}

/// Musashi's output, including the way it reads full extension words.
pub(crate) struct Musashi;

impl Syntax for Musashi {
    fn dbf(&self) -> &'static str {
        "dbra"
    }

    fn availability(&self, w: &mut Writer<'_>, availability: Availability) -> fmt::Result {
        w.comment("; ")?;
        w.comment(availability.tag())
    }

    fn pc_annotation(&self, w: &mut Writer<'_>, ea: &Ea) -> fmt::Result {
        w.comment("; (")?;
        w.comment_unsigned(ea.pc_target())?;
        w.comment(")")
    }

    fn cp_extension(
        &self,
        w: &mut Writer<'_>,
        target: Option<u32>,
        extension: u16,
    ) -> fmt::Result {
        cp_extension_comment(w, target, extension)?;
        w.comment(" ")?;
        w.comment(Availability::M68020Coprocessor.tag())
    }

    /// Zero displacements vanish and a fully suppressed operand collapses
    /// to `0`.
    fn full(&self, w: &mut Writer<'_>, ea: &Ea) -> fmt::Result {
        if ea.is_effective_zero() {
            return w.str("0");
        }
        let pre = ea.indirection() == Indirection::PreIndexed;
        let post = ea.indirection() == Indirection::PostIndexed;

        w.str("(")?;
        if pre || post {
            w.str("[")?;
        }
        let mut comma = false;
        if ea.ext2 != 0 {
            w.signed(ea.ext2)?;
            comma = true;
        }
        if !ea.base_suppressed() {
            if comma {
                w.str(",")?;
            }
            self.base(w, ea)?;
            comma = true;
        }
        if post {
            w.str("]")?;
            comma = true;
        }
        if !ea.index_suppressed() {
            if comma {
                w.str(",")?;
            }
            self.index(w, ea)?;
            comma = true;
        }
        if pre {
            w.str("]")?;
            comma = true;
        }
        if ea.ext3 != 0 {
            if comma {
                w.str(",")?;
            }
            w.signed(ea.ext3)?;
        }
        w.str(")")
    }
}

/// vda68k in Motorola notation.
pub(crate) struct Motorola;

impl Syntax for Motorola {
    fn upper_case(&self) -> bool {
        false
    }

    fn tab_column(&self) -> usize {
        10
    }

    fn separator(&self) -> &'static str {
        ","
    }

    fn dbf(&self) -> &'static str {
        "dbra"
    }

    fn bitfield_open(&self) -> &'static str {
        "{"
    }

    fn implied_size(&self, w: &mut Writer<'_>, size: Size) -> fmt::Result {
        self.size(w, size)
    }

    fn an(&self, w: &mut Writer<'_>, reg: u8) -> fmt::Result {
        vda_an(w, reg)
    }

    fn line_trap(&self, w: &mut Writer<'_>, word: u16) -> fmt::Result {
        vda_line_trap(w, word)
    }

    fn absolute(&self, w: &mut Writer<'_>, addr: u32, size: Size) -> fmt::Result {
        w.str("(")?;
        w.unsigned(addr)?;
        w.str(")")?;
        self.size(w, size)
    }

    fn brief(&self, w: &mut Writer<'_>, ea: &Ea) -> fmt::Result {
        w.str("(")?;
        w.signed(ea.brief_displacement())?;
        w.str(",")?;
        self.base(w, ea)?;
        w.str(",")?;
        self.index(w, ea)?;
        w.str(")")
    }

    /// The base displacement is always shown, and so is the outer one of a
    /// memory-indirect operand.
    fn full(&self, w: &mut Writer<'_>, ea: &Ea) -> fmt::Result {
        let indirection = ea.indirection();

        w.str("(")?;
        if indirection != Indirection::None {
            w.str("[")?;
        }
        w.signed(ea.ext2)?;
        w.str(",")?;
        suppressible_base(self, w, ea)?;
        if indirection != Indirection::PostIndexed && !ea.index_suppressed() {
            w.str(",")?;
            self.index(w, ea)?;
        }
        if indirection != Indirection::None {
            w.str("]")?;
            if indirection == Indirection::PostIndexed && !ea.index_suppressed() {
                w.str(",")?;
                self.index(w, ea)?;
            }
            w.str(",")?;
            w.signed(ea.ext3)?;
        }
        w.str(")")
    }
}

/// vda68k in MIT notation.
pub(crate) struct Mit;

impl Syntax for Mit {
    fn upper_case(&self) -> bool {
        false
    }

    fn tab_column(&self) -> usize {
        10
    }

    fn separator(&self) -> &'static str {
        ","
    }

    fn dbf(&self) -> &'static str {
        "dbra"
    }

    fn bitfield_open(&self) -> &'static str {
        "{"
    }

    fn size(&self, w: &mut Writer<'_>, size: Size) -> fmt::Result {
        w.write_char(size_letter(size))
    }

    fn implied_size(&self, w: &mut Writer<'_>, size: Size) -> fmt::Result {
        self.size(w, size)
    }

    fn an(&self, w: &mut Writer<'_>, reg: u8) -> fmt::Result {
        vda_an(w, reg)
    }

    fn register_pair(&self, w: &mut Writer<'_>, hi: u8, lo: u8) -> fmt::Result {
        w.dn(hi)?;
        w.str(",")?;
        w.dn(lo)
    }

    fn indirect_pair(&self, w: &mut Writer<'_>, a: u8, b: u8) -> fmt::Result {
        self.rn(w, a)?;
        w.str("@:")?;
        self.rn(w, b)?;
        w.str("@")
    }

    fn line_trap(&self, w: &mut Writer<'_>, word: u16) -> fmt::Result {
        vda_line_trap(w, word)
    }

    fn index(&self, w: &mut Writer<'_>, ea: &Ea) -> fmt::Result {
        index_register(self, w, ea)?;
        w.write_char(':')?;
        w.write_char(size_letter(ea.index_size()))?;
        if ea.scale() > 1 {
            write!(w, ":{}", ea.scale())?;
        }
        Ok(())
    }

    fn ea(&self, w: &mut Writer<'_>, ea: &Ea) -> fmt::Result {
        match ea.mode {
            AddressingMode::Indirect => {
                self.an(w, ea.reg)?;
                w.str("@")
            }
            AddressingMode::PostIncrement => {
                self.an(w, ea.reg)?;
                w.str("@+")
            }
            AddressingMode::PreDecrement => {
                self.an(w, ea.reg)?;
                w.str("@-")
            }
            AddressingMode::Displacement | AddressingMode::PcDisplacement => {
                self.base(w, ea)?;
                w.str("@(")?;
                w.signed(ea.displacement())?;
                w.str(")")
            }
            _ => paren_ea(self, w, ea),
        }
    }

    fn absolute(&self, w: &mut Writer<'_>, addr: u32, size: Size) -> fmt::Result {
        w.unsigned(addr)?;
        w.str(":")?;
        self.size(w, size)
    }

    fn brief(&self, w: &mut Writer<'_>, ea: &Ea) -> fmt::Result {
        self.base(w, ea)?;
        w.str("@(")?;
        w.signed(ea.brief_displacement())?;
        w.str(",")?;
        self.index(w, ea)?;
        w.str(")")
    }

    fn full(&self, w: &mut Writer<'_>, ea: &Ea) -> fmt::Result {
        let indirection = ea.indirection();

        suppressible_base(self, w, ea)?;
        w.str("@(")?;
        w.signed(ea.ext2)?;
        if indirection != Indirection::PostIndexed && !ea.index_suppressed() {
            w.str(",")?;
            self.index(w, ea)?;
        }
        w.str(")")?;

        if indirection != Indirection::None {
            w.str("@(")?;
            w.signed(ea.ext3)?;
            if indirection == Indirection::PostIndexed && !ea.index_suppressed() {
                w.str(",")?;
                self.index(w, ea)?;
            }
            w.str(")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::AddressingMode;

    fn render_one(token: Token, dialect: Dialect, nf: NumberFormat) -> String {
        let mut sink = OutputSink::new();
        render(&[token], dialect, nf, &mut sink);
        sink.text()
    }

    fn indexed(ext: u16, bd: i32, od: i32, dw: u8, ow: u8) -> Ea {
        Ea {
            ext1: ext as u32,
            ext2: bd,
            ext3: od,
            dw,
            ow,
            ..Ea::register(AddressingMode::Indexed, 0)
        }
    }

    #[test]
    fn register_lists_compress_runs() {
        assert_eq!(format_register_list(0x000F, Dialect::Native), "D0-D3");
        assert_eq!(format_register_list(0x0103, Dialect::Native), "D0-D1/A0");
        assert_eq!(format_register_list(0x8055, Dialect::MitSyntax), "d0/d2/d4/d6/a7");
        assert_eq!(format_register_list(0, Dialect::MotorolaSyntax), "#0");
    }

    #[test]
    fn register_lists_parse() {
        assert_eq!(parse_register_list("D0-D3/A0"), Some(0x010F));
        assert_eq!(parse_register_list("a7/sp"), Some(0x8000));
        assert_eq!(parse_register_list("#0"), Some(0));
        assert_eq!(parse_register_list("d3-d1"), None);
        assert_eq!(parse_register_list("d0-a1"), None);
        assert_eq!(parse_register_list("x1"), None);
        assert_eq!(parse_register_list(""), None);
    }

    #[test]
    fn immediates_follow_the_number_format() {
        let imm = Token::Imm(0xFF, Size::Byte);
        assert_eq!(render_one(imm, Dialect::Native, NumberFormat::hex()), "#$ff");
        assert_eq!(render_one(imm, Dialect::Native, NumberFormat::c_hex()), "#0xff");
        assert_eq!(render_one(imm, Dialect::Native, NumberFormat::decimal()), "#-1");

        let imm = Token::ImmUnsigned(0xFF, Size::Byte);
        assert_eq!(render_one(imm, Dialect::Native, NumberFormat::decimal()), "#255");
    }

    #[test]
    fn displacements_are_signed() {
        let ea = Ea {
            ext1: 0xFFF0,
            ..Ea::register(AddressingMode::Displacement, 2)
        };
        let nf = NumberFormat::hex();
        assert_eq!(render_one(Token::Ea(ea), Dialect::Native, nf), "(-$10,A2)");
        assert_eq!(render_one(Token::Ea(ea), Dialect::MitSyntax, nf), "a2@(-$10)");
    }

    #[test]
    fn musashi_collapses_effective_zero() {
        // Base and index suppressed, no displacement, no indirection.
        let ea = indexed(0x01D0, 0, 0, 0, 0);
        assert!(ea.is_effective_zero());
        let nf = NumberFormat::hex();
        assert_eq!(render_one(Token::Ea(ea), Dialect::ReferenceCompatible, nf), "0");
        assert_eq!(render_one(Token::Ea(ea), Dialect::Native, nf), "(0)");
    }

    #[test]
    fn full_format_per_dialect() {
        // ([-$10,A0,D0.w],$20)
        let ea = indexed(0x0133, -0x10, 0x20, 2, 2);
        let nf = NumberFormat::hex();
        let text = |dialect| render_one(Token::Ea(ea), dialect, nf);
        assert_eq!(text(Dialect::Native), "([-$10,A0,D0.w],$20)");
        assert_eq!(text(Dialect::ReferenceCompatible), "([-$10,A0,D0.w],$20)");
        assert_eq!(text(Dialect::MotorolaSyntax), "([-$10,a0,d0.w],$20)");
        assert_eq!(text(Dialect::MitSyntax), "a0@(-$10,d0:w)@($20)");
    }

    #[test]
    fn annotations_only_in_reference_dialect() {
        let nf = NumberFormat::hex();
        let tag = Token::Availability(Availability::M68020);
        assert_eq!(render_one(tag, Dialect::ReferenceCompatible, nf), "; (2+)");
        assert_eq!(render_one(tag, Dialect::Native, nf), "");

        let ea = Ea {
            pc: 0x1002,
            ext1: 0x0010,
            ..Ea::register(AddressingMode::PcDisplacement, 0)
        };
        assert_eq!(
            render_one(Token::Ea(ea), Dialect::ReferenceCompatible, nf),
            "($10,PC); ($1012)"
        );
        assert_eq!(render_one(Token::Ea(ea), Dialect::MotorolaSyntax, nf), "($10,pc)");
    }
    #[test]
    fn coprocessor_extension_is_annotated() {
        let nf = NumberFormat::hex();
        let branch = Token::CpExtension {
            target: Some(0x1010),
            extension: 0x0001,
        };
        assert_eq!(
            render_one(branch, Dialect::Native, nf),
            "; $1010 (extension = $1)"
        );
        assert_eq!(
            render_one(branch, Dialect::ReferenceCompatible, nf),
            "; $1010 (extension = $1) (2-3)"
        );

        let set = Token::CpExtension {
            target: None,
            extension: 0,
        };
        assert_eq!(render_one(set, Dialect::MitSyntax, nf), "; (extension = $0)");
    }

    #[test]
    fn plain_zero_drops_the_prefix() {
        let nf = NumberFormat::hex().with_plain_zero();
        let imm = |value| Token::ImmUnsigned(value, Size::Word);
        assert_eq!(render_one(imm(0), Dialect::Native, nf), "#0");
        assert_eq!(render_one(imm(0x10), Dialect::Native, nf), "#$10");
        assert_eq!(render_one(imm(0), Dialect::Native, NumberFormat::hex()), "#$0");
    }

    #[test]
    #[should_panic]
    fn token_list_overflow_is_a_defect() {
        let mut list = TokenList::new();
        for _ in 0..=MAX_TOKENS {
            list.push(Token::Sep);
        }
    }
}

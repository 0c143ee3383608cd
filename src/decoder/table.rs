use std::{fmt, sync::LazyLock};

use bitflags::bitflags;
use log::debug;

use super::{AddressingMode, Dasm, Operation, Size, routines as r};

/// Decode routine bound to an opcode slot.
pub(crate) type Routine = fn(&mut Dasm<'_>, u16);

/// What the dispatch table knows about an opcode before any extension word
/// is read.
#[derive(Clone, Copy)]
pub struct Entry {
    pub op: Operation,
    pub mode: AddressingMode,
    pub size: Size,
    pub(crate) routine: Routine,
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("op", &self.op)
            .field("mode", &self.mode)
            .field("size", &self.size)
            .finish()
    }
}

bitflags! {
    /// Sets of addressing modes an instruction accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Modes: u16 {
        const DN = 1 << 0;
        const AN = 1 << 1;
        const AI = 1 << 2;
        const PI = 1 << 3;
        const PD = 1 << 4;
        const DI = 1 << 5;
        const IX = 1 << 6;
        const AW = 1 << 7;
        const AL = 1 << 8;
        const DIPC = 1 << 9;
        const IXPC = 1 << 10;
        const IM = 1 << 11;

        const ALL = 0x0FFF;
        const DATA = Self::ALL.bits() & !Self::AN.bits();
        const MEMORY = Self::DATA.bits() & !Self::DN.bits();
        const CONTROL = Self::AI.bits() | Self::DI.bits() | Self::IX.bits()
            | Self::AW.bits() | Self::AL.bits() | Self::DIPC.bits() | Self::IXPC.bits();
        const ALTERABLE = Self::ALL.bits() & !(Self::DIPC.bits() | Self::IXPC.bits() | Self::IM.bits());
        const DATA_ALTERABLE = Self::ALTERABLE.bits() & !Self::AN.bits();
        const MEMORY_ALTERABLE = Self::DATA_ALTERABLE.bits() & !Self::DN.bits();
        const CONTROL_ALTERABLE = Self::CONTROL.bits() & Self::ALTERABLE.bits();
    }
}

impl Modes {
    fn of(mode: AddressingMode) -> Self {
        match mode {
            AddressingMode::DataDirect => Self::DN,
            AddressingMode::AddrDirect => Self::AN,
            AddressingMode::Indirect => Self::AI,
            AddressingMode::PostIncrement => Self::PI,
            AddressingMode::PreDecrement => Self::PD,
            AddressingMode::Displacement => Self::DI,
            AddressingMode::Indexed => Self::IX,
            AddressingMode::AbsoluteShort => Self::AW,
            AddressingMode::AbsoluteLong => Self::AL,
            AddressingMode::PcDisplacement => Self::DIPC,
            AddressingMode::PcIndexed => Self::IXPC,
            AddressingMode::Immediate => Self::IM,
            AddressingMode::Implied => Self::empty(),
        }
    }

    fn modes(self) -> impl Iterator<Item = AddressingMode> {
        AddressingMode::ALL
            .into_iter()
            .filter(move |m| self.contains(Self::of(*m)))
    }
}

const BWL: &[(Size, u16)] = &[(Size::Byte, 0b00), (Size::Word, 0b01), (Size::Long, 0b10)];
const WL: &[(Size, u16)] = &[(Size::Word, 0), (Size::Long, 1)];
const MOVE_B: &[(Size, u16)] = &[(Size::Byte, 0b01)];
const MOVE_WL: &[(Size, u16)] = &[(Size::Long, 0b10), (Size::Word, 0b11)];
const CAS: &[(Size, u16)] = &[(Size::Byte, 0b01), (Size::Word, 0b10), (Size::Long, 0b11)];
const CAS2: &[(Size, u16)] = &[(Size::Word, 0b10), (Size::Long, 0b11)];
const CHK: &[(Size, u16)] = &[(Size::Word, 0b11), (Size::Long, 0b10)];
const B: &[(Size, u16)] = &[(Size::Byte, 0)];
const WL_ONLY: &[(Size, u16)] = &[(Size::Word, 0b01), (Size::Long, 0b10)];

/// One instruction encoding.
///
/// The pattern has one character per opcode bit, most significant first:
/// `0`/`1` are fixed, `x` is free, `S` holds the size code, `M`/`R` the
/// source mode and register and `m`/`r` the destination mode and register
/// of MOVE.
pub(crate) struct Template {
    pattern: &'static str,
    op: Operation,
    routine: Routine,
    sizes: &'static [(Size, u16)],
    size: Size,
    modes: Modes,
    dst: Modes,
    skip: Option<fn(u16) -> bool>,
}

impl Template {
    fn new(pattern: &'static str, op: Operation, routine: Routine) -> Self {
        Self {
            pattern,
            op,
            routine,
            sizes: &[],
            size: Size::Word,
            modes: Modes::empty(),
            dst: Modes::empty(),
            skip: None,
        }
    }

    fn sizes(mut self, sizes: &'static [(Size, u16)]) -> Self {
        self.sizes = sizes;
        self
    }

    fn size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    fn modes(mut self, modes: Modes) -> Self {
        self.modes = modes;
        self
    }

    fn dst(mut self, modes: Modes) -> Self {
        self.dst = modes;
        self
    }

    fn skip(mut self, skip: fn(u16) -> bool) -> Self {
        self.skip = Some(skip);
        self
    }
}

/// Bit positions of each pattern character class.
#[derive(Default)]
struct Fields {
    fixed_mask: u16,
    fixed_bits: u16,
    free: u16,
    size: u16,
    mode: u16,
    reg: u16,
    dst_mode: u16,
    dst_reg: u16,
}

impl Fields {
    fn parse(pattern: &str) -> Self {
        assert_eq!(pattern.len(), 16, "pattern `{pattern}` is not 16 bits wide");
        let mut fields = Fields::default();
        for (i, c) in pattern.bytes().enumerate() {
            let bit = 1u16 << (15 - i);
            match c {
                b'0' => fields.fixed_mask |= bit,
                b'1' => {
                    fields.fixed_mask |= bit;
                    fields.fixed_bits |= bit;
                }
                b'x' => fields.free |= bit,
                b'S' => fields.size |= bit,
                b'M' => fields.mode |= bit,
                b'R' => fields.reg |= bit,
                b'm' => fields.dst_mode |= bit,
                b'r' => fields.dst_reg |= bit,
                _ => panic!("bad character `{}` in pattern `{pattern}`", c as char),
            }
        }
        fields
    }
}

/// Scatters the low bits of `value` into the set bits of `mask`.
fn deposit(value: u16, mask: u16) -> u16 {
    let mut out = 0;
    let mut value = value;
    let mut mask = mask;
    while mask != 0 {
        let low = mask & mask.wrapping_neg();
        if value & 1 != 0 {
            out |= low;
        }
        value >>= 1;
        mask &= mask - 1;
    }
    out
}

/// Every concrete (mode field | register field) placement of a mode set.
fn placements(modes: Modes, mode_mask: u16, reg_mask: u16) -> Vec<(AddressingMode, u16)> {
    if mode_mask == 0 {
        return vec![(AddressingMode::Implied, 0)];
    }
    let mut out = Vec::new();
    for mode in modes.modes() {
        let (field, fixed_reg) = mode.encoding();
        let bits = deposit(field as u16, mode_mask);
        match fixed_reg {
            Some(reg) => out.push((mode, bits | deposit(reg as u16, reg_mask))),
            None => {
                for reg in 0..8 {
                    out.push((mode, bits | deposit(reg, reg_mask)));
                }
            }
        }
    }
    out
}

/// Maps every opcode to its entry.
pub struct DispatchTable {
    entries: Box<[Option<Entry>]>,
}

impl DispatchTable {
    /// Expands `templates` into a table. Panics if two templates claim the
    /// same opcode, since nothing can be decoded reliably after that.
    pub(crate) fn build(templates: &[Template]) -> Self {
        let mut entries: Vec<Option<Entry>> = vec![None; 0x10000];

        for template in templates {
            let fields = Fields::parse(template.pattern);
            assert!(
                (fields.mode != 0) == !template.modes.is_empty(),
                "pattern `{}` and its mode set disagree",
                template.pattern
            );

            let sizes: &[(Size, u16)] = if fields.size == 0 {
                &[(template.size, 0)]
            } else {
                template.sizes
            };

            let sources = placements(template.modes, fields.mode, fields.reg);
            let dests = placements(template.dst, fields.dst_mode, fields.dst_reg);

            for &(size, code) in sizes {
                let base = fields.fixed_bits | deposit(code, fields.size);
                for &(mode, src) in &sources {
                    for &(_, dst) in &dests {
                        let opcode = base | src | dst;
                        let mut sub: u16 = 0;
                        loop {
                            let op = opcode | sub;
                            if !template.skip.is_some_and(|skip| skip(op)) {
                                let slot = &mut entries[op as usize];
                                if let Some(prev) = slot {
                                    panic!(
                                        "opcode {op:#06x} claimed by both {:?} and {:?}",
                                        prev.op, template.op
                                    );
                                }
                                *slot = Some(Entry {
                                    op: template.op,
                                    mode,
                                    size,
                                    routine: template.routine,
                                });
                            }
                            sub = sub.wrapping_sub(fields.free) & fields.free;
                            if sub == 0 {
                                break;
                            }
                        }
                    }
                }
            }
        }

        let bound = entries.iter().filter(|e| e.is_some()).count();
        debug!(
            "dispatch table built: {} templates, {bound} opcodes bound, {} reserved",
            templates.len(),
            0x10000 - bound
        );

        Self {
            entries: entries.into_boxed_slice(),
        }
    }

    pub fn lookup(&self, opcode: u16) -> Entry {
        self.entries[opcode as usize].unwrap_or_else(|| reserved(opcode))
    }

    pub fn is_bound(&self, opcode: u16) -> bool {
        self.entries[opcode as usize].is_some()
    }
}

fn reserved(opcode: u16) -> Entry {
    let (op, routine): (Operation, Routine) = match opcode >> 12 {
        0xA => (Operation::LineA, r::line_trap),
        0xF => (Operation::LineF, r::line_trap),
        _ => (Operation::Undefined, r::undefined),
    };
    Entry {
        op,
        mode: AddressingMode::Implied,
        size: Size::Word,
        routine,
    }
}

static TABLE: LazyLock<DispatchTable> = LazyLock::new(|| DispatchTable::build(&templates()));

/// Looks up the entry for an opcode. Builds the table on first use.
pub fn lookup(opcode: u16) -> Entry {
    TABLE.lookup(opcode)
}

/// Whether an opcode matches an instruction template, as opposed to falling
/// into the line A, line F or unassigned groups.
pub fn is_assigned(opcode: u16) -> bool {
    TABLE.is_bound(opcode)
}

fn byte_displacement_in_opcode(op: u16) -> bool {
    matches!(op & 0xFF, 0x00 | 0xFF)
}

fn branch_condition(op: u16) -> bool {
    (op >> 8) & 0xF < 2
}

fn byte_branch_condition(op: u16) -> bool {
    branch_condition(op) || byte_displacement_in_opcode(op)
}

fn templates() -> Vec<Template> {
    use Operation::*;
    use Template as T;

    let data = Modes::DATA;
    let all = Modes::ALL;
    let da = Modes::DATA_ALTERABLE;
    let ma = Modes::MEMORY_ALTERABLE;
    let ctl = Modes::CONTROL;
    let ca = Modes::CONTROL_ALTERABLE;
    let byte_src = Modes::ALL - Modes::AN;

    vec![
        // Line 0: immediates, bit operations, MOVEP and the 68020 extras
        T::new("0000000000111100", OriCcr, r::imm_to_ccr).size(Size::Byte),
        T::new("0000000001111100", OriSr, r::imm_to_sr),
        T::new("00000000SSMMMRRR", Ori, r::logic_imm).sizes(BWL).modes(da),
        T::new("0000001000111100", AndiCcr, r::imm_to_ccr).size(Size::Byte),
        T::new("0000001001111100", AndiSr, r::imm_to_sr),
        T::new("00000010SSMMMRRR", Andi, r::logic_imm).sizes(BWL).modes(da),
        T::new("00000100SSMMMRRR", Subi, r::arith_imm).sizes(BWL).modes(da),
        T::new("00000110SSMMMRRR", Addi, r::arith_imm).sizes(BWL).modes(da),
        T::new("0000011011MMMRRR", Callm, r::callm).modes(ctl),
        T::new("000001101100xxxx", Rtm, r::rtm),
        T::new("0000101000111100", EoriCcr, r::imm_to_ccr).size(Size::Byte),
        T::new("0000101001111100", EoriSr, r::imm_to_sr),
        T::new("00001010SSMMMRRR", Eori, r::logic_imm).sizes(BWL).modes(da),
        T::new("00001100SSMMMRRR", Cmpi, r::arith_imm)
            .sizes(BWL)
            .modes(da | Modes::DIPC | Modes::IXPC),
        T::new("0000100000MMMRRR", Btst, r::bit_imm).size(Size::Byte).modes(data - Modes::IM),
        T::new("0000100001MMMRRR", Bchg, r::bit_imm).size(Size::Byte).modes(da),
        T::new("0000100010MMMRRR", Bclr, r::bit_imm).size(Size::Byte).modes(da),
        T::new("0000100011MMMRRR", Bset, r::bit_imm).size(Size::Byte).modes(da),
        T::new("0000xxx100MMMRRR", Btst, r::bit_reg).size(Size::Byte).modes(data),
        T::new("0000xxx101MMMRRR", Bchg, r::bit_reg).size(Size::Byte).modes(da),
        T::new("0000xxx110MMMRRR", Bclr, r::bit_reg).size(Size::Byte).modes(da),
        T::new("0000xxx111MMMRRR", Bset, r::bit_reg).size(Size::Byte).modes(da),
        T::new("0000xxx10S001xxx", Movep, r::movep).sizes(WL),
        T::new("0000xxx11S001xxx", Movep, r::movep).sizes(WL),
        T::new("00001110SSMMMRRR", Moves, r::moves).sizes(BWL).modes(ma),
        T::new("00001SS011MMMRRR", Cas, r::cas).sizes(CAS).modes(ma),
        T::new("00001SS011111100", Cas2, r::cas2).sizes(CAS2),
        T::new("00000SS011MMMRRR", Cmp2, r::chk_cmp2).sizes(BWL).modes(ctl),
        // Lines 1-3: MOVE and MOVEA
        T::new("00SSrrrmmmMMMRRR", Move, r::move_).sizes(MOVE_B).modes(byte_src).dst(da),
        T::new("00SSrrrmmmMMMRRR", Move, r::move_).sizes(MOVE_WL).modes(all).dst(da),
        T::new("00SSxxx001MMMRRR", Movea, r::movea).sizes(MOVE_WL).modes(all),
        // Line 4: miscellaneous
        T::new("01000000SSMMMRRR", Negx, r::unary).sizes(BWL).modes(da),
        T::new("0100000011MMMRRR", MoveFromSr, r::move_from_sr).modes(da),
        T::new("0100xxxSS0MMMRRR", Chk, r::chk).sizes(CHK).modes(data),
        T::new("0100xxx111MMMRRR", Lea, r::lea).size(Size::Long).modes(ctl),
        T::new("01000010SSMMMRRR", Clr, r::unary).sizes(BWL).modes(da),
        T::new("0100001011MMMRRR", MoveFromCcr, r::move_from_ccr).modes(da),
        T::new("01000100SSMMMRRR", Neg, r::unary).sizes(BWL).modes(da),
        T::new("0100010011MMMRRR", MoveToCcr, r::move_to_ccr).modes(data),
        T::new("01000110SSMMMRRR", Not, r::unary).sizes(BWL).modes(da),
        T::new("0100011011MMMRRR", MoveToSr, r::move_to_sr).modes(data),
        T::new("0100100000MMMRRR", Nbcd, r::unary_unsized).size(Size::Byte).modes(da),
        T::new("0100100000001xxx", Link, r::link).size(Size::Long),
        T::new("0100100001000xxx", Swap, r::swap),
        T::new("0100100001001xxx", Bkpt, r::bkpt),
        T::new("0100100001MMMRRR", Pea, r::unary_unsized).size(Size::Long).modes(ctl),
        T::new("0100100010000xxx", Ext, r::ext),
        T::new("0100100011000xxx", Ext, r::ext).size(Size::Long),
        T::new("0100100111000xxx", Extb, r::ext).size(Size::Long),
        T::new("010010001SMMMRRR", Movem, r::movem_to_mem).sizes(WL).modes(ca | Modes::PD),
        T::new("01001010SSMMMRRR", Tst, r::tst).sizes(B).modes(byte_src),
        T::new("01001010SSMMMRRR", Tst, r::tst).sizes(WL_ONLY).modes(all),
        T::new("0100101011MMMRRR", Tas, r::unary_unsized).size(Size::Byte).modes(da),
        T::new("0100101011111100", Illegal, r::implied),
        T::new("0100110000MMMRRR", Mull, r::mull).size(Size::Long).modes(data),
        T::new("0100110001MMMRRR", Divl, r::divl).size(Size::Long).modes(data),
        T::new("010011001SMMMRRR", Movem, r::movem_to_reg).sizes(WL).modes(ctl | Modes::PI),
        T::new("010011100100xxxx", Trap, r::trap),
        T::new("0100111001010xxx", Link, r::link),
        T::new("0100111001011xxx", Unlk, r::unlk),
        T::new("010011100110xxxx", MoveUsp, r::move_usp).size(Size::Long),
        T::new("0100111001110000", Reset, r::implied),
        T::new("0100111001110001", Nop, r::implied),
        T::new("0100111001110010", Stop, r::stop),
        T::new("0100111001110011", Rte, r::implied),
        T::new("0100111001110100", Rtd, r::rtd),
        T::new("0100111001110101", Rts, r::implied),
        T::new("0100111001110110", Trapv, r::implied),
        T::new("0100111001110111", Rtr, r::implied),
        T::new("010011100111101x", Movec, r::movec).size(Size::Long),
        T::new("0100111010MMMRRR", Jsr, r::unary_unsized).modes(ctl),
        T::new("0100111011MMMRRR", Jmp, r::unary_unsized).modes(ctl),
        // Line 5: ADDQ, SUBQ, Scc, DBcc, TRAPcc
        T::new("0101xxx0SSMMMRRR", Addq, r::quick).sizes(B).modes(da),
        T::new("0101xxx0SSMMMRRR", Addq, r::quick)
            .sizes(WL_ONLY)
            .modes(Modes::ALTERABLE),
        T::new("0101xxx1SSMMMRRR", Subq, r::quick).sizes(B).modes(da),
        T::new("0101xxx1SSMMMRRR", Subq, r::quick)
            .sizes(WL_ONLY)
            .modes(Modes::ALTERABLE),
        T::new("0101xxxx11MMMRRR", Scc, r::scc).size(Size::Byte).modes(da),
        T::new("0101xxxx11001xxx", Dbcc, r::dbcc),
        T::new("0101xxxx11111010", Trapcc, r::trapcc),
        T::new("0101xxxx11111011", Trapcc, r::trapcc).size(Size::Long),
        T::new("0101xxxx11111100", Trapcc, r::trapcc_unsized),
        // Line 6: branches
        T::new("0110000000000000", Bra, r::branch),
        T::new("0110000011111111", Bra, r::branch).size(Size::Long),
        T::new("01100000xxxxxxxx", Bra, r::branch)
            .size(Size::Byte)
            .skip(byte_displacement_in_opcode),
        T::new("0110000100000000", Bsr, r::branch),
        T::new("0110000111111111", Bsr, r::branch).size(Size::Long),
        T::new("01100001xxxxxxxx", Bsr, r::branch)
            .size(Size::Byte)
            .skip(byte_displacement_in_opcode),
        T::new("0110xxxx00000000", Bcc, r::branch).skip(branch_condition),
        T::new("0110xxxx11111111", Bcc, r::branch)
            .size(Size::Long)
            .skip(branch_condition),
        T::new("0110xxxxxxxxxxxx", Bcc, r::branch)
            .size(Size::Byte)
            .skip(byte_branch_condition),
        // Line 7
        T::new("0111xxx0xxxxxxxx", Moveq, r::moveq).size(Size::Long),
        // Line 8: OR, DIVU.W, DIVS.W, SBCD, PACK, UNPK
        T::new("1000xxx0SSMMMRRR", Or, r::ea_to_dn).sizes(BWL).modes(data),
        T::new("1000xxx1SSMMMRRR", Or, r::dn_to_ea).sizes(BWL).modes(ma),
        T::new("1000xxx011MMMRRR", Divu, r::muldiv_word).modes(data),
        T::new("1000xxx111MMMRRR", Divs, r::muldiv_word).modes(data),
        T::new("1000xxx10000xxxx", Sbcd, r::extended).size(Size::Byte),
        T::new("1000xxx10100xxxx", Pack, r::pack_unpk),
        T::new("1000xxx11000xxxx", Unpk, r::pack_unpk),
        // Line 9: SUB, SUBA, SUBX
        T::new("1001xxx0SSMMMRRR", Sub, r::ea_to_dn).sizes(B).modes(byte_src),
        T::new("1001xxx0SSMMMRRR", Sub, r::ea_to_dn).sizes(WL_ONLY).modes(all),
        T::new("1001xxx1SSMMMRRR", Sub, r::dn_to_ea).sizes(BWL).modes(ma),
        T::new("1001xxxS11MMMRRR", Suba, r::ea_to_an).sizes(WL).modes(all),
        T::new("1001xxx1SS00xxxx", Subx, r::extended).sizes(BWL),
        // Line B: CMP, CMPA, CMPM, EOR
        T::new("1011xxx0SSMMMRRR", Cmp, r::ea_to_dn).sizes(B).modes(byte_src),
        T::new("1011xxx0SSMMMRRR", Cmp, r::ea_to_dn).sizes(WL_ONLY).modes(all),
        T::new("1011xxxS11MMMRRR", Cmpa, r::ea_to_an).sizes(WL).modes(all),
        T::new("1011xxx1SSMMMRRR", Eor, r::dn_to_ea).sizes(BWL).modes(da),
        T::new("1011xxx1SS001xxx", Cmpm, r::cmpm).sizes(BWL),
        // Line C: AND, MULU.W, MULS.W, ABCD, EXG
        T::new("1100xxx0SSMMMRRR", And, r::ea_to_dn).sizes(BWL).modes(data),
        T::new("1100xxx1SSMMMRRR", And, r::dn_to_ea).sizes(BWL).modes(ma),
        T::new("1100xxx011MMMRRR", Mulu, r::muldiv_word).modes(data),
        T::new("1100xxx111MMMRRR", Muls, r::muldiv_word).modes(data),
        T::new("1100xxx10000xxxx", Abcd, r::extended).size(Size::Byte),
        T::new("1100xxx101000xxx", Exg, r::exg).size(Size::Long),
        T::new("1100xxx101001xxx", Exg, r::exg).size(Size::Long),
        T::new("1100xxx110001xxx", Exg, r::exg).size(Size::Long),
        // Line D: ADD, ADDA, ADDX
        T::new("1101xxx0SSMMMRRR", Add, r::ea_to_dn).sizes(B).modes(byte_src),
        T::new("1101xxx0SSMMMRRR", Add, r::ea_to_dn).sizes(WL_ONLY).modes(all),
        T::new("1101xxx1SSMMMRRR", Add, r::dn_to_ea).sizes(BWL).modes(ma),
        T::new("1101xxxS11MMMRRR", Adda, r::ea_to_an).sizes(WL).modes(all),
        T::new("1101xxx1SS00xxxx", Addx, r::extended).sizes(BWL),
        // Line E: shifts, rotates and bit fields
        T::new("1110xxx0SSx00xxx", Asr, r::shift_reg).sizes(BWL),
        T::new("1110xxx1SSx00xxx", Asl, r::shift_reg).sizes(BWL),
        T::new("1110xxx0SSx01xxx", Lsr, r::shift_reg).sizes(BWL),
        T::new("1110xxx1SSx01xxx", Lsl, r::shift_reg).sizes(BWL),
        T::new("1110xxx0SSx10xxx", Roxr, r::shift_reg).sizes(BWL),
        T::new("1110xxx1SSx10xxx", Roxl, r::shift_reg).sizes(BWL),
        T::new("1110xxx0SSx11xxx", Ror, r::shift_reg).sizes(BWL),
        T::new("1110xxx1SSx11xxx", Rol, r::shift_reg).sizes(BWL),
        T::new("1110000011MMMRRR", Asr, r::shift_mem).modes(ma),
        T::new("1110000111MMMRRR", Asl, r::shift_mem).modes(ma),
        T::new("1110001011MMMRRR", Lsr, r::shift_mem).modes(ma),
        T::new("1110001111MMMRRR", Lsl, r::shift_mem).modes(ma),
        T::new("1110010011MMMRRR", Roxr, r::shift_mem).modes(ma),
        T::new("1110010111MMMRRR", Roxl, r::shift_mem).modes(ma),
        T::new("1110011011MMMRRR", Ror, r::shift_mem).modes(ma),
        T::new("1110011111MMMRRR", Rol, r::shift_mem).modes(ma),
        T::new("1110100011MMMRRR", Bftst, r::bitfield).modes(Modes::DN | ctl),
        T::new("1110100111MMMRRR", Bfextu, r::bitfield).modes(Modes::DN | ctl),
        T::new("1110101011MMMRRR", Bfchg, r::bitfield).modes(Modes::DN | ca),
        T::new("1110101111MMMRRR", Bfexts, r::bitfield).modes(Modes::DN | ctl),
        T::new("1110110011MMMRRR", Bfclr, r::bitfield).modes(Modes::DN | ca),
        T::new("1110110111MMMRRR", Bfffo, r::bitfield).modes(Modes::DN | ctl),
        T::new("1110111011MMMRRR", Bfset, r::bitfield).modes(Modes::DN | ca),
        T::new("1110111111MMMRRR", Bfins, r::bitfield).modes(Modes::DN | ca),
        // Line F: coprocessor interface. Bits 11-9 name the coprocessor.
        T::new("1111xxx000xxxxxx", CpGen, r::cp_gen).size(Size::Long),
        T::new("1111xxx001MMMRRR", CpScc, r::cp_scc).size(Size::Byte).modes(da),
        T::new("1111xxx001001xxx", CpDbcc, r::cp_dbcc),
        T::new("1111xxx00111101x", CpTrapcc, r::cp_trapcc),
        T::new("1111xxx001111100", CpTrapcc, r::cp_trapcc),
        T::new("1111xxx01Sxxxxxx", CpBcc, r::cp_bcc).sizes(WL),
        T::new("1111xxx100MMMRRR", CpSave, r::cp_state).modes(ca | Modes::PD),
        T::new("1111xxx101MMMRRR", CpRestore, r::cp_state).modes(ctl | Modes::PI),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_scatters_into_mask() {
        assert_eq!(deposit(0b11, 0b1100_0000), 0b1100_0000);
        assert_eq!(deposit(0b101, 0b0000_1110_0000_0000), 0b0000_1010_0000_0000);
        assert_eq!(deposit(0b10, 0b1_0000_0001), 0b1_0000_0000);
    }

    #[test]
    fn placements_cover_fixed_and_free_registers() {
        let p = placements(Modes::DN | Modes::AL, 0b111000, 0b000111);
        assert_eq!(p.len(), 9);
        assert!(p.contains(&(AddressingMode::AbsoluteLong, 0b111001)));
        assert!(p.contains(&(AddressingMode::DataDirect, 0b000101)));
    }

    #[test]
    fn unclaimed_slots_fall_into_groups() {
        let table = DispatchTable::build(&[]);
        assert_eq!(table.lookup(0xA123).op, Operation::LineA);
        assert_eq!(table.lookup(0xF000).op, Operation::LineF);
        assert_eq!(table.lookup(0x4E71).op, Operation::Undefined);
    }

    #[test]
    fn templates_expand_over_free_bits_and_skip() {
        let table = DispatchTable::build(&[Template::new(
            "01100000xxxxxxxx",
            Operation::Bra,
            r::branch,
        )
        .size(Size::Byte)
        .skip(byte_displacement_in_opcode)]);
        assert!(table.is_bound(0x6002));
        assert!(table.is_bound(0x60FE));
        assert!(!table.is_bound(0x6000));
        assert!(!table.is_bound(0x60FF));
    }

    #[test]
    #[should_panic(expected = "claimed by both")]
    fn overlapping_templates_are_rejected() {
        DispatchTable::build(&[
            Template::new("0100111001110001", Operation::Nop, r::implied),
            Template::new("010011100111000x", Operation::Reset, r::implied),
        ]);
    }

    #[test]
    fn instruction_templates_do_not_overlap() {
        let table = DispatchTable::build(&templates());
        assert_eq!(table.lookup(0x4E71).op, Operation::Nop);
        assert_eq!(table.lookup(0x303C).op, Operation::Move);
        assert_eq!(table.lookup(0x303C).mode, AddressingMode::Immediate);
        assert_eq!(table.lookup(0x303C).size, Size::Word);
        assert_eq!(table.lookup(0x4AFC).op, Operation::Illegal);
        assert_eq!(table.lookup(0x51C8).op, Operation::Dbcc);
        assert_eq!(table.lookup(0x0CFC).op, Operation::Cas2);
        assert_eq!(table.lookup(0x48E7).op, Operation::Movem);
        assert_eq!(table.lookup(0x4848).op, Operation::Bkpt);
        assert_eq!(table.lookup(0x06D0).op, Operation::Callm);
    }

    #[test]
    fn line_f_binds_the_coprocessor_interface() {
        let table = DispatchTable::build(&templates());
        assert_eq!(table.lookup(0xF200).op, Operation::CpGen);
        assert_eq!(table.lookup(0xF250).op, Operation::CpScc);
        assert_eq!(table.lookup(0xF248).op, Operation::CpDbcc);
        assert_eq!(table.lookup(0xF27A).op, Operation::CpTrapcc);
        assert_eq!(table.lookup(0xF27C).op, Operation::CpTrapcc);
        assert_eq!(table.lookup(0xF281).size, Size::Word);
        assert_eq!(table.lookup(0xF2C1).size, Size::Long);
        assert_eq!(table.lookup(0xF327).op, Operation::CpSave);
        assert_eq!(table.lookup(0xF35F).op, Operation::CpRestore);

        assert_eq!(table.lookup(0xF279).op, Operation::CpScc);

        // cpTRAPcc with an unused operand mode, cpSAVE (An)+ and the two
        // spare type fields
        assert_eq!(table.lookup(0xF27D).op, Operation::LineF);
        assert_eq!(table.lookup(0xF318).op, Operation::LineF);
        assert_eq!(table.lookup(0xF380).op, Operation::LineF);
        assert_eq!(table.lookup(0xF3C0).op, Operation::LineF);
    }

    #[test]
    fn illegal_size_and_mode_combinations_stay_unbound() {
        let table = DispatchTable::build(&templates());
        // move.b with an address register source
        assert!(!table.is_bound(0x1008));
        // ori.l to an immediate destination
        assert!(!table.is_bound(0x00BC));
        // moveq with bit 8 set
        assert!(!table.is_bound(0x7100));
        // lea with a data register source
        assert!(!table.is_bound(0x41C0));
        // tst.b of an address register
        assert!(!table.is_bound(0x4A08));
        assert!(table.is_bound(0x4A48));
    }
}

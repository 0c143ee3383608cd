//! One decode routine per instruction shape. Each routine reads whatever
//! extension words its instruction carries, in encoding order, and emits
//! tokens. None of them look at the dialect.

use super::{
    AddressingMode, Availability, Condition, Dasm, Ea, Operation, Size, bit_range,
    display::{BitFieldArg, Token},
};

fn register(op: u16) -> u8 {
    bit_range(op, 0, 3)
}

/// Bits 11-9, the second register or data field of most opcodes.
fn upper_register(op: u16) -> u8 {
    bit_range(op, 9, 12)
}

fn condition(op: u16) -> Condition {
    Condition::from(bit_range(op, 8, 12))
}

impl Dasm<'_> {
    fn emit(&mut self, token: Token) -> &mut Self {
        self.out.push(token);
        self
    }

    fn mnemonic(&mut self) -> &mut Self {
        let op = self.entry.op;
        self.emit(Token::Mnemonic(op))
    }

    fn sized(&mut self) -> &mut Self {
        let size = self.entry.size;
        self.mnemonic().emit(Token::Size(size))
    }

    fn tab(&mut self) -> &mut Self {
        self.emit(Token::Tab)
    }

    fn sep(&mut self) -> &mut Self {
        self.emit(Token::Sep)
    }

    fn operand(&mut self, ea: Ea) -> &mut Self {
        self.emit(Token::Ea(ea))
    }

    fn available(&mut self, availability: Availability) -> &mut Self {
        self.emit(Token::Availability(availability))
    }
}

/// Instructions without operands.
pub(super) fn implied(d: &mut Dasm<'_>, _op: u16) {
    d.mnemonic();
}

pub(super) fn imm_to_ccr(d: &mut Dasm<'_>, _op: u16) {
    let value = d.read(Size::Byte);
    d.mnemonic()
        .emit(Token::ImpliedSize(Size::Byte))
        .tab()
        .emit(Token::ImmUnsigned(value, Size::Byte))
        .sep()
        .emit(Token::Ccr);
}

pub(super) fn imm_to_sr(d: &mut Dasm<'_>, _op: u16) {
    let value = d.read(Size::Word);
    d.mnemonic()
        .emit(Token::ImpliedSize(Size::Word))
        .tab()
        .emit(Token::ImmUnsigned(value, Size::Word))
        .sep()
        .emit(Token::Sr);
}

/// ADDI, SUBI, CMPI.
pub(super) fn arith_imm(d: &mut Dasm<'_>, op: u16) {
    let size = d.entry.size;
    let value = d.read(size);
    let dst = d.op_ea(op);
    d.sized()
        .tab()
        .emit(Token::Imm(value, size))
        .sep()
        .operand(dst);
    if dst.mode.is_pc_relative() {
        d.available(Availability::M68020);
    }
}

/// ORI, ANDI, EORI.
pub(super) fn logic_imm(d: &mut Dasm<'_>, op: u16) {
    let size = d.entry.size;
    let value = d.read(size);
    let dst = d.op_ea(op);
    d.sized()
        .tab()
        .emit(Token::ImmUnsigned(value, size))
        .sep()
        .operand(dst);
}

pub(super) fn callm(d: &mut Dasm<'_>, op: u16) {
    let argc = d.read(Size::Byte);
    let src = d.op_ea(op);
    d.mnemonic()
        .tab()
        .emit(Token::ImmUnsigned(argc, Size::Byte))
        .sep()
        .operand(src)
        .available(Availability::M68020Only);
}

pub(super) fn rtm(d: &mut Dasm<'_>, op: u16) {
    d.mnemonic()
        .tab()
        .emit(Token::Rn(bit_range(op, 0, 4)))
        .available(Availability::M68020Only);
}

pub(super) fn bit_imm(d: &mut Dasm<'_>, op: u16) {
    let bit = d.read(Size::Byte);
    let dst = d.op_ea(op);
    d.mnemonic()
        .tab()
        .emit(Token::ImmUnsigned(bit, Size::Byte))
        .sep()
        .operand(dst);
}

pub(super) fn bit_reg(d: &mut Dasm<'_>, op: u16) {
    let dst = d.op_ea(op);
    d.mnemonic()
        .tab()
        .emit(Token::Dn(upper_register(op)))
        .sep()
        .operand(dst);
}

pub(super) fn movep(d: &mut Dasm<'_>, op: u16) {
    let size = d.entry.size;
    let mem = d.ea(AddressingMode::Displacement, register(op), size);
    let dn = Token::Dn(upper_register(op));
    d.sized().tab();
    if op & 0x0080 != 0 {
        d.emit(dn).sep().operand(mem);
    } else {
        d.operand(mem).sep().emit(dn);
    }
}

pub(super) fn moves(d: &mut Dasm<'_>, op: u16) {
    let ext = d.read16();
    let ea = d.op_ea(op);
    let rn = Token::Rn(bit_range(ext, 12, 16));
    d.sized().tab();
    if ext & 0x0800 != 0 {
        d.emit(rn).sep().operand(ea);
    } else {
        d.operand(ea).sep().emit(rn);
    }
    d.available(Availability::M68010);
}

pub(super) fn cas(d: &mut Dasm<'_>, op: u16) {
    let ext = d.read16();
    let dst = d.op_ea(op);
    d.sized()
        .tab()
        .emit(Token::Dn(bit_range(ext, 0, 3)))
        .sep()
        .emit(Token::Dn(bit_range(ext, 6, 9)))
        .sep()
        .operand(dst)
        .available(Availability::M68020);
}

pub(super) fn cas2(d: &mut Dasm<'_>, _op: u16) {
    let ext = d.read32();
    let field = |shift: u32, mask: u32| ((ext >> shift) & mask) as u8;
    d.sized()
        .tab()
        .emit(Token::CasPair(field(16, 0b111), field(0, 0b111)))
        .sep()
        .emit(Token::CasPair(field(22, 0b111), field(6, 0b111)))
        .sep()
        .emit(Token::IndirectPair(field(28, 0xF), field(12, 0xF)))
        .available(Availability::M68020);
}

/// CHK2 and CMP2 share an encoding; bit 11 of the extension word tells them
/// apart.
pub(super) fn chk_cmp2(d: &mut Dasm<'_>, op: u16) {
    let ext = d.read16();
    let src = d.op_ea(op);
    let operation = if ext & 0x0800 != 0 {
        Operation::Chk2
    } else {
        Operation::Cmp2
    };
    let size = d.entry.size;
    d.emit(Token::Mnemonic(operation))
        .emit(Token::Size(size))
        .tab()
        .operand(src)
        .sep()
        .emit(Token::Rn(bit_range(ext, 12, 16)))
        .available(Availability::M68020);
}

pub(super) fn move_(d: &mut Dasm<'_>, op: u16) {
    let Some(dst_mode) = AddressingMode::from_bits(bit_range(op, 6, 9), upper_register(op))
    else {
        return undefined(d, op);
    };
    let size = d.entry.size;
    let src = d.op_ea(op);
    let dst = d.ea(dst_mode, upper_register(op), size);
    d.sized().tab().operand(src).sep().operand(dst);
}

pub(super) fn movea(d: &mut Dasm<'_>, op: u16) {
    let src = d.op_ea(op);
    d.sized()
        .tab()
        .operand(src)
        .sep()
        .emit(Token::An(upper_register(op)));
}

/// NEGX, CLR, NEG, NOT.
pub(super) fn unary(d: &mut Dasm<'_>, op: u16) {
    let dst = d.op_ea(op);
    d.sized().tab().operand(dst);
}

/// NBCD, PEA, TAS, JMP, JSR.
pub(super) fn unary_unsized(d: &mut Dasm<'_>, op: u16) {
    let ea = d.op_ea(op);
    d.mnemonic().tab().operand(ea);
}

pub(super) fn move_from_sr(d: &mut Dasm<'_>, op: u16) {
    let dst = d.op_ea(op);
    d.mnemonic()
        .emit(Token::ImpliedSize(Size::Word))
        .tab()
        .emit(Token::Sr)
        .sep()
        .operand(dst);
}

pub(super) fn move_from_ccr(d: &mut Dasm<'_>, op: u16) {
    let dst = d.op_ea(op);
    d.mnemonic()
        .emit(Token::ImpliedSize(Size::Word))
        .tab()
        .emit(Token::Ccr)
        .sep()
        .operand(dst)
        .available(Availability::M68010);
}

pub(super) fn move_to_ccr(d: &mut Dasm<'_>, op: u16) {
    let src = d.op_ea(op);
    d.mnemonic()
        .emit(Token::ImpliedSize(Size::Word))
        .tab()
        .operand(src)
        .sep()
        .emit(Token::Ccr);
}

pub(super) fn move_to_sr(d: &mut Dasm<'_>, op: u16) {
    let src = d.op_ea(op);
    d.mnemonic()
        .emit(Token::ImpliedSize(Size::Word))
        .tab()
        .operand(src)
        .sep()
        .emit(Token::Sr);
}

pub(super) fn chk(d: &mut Dasm<'_>, op: u16) {
    let src = d.op_ea(op);
    d.sized()
        .tab()
        .operand(src)
        .sep()
        .emit(Token::Dn(upper_register(op)));
    if d.entry.size == Size::Long {
        d.available(Availability::M68020);
    }
}

pub(super) fn lea(d: &mut Dasm<'_>, op: u16) {
    let src = d.op_ea(op);
    d.mnemonic()
        .tab()
        .operand(src)
        .sep()
        .emit(Token::An(upper_register(op)));
}

pub(super) fn link(d: &mut Dasm<'_>, op: u16) {
    let size = d.entry.size;
    let disp = d.read(size);
    d.mnemonic();
    if size == Size::Long {
        d.emit(Token::Size(size));
    } else {
        d.emit(Token::ImpliedSize(size));
    }
    d.tab()
        .emit(Token::An(register(op)))
        .sep()
        .emit(Token::Imm(disp, size));
    if size == Size::Long {
        d.available(Availability::M68020);
    }
}

pub(super) fn swap(d: &mut Dasm<'_>, op: u16) {
    d.mnemonic().tab().emit(Token::Dn(register(op)));
}

pub(super) fn bkpt(d: &mut Dasm<'_>, op: u16) {
    d.mnemonic()
        .tab()
        .emit(Token::Count(register(op)))
        .available(Availability::M68010);
}

/// EXT.W, EXT.L, EXTB.L.
pub(super) fn ext(d: &mut Dasm<'_>, op: u16) {
    d.sized().tab().emit(Token::Dn(register(op)));
    if d.entry.op == Operation::Extb {
        d.available(Availability::M68020);
    }
}

/// The register mask precedes any extension word of the effective address.
/// With predecrement addressing the mask is stored highest register first.
pub(super) fn movem_to_mem(d: &mut Dasm<'_>, op: u16) {
    let mask = d.read16();
    let dst = d.op_ea(op);
    let mask = if dst.mode == AddressingMode::PreDecrement {
        mask.reverse_bits()
    } else {
        mask
    };
    d.sized()
        .tab()
        .emit(Token::RegList(mask))
        .sep()
        .operand(dst);
}

pub(super) fn movem_to_reg(d: &mut Dasm<'_>, op: u16) {
    let mask = d.read16();
    let src = d.op_ea(op);
    d.sized()
        .tab()
        .operand(src)
        .sep()
        .emit(Token::RegList(mask));
}

pub(super) fn tst(d: &mut Dasm<'_>, op: u16) {
    let src = d.op_ea(op);
    d.sized().tab().operand(src);
    if matches!(
        src.mode,
        AddressingMode::AddrDirect
            | AddressingMode::PcDisplacement
            | AddressingMode::PcIndexed
            | AddressingMode::Immediate
    ) {
        d.available(Availability::M68020);
    }
}

/// Long multiply. Bit 11 selects signed, bit 10 a 64-bit result in Dh:Dl.
pub(super) fn mull(d: &mut Dasm<'_>, op: u16) {
    let ext = d.read16();
    let src = d.op_ea(op);
    let dl = bit_range(ext, 12, 15);
    let dh = bit_range(ext, 0, 3);
    let operation = if ext & 0x0800 != 0 {
        Operation::Muls
    } else {
        Operation::Mulu
    };

    d.emit(Token::Mnemonic(operation))
        .emit(Token::Size(Size::Long))
        .tab()
        .operand(src)
        .sep();
    if ext & 0x0400 != 0 {
        d.emit(Token::RegPair(dh, dl));
    } else {
        d.emit(Token::Dn(dl));
    }
    d.available(Availability::M68020);
}

/// Long divide. A 32-bit dividend with distinct quotient and remainder
/// registers is spelled DIVSL/DIVUL.
pub(super) fn divl(d: &mut Dasm<'_>, op: u16) {
    let ext = d.read16();
    let src = d.op_ea(op);
    let dq = bit_range(ext, 12, 15);
    let dr = bit_range(ext, 0, 3);
    let signed = ext & 0x0800 != 0;
    let wide = ext & 0x0400 != 0;

    let operation = match (signed, wide || dq == dr) {
        (true, true) => Operation::Divs,
        (true, false) => Operation::Divsl,
        (false, true) => Operation::Divu,
        (false, false) => Operation::Divul,
    };

    d.emit(Token::Mnemonic(operation))
        .emit(Token::Size(Size::Long))
        .tab()
        .operand(src)
        .sep();
    if wide || dq != dr {
        d.emit(Token::RegPair(dr, dq));
    } else {
        d.emit(Token::Dn(dq));
    }
    d.available(Availability::M68020);
}

pub(super) fn trap(d: &mut Dasm<'_>, op: u16) {
    d.mnemonic()
        .tab()
        .emit(Token::ImmUnsigned(bit_range(op, 0, 4) as u32, Size::Byte));
}

pub(super) fn unlk(d: &mut Dasm<'_>, op: u16) {
    d.mnemonic().tab().emit(Token::An(register(op)));
}

pub(super) fn move_usp(d: &mut Dasm<'_>, op: u16) {
    let an = Token::An(register(op));
    d.mnemonic().emit(Token::ImpliedSize(Size::Long)).tab();
    if op & 0x0008 != 0 {
        d.emit(Token::Usp).sep().emit(an);
    } else {
        d.emit(an).sep().emit(Token::Usp);
    }
}

pub(super) fn stop(d: &mut Dasm<'_>, _op: u16) {
    let value = d.read(Size::Word);
    d.mnemonic().tab().emit(Token::Imm(value, Size::Word));
}

pub(super) fn rtd(d: &mut Dasm<'_>, _op: u16) {
    let disp = d.read(Size::Word);
    d.mnemonic()
        .tab()
        .emit(Token::Imm(disp, Size::Word))
        .available(Availability::M68010);
}

/// Control registers introduced with the 68010. The rest need a 68020.
fn movec_availability(cr: u16) -> Availability {
    match cr {
        0x000 | 0x001 | 0x800 | 0x801 => Availability::M68010,
        _ => Availability::M68020,
    }
}

pub(super) fn movec(d: &mut Dasm<'_>, op: u16) {
    let ext = d.read16();
    let cr = ext & 0x0FFF;
    let rn = Token::Rn(bit_range(ext, 12, 16));
    d.mnemonic().tab();
    if op & 1 != 0 {
        d.emit(rn).sep().emit(Token::Control(cr));
    } else {
        d.emit(Token::Control(cr)).sep().emit(rn);
    }
    d.available(movec_availability(cr));
}

/// ADDQ, SUBQ. A zero data field means eight.
pub(super) fn quick(d: &mut Dasm<'_>, op: u16) {
    let data = match upper_register(op) {
        0 => 8,
        n => n,
    };
    let dst = d.op_ea(op);
    d.sized()
        .tab()
        .emit(Token::Count(data))
        .sep()
        .operand(dst);
}

pub(super) fn scc(d: &mut Dasm<'_>, op: u16) {
    let dst = d.op_ea(op);
    d.emit(Token::Conditional(Operation::Scc, condition(op)))
        .tab()
        .operand(dst);
}

pub(super) fn dbcc(d: &mut Dasm<'_>, op: u16) {
    let base = d.cursor.addr();
    let disp = d.read16() as i16 as i32;
    d.emit(Token::Conditional(Operation::Dbcc, condition(op)))
        .tab()
        .emit(Token::Dn(register(op)))
        .sep()
        .emit(Token::Address(base.wrapping_add(disp as u32)));
}

pub(super) fn trapcc(d: &mut Dasm<'_>, op: u16) {
    let size = d.entry.size;
    let value = d.read(size);
    d.emit(Token::Conditional(Operation::Trapcc, condition(op)))
        .emit(Token::ImpliedSize(size))
        .tab()
        .emit(Token::ImmUnsigned(value, size))
        .available(Availability::M68020);
}

pub(super) fn trapcc_unsized(d: &mut Dasm<'_>, op: u16) {
    d.emit(Token::Conditional(Operation::Trapcc, condition(op)))
        .available(Availability::M68020);
}

/// BRA, BSR, Bcc. Targets are relative to the word after the opcode.
pub(super) fn branch(d: &mut Dasm<'_>, op: u16) {
    let base = d.cursor.addr();
    let size = d.entry.size;
    let disp = match size {
        Size::Byte => op as u8 as i8 as i32,
        Size::Word => d.read16() as i16 as i32,
        Size::Long => d.read32() as i32,
    };
    let target = base.wrapping_add(disp as u32);

    if d.entry.op == Operation::Bcc {
        d.emit(Token::Conditional(Operation::Bcc, condition(op)));
    } else {
        d.mnemonic();
    }
    d.emit(Token::ImpliedSize(size))
        .tab()
        .emit(Token::Address(target));
    if size == Size::Long {
        d.available(Availability::M68020);
    }
}

pub(super) fn moveq(d: &mut Dasm<'_>, op: u16) {
    d.mnemonic()
        .tab()
        .emit(Token::Imm((op & 0xFF) as u32, Size::Byte))
        .sep()
        .emit(Token::Dn(upper_register(op)));
}

/// `<op> <ea>,Dn` for OR, AND, SUB, ADD and CMP.
pub(super) fn ea_to_dn(d: &mut Dasm<'_>, op: u16) {
    let src = d.op_ea(op);
    d.sized()
        .tab()
        .operand(src)
        .sep()
        .emit(Token::Dn(upper_register(op)));
}

/// `<op> Dn,<ea>` for OR, AND, SUB, ADD and EOR.
pub(super) fn dn_to_ea(d: &mut Dasm<'_>, op: u16) {
    let dst = d.op_ea(op);
    d.sized()
        .tab()
        .emit(Token::Dn(upper_register(op)))
        .sep()
        .operand(dst);
}

/// SUBA, ADDA, CMPA.
pub(super) fn ea_to_an(d: &mut Dasm<'_>, op: u16) {
    let src = d.op_ea(op);
    d.sized()
        .tab()
        .operand(src)
        .sep()
        .emit(Token::An(upper_register(op)));
}

/// MULU.W, MULS.W, DIVU.W, DIVS.W.
pub(super) fn muldiv_word(d: &mut Dasm<'_>, op: u16) {
    let src = d.op_ea(op);
    d.mnemonic()
        .emit(Token::Size(Size::Word))
        .tab()
        .operand(src)
        .sep()
        .emit(Token::Dn(upper_register(op)));
}

/// Register pair operands of ABCD, SBCD, ADDX, SUBX, PACK and UNPK. Bit 3
/// selects predecrement memory operands over data registers.
fn register_pair(d: &mut Dasm<'_>, op: u16, size: Size) -> (Ea, Ea) {
    let mode = if op & 0x0008 != 0 {
        AddressingMode::PreDecrement
    } else {
        AddressingMode::DataDirect
    };
    let src = d.ea(mode, register(op), size);
    let dst = d.ea(mode, upper_register(op), size);
    (src, dst)
}

/// ABCD, SBCD, ADDX, SUBX.
pub(super) fn extended(d: &mut Dasm<'_>, op: u16) {
    let size = d.entry.size;
    let (src, dst) = register_pair(d, op, size);
    if matches!(d.entry.op, Operation::Addx | Operation::Subx) {
        d.sized();
    } else {
        d.mnemonic();
    }
    d.tab().operand(src).sep().operand(dst);
}

pub(super) fn cmpm(d: &mut Dasm<'_>, op: u16) {
    let size = d.entry.size;
    let src = d.ea(AddressingMode::PostIncrement, register(op), size);
    let dst = d.ea(AddressingMode::PostIncrement, upper_register(op), size);
    d.sized().tab().operand(src).sep().operand(dst);
}

pub(super) fn pack_unpk(d: &mut Dasm<'_>, op: u16) {
    let adjust = d.read(Size::Word);
    let (src, dst) = register_pair(d, op, Size::Word);
    d.mnemonic()
        .tab()
        .operand(src)
        .sep()
        .operand(dst)
        .sep()
        .emit(Token::ImmUnsigned(adjust, Size::Word))
        .available(Availability::M68020);
}

pub(super) fn exg(d: &mut Dasm<'_>, op: u16) {
    let rx = upper_register(op);
    let ry = register(op);
    let (first, second) = match bit_range(op, 3, 8) {
        0b01000 => (Token::Dn(rx), Token::Dn(ry)),
        0b01001 => (Token::An(rx), Token::An(ry)),
        _ => (Token::Dn(rx), Token::An(ry)),
    };
    d.mnemonic().tab().emit(first).sep().emit(second);
}

/// Register shifts and rotates. The count is either a register or an
/// immediate in 1..=8.
pub(super) fn shift_reg(d: &mut Dasm<'_>, op: u16) {
    let field = upper_register(op);
    let count = if op & 0x0020 != 0 {
        Token::Dn(field)
    } else {
        Token::Count(if field == 0 { 8 } else { field })
    };
    d.sized()
        .tab()
        .emit(count)
        .sep()
        .emit(Token::Dn(register(op)));
}

/// Memory shifts always operate on one word.
pub(super) fn shift_mem(d: &mut Dasm<'_>, op: u16) {
    let dst = d.op_ea(op);
    d.sized().tab().operand(dst);
}

pub(super) fn bitfield(d: &mut Dasm<'_>, op: u16) {
    let ext = d.read16();
    let ea = d.op_ea(op);
    let reg = bit_range(ext, 12, 15);

    let offset = if ext & 0x0800 != 0 {
        BitFieldArg::Dn(bit_range(ext, 6, 9))
    } else {
        BitFieldArg::Imm(bit_range(ext, 6, 11))
    };
    let width = if ext & 0x0020 != 0 {
        BitFieldArg::Dn(bit_range(ext, 0, 3))
    } else {
        match bit_range(ext, 0, 5) {
            0 => BitFieldArg::Imm(32),
            w => BitFieldArg::Imm(w),
        }
    };

    let operation = d.entry.op;
    d.mnemonic().tab();
    if operation == Operation::Bfins {
        d.emit(Token::Dn(reg)).sep();
    }
    d.operand(ea).emit(Token::BitField { offset, width });
    if matches!(
        operation,
        Operation::Bfextu | Operation::Bfexts | Operation::Bfffo
    ) {
        d.sep().emit(Token::Dn(reg));
    }
    d.available(Availability::M68020);
}

/// cpGEN. The command word and whatever follows it are read as one long.
pub(super) fn cp_gen(d: &mut Dasm<'_>, op: u16) {
    let command = d.read32();
    d.emit(Token::Coprocessor(upper_register(op)))
        .mnemonic()
        .tab()
        .emit(Token::ImmUnsigned(command, Size::Long))
        .available(Availability::M68020Coprocessor);
}

/// cpBcc. The predicate sits in the opcode. One extension word comes before
/// the displacement and one after it.
pub(super) fn cp_bcc(d: &mut Dasm<'_>, op: u16) {
    let base = d.cursor.addr();
    let extension = d.read16();
    let size = d.entry.size;
    let disp = size.sign_extend(d.read(size));
    let operand = d.read16();
    d.emit(Token::Coprocessor(upper_register(op)))
        .emit(Token::CpConditional(Operation::CpBcc, bit_range(op, 0, 6)))
        .tab()
        .emit(Token::Imm(operand as u32, Size::Word))
        .emit(Token::CpExtension {
            target: Some(base.wrapping_add(disp as u32)),
            extension,
        });
}

pub(super) fn cp_dbcc(d: &mut Dasm<'_>, op: u16) {
    let base = d.cursor.addr();
    let predicate = d.read16();
    let extension = d.read16();
    let disp = d.read16() as i16 as i32;
    let operand = d.read16();
    d.emit(Token::Coprocessor(upper_register(op)))
        .emit(Token::CpConditional(
            Operation::CpDbcc,
            bit_range(predicate, 0, 6),
        ))
        .tab()
        .emit(Token::Dn(register(op)))
        .sep()
        .emit(Token::Imm(operand as u32, Size::Word))
        .emit(Token::CpExtension {
            target: Some(base.wrapping_add(disp as u32)),
            extension,
        });
}

pub(super) fn cp_scc(d: &mut Dasm<'_>, op: u16) {
    let predicate = d.read16();
    let extension = d.read16();
    let dst = d.op_ea(op);
    d.emit(Token::Coprocessor(upper_register(op)))
        .emit(Token::CpConditional(Operation::CpScc, bit_range(predicate, 0, 6)))
        .tab()
        .operand(dst)
        .emit(Token::CpExtension {
            target: None,
            extension,
        });
}

/// cpTRAPcc. The low opcode bits select a word, long or no operand.
pub(super) fn cp_trapcc(d: &mut Dasm<'_>, op: u16) {
    let predicate = d.read16();
    let extension = d.read16();
    d.emit(Token::Coprocessor(upper_register(op)))
        .emit(Token::CpConditional(
            Operation::CpTrapcc,
            bit_range(predicate, 0, 6),
        ));
    let size = match op & 0b111 {
        0b010 => Some(Size::Word),
        0b011 => Some(Size::Long),
        _ => None,
    };
    if let Some(size) = size {
        let value = d.read(size);
        d.tab().emit(Token::ImmUnsigned(value, size));
    }
    d.emit(Token::CpExtension {
        target: None,
        extension,
    });
}

/// cpSAVE and cpRESTORE.
pub(super) fn cp_state(d: &mut Dasm<'_>, op: u16) {
    let ea = d.op_ea(op);
    d.emit(Token::Coprocessor(upper_register(op)))
        .mnemonic()
        .tab()
        .operand(ea)
        .available(Availability::M68020Coprocessor);
}

/// Slots no instruction claims. They occupy one word.
pub(super) fn undefined(d: &mut Dasm<'_>, op: u16) {
    d.emit(Token::Data(op)).emit(Token::Comment("; ILLEGAL"));
}

/// Line A and line F emulator traps. No extension words are read.
pub(super) fn line_trap(d: &mut Dasm<'_>, op: u16) {
    d.emit(Token::LineTrap(op));
}

#[cfg(test)]
mod tests {
    use crate::{
        config::Dialect,
        decoder::{Token, decode_tokens},
        memory::MemoryImage,
    };

    use super::*;

    fn tokens(words: &[u16]) -> Vec<Token> {
        let image = MemoryImage::from_words(0x1000, words);
        decode_tokens(0x1000, &image, Dialect::Native)
            .tokens
            .as_slice()
            .to_vec()
    }

    #[test]
    fn movem_predecrement_mask_is_reversed() {
        // movem.l d0-d1/a6,-(a7)
        let toks = tokens(&[0x48E7, 0xC002]);
        assert!(toks.contains(&Token::RegList(0x4003)));

        // movem.l (a7)+,d0-d1/a6
        let toks = tokens(&[0x4CDF, 0x4003]);
        assert!(toks.contains(&Token::RegList(0x4003)));
    }

    #[test]
    fn branch_targets_are_relative_to_the_extension_word() {
        // bra.s *+4
        assert!(tokens(&[0x6002]).contains(&Token::Address(0x1004)));
        // bne.w *-2
        assert!(tokens(&[0x6600, 0xFFFC]).contains(&Token::Address(0x0FFE)));
        // dbf d0,*+0x12
        assert!(tokens(&[0x51C8, 0x0010]).contains(&Token::Address(0x1012)));
    }

    #[test]
    fn quick_data_zero_means_eight() {
        let toks = tokens(&[0x5080]);
        assert_eq!(toks[..3], [
            Token::Mnemonic(Operation::Addq),
            Token::Size(Size::Long),
            Token::Tab
        ]);
        assert_eq!(toks[3], Token::Count(8));
    }

    #[test]
    fn long_divide_picks_its_spelling() {
        // divul.l d0,d2:d1
        let toks = tokens(&[0x4C40, 0x1002]);
        assert_eq!(toks[0], Token::Mnemonic(Operation::Divul));
        assert!(toks.contains(&Token::RegPair(2, 1)));

        // divs.l d0,d1
        let toks = tokens(&[0x4C40, 0x1801]);
        assert_eq!(toks[0], Token::Mnemonic(Operation::Divs));
        assert!(toks.contains(&Token::Dn(1)));
    }

    #[test]
    fn unassigned_slots_render_as_data() {
        assert_eq!(tokens(&[0x4AFB]), [
            Token::Data(0x4AFB),
            Token::Comment("; ILLEGAL")
        ]);
        assert_eq!(tokens(&[0xA123]), [Token::LineTrap(0xA123)]);
    }

    #[test]
    fn coprocessor_branch_reads_around_its_displacement() {
        // 1bne with a word displacement: extension, displacement, operand
        let toks = tokens(&[0xF28E, 0x0007, 0x0010, 0x0002]);
        assert_eq!(toks[..2], [
            Token::Coprocessor(1),
            Token::CpConditional(Operation::CpBcc, 0x0E)
        ]);
        assert!(toks.contains(&Token::Imm(0x0002, Size::Word)));
        assert!(toks.contains(&Token::CpExtension {
            target: Some(0x1012),
            extension: 0x0007
        }));
    }

    #[test]
    fn coprocessor_dbcc_takes_its_predicate_from_the_first_word() {
        let toks = tokens(&[0xF249, 0x0001, 0x0002, 0xFFFE, 0x0003]);
        assert_eq!(toks[1], Token::CpConditional(Operation::CpDbcc, 1));
        assert!(toks.contains(&Token::Dn(1)));
        assert!(toks.contains(&Token::CpExtension {
            target: Some(0x1000),
            extension: 0x0002
        }));
    }
}

use super::{AddressingMode, Size};
use crate::memory::Cursor;

/// Full-format extension words whose bits masked with this value reach
/// `OUTER_QUIRK_MIN` are read by Musashi without their outer displacement.
pub const OUTER_QUIRK_MASK: u16 = 0x47;
pub const OUTER_QUIRK_MIN: u16 = 0x44;

/// A decoded effective address. Every extension word it needs has already
/// been read and sign-extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ea {
    pub mode: AddressingMode,
    pub size: Size,
    pub reg: u8,
    /// Address of the first extension word, the base of PC-relative modes.
    pub pc: u32,
    /// Raw first extension word, absolute address or immediate value.
    pub ext1: u32,
    /// Base displacement.
    pub ext2: i32,
    /// Outer displacement.
    pub ext3: i32,
    /// Words read for the base displacement.
    pub dw: u8,
    /// Words read for the outer displacement.
    pub ow: u8,
}

/// Memory indirection selected by a full-format extension word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indirection {
    None,
    PreIndexed,
    PostIndexed,
}

impl Ea {
    pub fn register(mode: AddressingMode, reg: u8) -> Self {
        Self {
            mode,
            size: Size::Word,
            reg,
            pc: 0,
            ext1: 0,
            ext2: 0,
            ext3: 0,
            dw: 0,
            ow: 0,
        }
    }

    pub fn ext_word(&self) -> u16 {
        self.ext1 as u16
    }

    pub fn is_full_format(&self) -> bool {
        self.mode.is_indexed() && self.ext_word() & 0x0100 != 0
    }

    pub fn base_suppressed(&self) -> bool {
        self.ext_word() & 0x0080 != 0
    }

    pub fn index_suppressed(&self) -> bool {
        self.ext_word() & 0x0040 != 0
    }

    pub fn index_is_address(&self) -> bool {
        self.ext_word() & 0x8000 != 0
    }

    pub fn index_reg(&self) -> u8 {
        ((self.ext_word() >> 12) & 0b111) as u8
    }

    pub fn index_size(&self) -> Size {
        if self.ext_word() & 0x0800 != 0 {
            Size::Long
        } else {
            Size::Word
        }
    }

    pub fn scale(&self) -> u8 {
        1 << ((self.ext_word() >> 9) & 0b11)
    }

    /// 8-bit displacement of a brief extension word.
    pub fn brief_displacement(&self) -> i32 {
        self.ext_word() as u8 as i8 as i32
    }

    /// 16-bit displacement of (d16,An) and (d16,PC).
    pub fn displacement(&self) -> i32 {
        self.ext_word() as i16 as i32
    }

    /// Absolute short addresses are sign-extended to 32 bits.
    pub fn short_address(&self) -> u32 {
        self.ext_word() as i16 as i32 as u32
    }

    /// Target of a PC-relative operand, ignoring any index register.
    pub fn pc_target(&self) -> u32 {
        match self.mode {
            AddressingMode::PcDisplacement => self.pc.wrapping_add(self.displacement() as u32),
            _ if self.is_full_format() => self.pc.wrapping_add(self.ext2 as u32),
            _ => self.pc.wrapping_add(self.brief_displacement() as u32),
        }
    }

    pub fn indirection(&self) -> Indirection {
        match self.ext_word() & 0b111 {
            1..=3 => Indirection::PreIndexed,
            5..=7 => Indirection::PostIndexed,
            _ => Indirection::None,
        }
    }

    /// Both base and index suppressed with nothing left to address, the
    /// case Musashi prints as a bare `0`.
    pub fn is_effective_zero(&self) -> bool {
        let ext = self.ext_word();
        (ext & 0xE4) == 0xC4 || (ext & 0xE2) == 0xC0
    }
}

/// Words following a full-format extension word for its base displacement.
pub fn base_displacement_words(ext: u16) -> u8 {
    match (ext >> 4) & 0b11 {
        0b11 => 2,
        0b10 => 1,
        _ => 0,
    }
}

/// Words following the base displacement for the outer displacement.
pub fn outer_displacement_words(ext: u16) -> u8 {
    match ext & 0b11 {
        0b11 => 2,
        0b10 => 1,
        _ => 0,
    }
}

fn read_displacement(cursor: &mut Cursor<'_>, words: u8) -> i32 {
    match words {
        1 => cursor.read16() as i16 as i32,
        2 => cursor.read32() as i32,
        _ => 0,
    }
}

/// Reads the extension words of one operand.
///
/// `drop_outer` reproduces Musashi's reading of full-format words: when set,
/// words matching `OUTER_QUIRK_MASK`/`OUTER_QUIRK_MIN` are treated as having
/// no outer displacement whatever their size field says.
pub fn resolve_ea(
    mode: AddressingMode,
    reg: u8,
    size: Size,
    cursor: &mut Cursor<'_>,
    drop_outer: bool,
) -> Ea {
    let mut ea = Ea {
        mode,
        size,
        reg,
        pc: cursor.addr(),
        ..Ea::register(mode, reg)
    };

    match mode {
        AddressingMode::Displacement
        | AddressingMode::AbsoluteShort
        | AddressingMode::PcDisplacement => {
            ea.ext1 = cursor.read16() as u32;
        }
        AddressingMode::AbsoluteLong => {
            ea.ext1 = cursor.read32();
        }
        AddressingMode::Indexed | AddressingMode::PcIndexed => {
            let ext = cursor.read16();
            ea.ext1 = ext as u32;

            if ext & 0x0100 != 0 {
                ea.dw = base_displacement_words(ext);
                ea.ow = outer_displacement_words(ext);

                if drop_outer && (ext & OUTER_QUIRK_MASK) >= OUTER_QUIRK_MIN {
                    ea.ow = 0;
                }

                ea.ext2 = read_displacement(cursor, ea.dw);
                ea.ext3 = read_displacement(cursor, ea.ow);
            }
        }
        AddressingMode::Immediate => {
            ea.ext1 = cursor.read(size);
        }
        _ => {}
    }

    ea
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryImage;

    fn resolve(mode: AddressingMode, size: Size, words: &[u16], drop_outer: bool) -> (Ea, u32) {
        let image = MemoryImage::from_words(0x100, words);
        let mut cursor = Cursor::new(&image, 0x100);
        let ea = resolve_ea(mode, 0, size, &mut cursor, drop_outer);
        (ea, cursor.addr() - 0x100)
    }

    #[test]
    fn register_modes_read_nothing() {
        for mode in [
            AddressingMode::DataDirect,
            AddressingMode::AddrDirect,
            AddressingMode::Indirect,
            AddressingMode::PostIncrement,
            AddressingMode::PreDecrement,
        ] {
            let (_, consumed) = resolve(mode, Size::Long, &[0xFFFF, 0xFFFF], false);
            assert_eq!(consumed, 0, "{mode:?}");
        }
    }

    #[test]
    fn immediates_follow_operand_size() {
        let (ea, consumed) = resolve(AddressingMode::Immediate, Size::Byte, &[0x12FF], false);
        assert_eq!((ea.ext1, consumed), (0xFF, 2));
        let (ea, consumed) =
            resolve(AddressingMode::Immediate, Size::Long, &[0x1234, 0x5678], false);
        assert_eq!((ea.ext1, consumed), (0x1234_5678, 4));
    }

    #[test]
    fn brief_format_reads_one_word() {
        let (ea, consumed) = resolve(AddressingMode::Indexed, Size::Word, &[0x1AFE, 0x7777], false);
        assert_eq!(consumed, 2);
        assert!(!ea.is_full_format());
        assert_eq!(ea.brief_displacement(), -2);
        assert_eq!((ea.index_reg(), ea.index_size(), ea.scale()), (1, Size::Long, 2));
    }

    #[test]
    fn full_format_reads_base_then_outer() {
        // bd long, od long: 1 + 2 + 2 words
        let words = [0x0133, 0xFFFF, 0xFFF0, 0x0000, 0x0020];
        let (ea, consumed) = resolve(AddressingMode::Indexed, Size::Word, &words, false);
        assert_eq!(consumed, 10);
        assert_eq!((ea.dw, ea.ow), (2, 2));
        assert_eq!((ea.ext2, ea.ext3), (-16, 0x20));
        assert_eq!(ea.indirection(), Indirection::PreIndexed);

        // bd word sign-extended, no outer
        let (ea, consumed) = resolve(AddressingMode::PcIndexed, Size::Word, &[0x0120, 0x8000], false);
        assert_eq!(consumed, 4);
        assert_eq!(ea.ext2, -0x8000);
        assert_eq!(ea.indirection(), Indirection::None);
    }

    #[test]
    fn outer_quirk_drops_the_outer_word() {
        let words = [0x0156, 0x0010];
        let (ea, consumed) = resolve(AddressingMode::Indexed, Size::Word, &words, false);
        assert_eq!((consumed, ea.ow, ea.ext3), (4, 1, 0x10));

        let (ea, consumed) = resolve(AddressingMode::Indexed, Size::Word, &words, true);
        assert_eq!((consumed, ea.ow, ea.ext3), (2, 0, 0));
    }

    #[test]
    fn outer_quirk_leaves_other_words_alone() {
        // Pre-indexed with word outer displacement: 0x0112 & 0x47 = 0x02.
        let words = [0x0112, 0x0010];
        let (ea, consumed) = resolve(AddressingMode::Indexed, Size::Word, &words, true);
        assert_eq!((consumed, ea.ow), (4, 1));
    }
}

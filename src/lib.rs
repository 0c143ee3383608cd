//! Disassembler for the Motorola 68000, 68010 and 68020 integer instruction
//! sets.
//!
//! ```
//! use dasm68k::{Dialect, MemoryImage, NumberFormat, decode_one};
//!
//! let image = MemoryImage::from_words(0x2000, &[0x303C, 0x00FF]);
//! let line = decode_one(0x2000, &image, Dialect::Native, NumberFormat::hex());
//! assert_eq!(line.text, "move.w  #$ff, D0");
//! assert_eq!(line.next, 0x2004);
//! ```

pub mod config;
pub mod decoder;
pub mod memory;

pub use config::{ConfigError, DasmConfig, Dialect, NumberFormat, Radix};
pub use decoder::{
    Decoded, Disassembler, Line, OutputSink, decode_into, decode_one, decode_tokens,
};
pub use memory::{MemoryError, MemoryImage, MemoryReader, MemorySegment};

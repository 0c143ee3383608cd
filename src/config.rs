use std::{fmt, str::FromStr};

use thiserror::Error;

/// Output convention for rendered instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// Uppercase registers, `move.w  #$ff, D0`.
    #[default]
    Native,
    /// Bit-compatible with the Musashi disassembler, including its decoding
    /// defect for full-format extension words.
    ReferenceCompatible,
    /// vda68k in Motorola syntax, `move.w  #$ff,d0`.
    MotorolaSyntax,
    /// vda68k in MIT syntax, `movew #$ff,d0`.
    MitSyntax,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [
        Dialect::Native,
        Dialect::ReferenceCompatible,
        Dialect::MotorolaSyntax,
        Dialect::MitSyntax,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Native => "native",
            Dialect::ReferenceCompatible => "musashi",
            Dialect::MotorolaSyntax => "motorola",
            Dialect::MitSyntax => "mit",
        }
    }

    /// Whether outer displacements of some full-format extension words are
    /// dropped while reading, the way Musashi does it.
    pub fn drops_outer_displacement(self) -> bool {
        self == Dialect::ReferenceCompatible
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" | "moira" => Ok(Dialect::Native),
            "musashi" | "reference" => Ok(Dialect::ReferenceCompatible),
            "motorola" | "mot" => Ok(Dialect::MotorolaSyntax),
            "mit" => Ok(Dialect::MitSyntax),
            _ => Err(ConfigError::UnknownDialect(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Radix {
    Decimal,
    Hexadecimal,
}

/// How numeric literals are rendered. Independent of the dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumberFormat {
    pub prefix: &'static str,
    pub radix: Radix,
    pub upper_case: bool,
    /// Print zero as a bare `0`.
    pub plain_zero: bool,
}

impl NumberFormat {
    pub const fn hex() -> Self {
        Self {
            prefix: "$",
            radix: Radix::Hexadecimal,
            upper_case: false,
            plain_zero: false,
        }
    }

    pub const fn c_hex() -> Self {
        Self {
            prefix: "0x",
            radix: Radix::Hexadecimal,
            upper_case: false,
            plain_zero: false,
        }
    }

    pub const fn decimal() -> Self {
        Self {
            prefix: "",
            radix: Radix::Decimal,
            upper_case: false,
            plain_zero: false,
        }
    }

    /// The same format with zero printed as a bare `0`.
    pub const fn with_plain_zero(self) -> Self {
        Self {
            plain_zero: true,
            ..self
        }
    }

    pub fn is_decimal(&self) -> bool {
        self.radix == Radix::Decimal
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::hex()
    }
}

impl FromStr for NumberFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hex" | "$" => Ok(Self::hex()),
            "HEX" => Ok(Self {
                upper_case: true,
                ..Self::hex()
            }),
            "c" | "0x" => Ok(Self::c_hex()),
            "dec" | "decimal" => Ok(Self::decimal()),
            _ => Err(ConfigError::UnknownNumberFormat(s.to_string())),
        }
    }
}

/// Per-call rendering options. Nothing here is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DasmConfig {
    pub dialect: Dialect,
    pub number_format: NumberFormat,
}

impl DasmConfig {
    pub fn new(dialect: Dialect, number_format: NumberFormat) -> Self {
        Self {
            dialect,
            number_format,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown dialect `{0}` (expected native, musashi, motorola or mit)")]
    UnknownDialect(String),
    #[error("unknown number format `{0}` (expected hex, c or dec)")]
    UnknownNumberFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialects_parse_from_their_names() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.name().parse::<Dialect>(), Ok(dialect));
        }
        assert_eq!("MIT".parse::<Dialect>(), Ok(Dialect::MitSyntax));
        assert_eq!(
            "gas".parse::<Dialect>(),
            Err(ConfigError::UnknownDialect("gas".into()))
        );
    }

    #[test]
    fn number_formats_parse() {
        assert_eq!("hex".parse::<NumberFormat>(), Ok(NumberFormat::hex()));
        assert_eq!("c".parse::<NumberFormat>(), Ok(NumberFormat::c_hex()));
        assert!("dec".parse::<NumberFormat>().unwrap().is_decimal());
        assert!("octal".parse::<NumberFormat>().is_err());
    }
}

use std::{
    fmt::{self, Debug, Display},
    str::FromStr,
};

/// a four-character code, naming an smc key or the data type of its value.
///
/// on the wire these are big-endian `u32`s, e.g. `"TC0P"` is `0x5443_3050`.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FourCc([u8; 4]);

#[derive(Debug, Eq, PartialEq)]
pub enum FourCcParseError {
    /// codes are one to four characters long.
    Length(usize),
    NotAscii,
}

// === impl FourCc ===

impl FourCc {
    pub const fn new(code: [u8; 4]) -> Self {
        Self(code)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        let Self(bytes) = self;
        bytes
    }
}

impl FromStr for FourCc {
    type Err = FourCcParseError;
    /// parses a code, right-padding codes shorter than four characters with spaces.
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        if !code.is_ascii() {
            return Err(FourCcParseError::NotAscii);
        }

        let len = code.len();
        if !(1..=4).contains(&len) {
            return Err(FourCcParseError::Length(len));
        }

        let mut bytes = [b' '; 4];
        bytes[..len].copy_from_slice(code.as_bytes());
        Ok(Self(bytes))
    }
}

impl From<u32> for FourCc {
    fn from(code: u32) -> Self {
        Self(code.to_be_bytes())
    }
}

impl From<FourCc> for u32 {
    fn from(FourCc(bytes): FourCc) -> Self {
        u32::from_be_bytes(bytes)
    }
}

impl Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(bytes) = self;
        for &b in bytes {
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc({:?})", self.to_string())
    }
}

// === impl FourCcParseError ===

impl Display for FourCcParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length(len) => write!(f, "expected 1 to 4 characters, found {len}"),
            Self::NotAscii => f.write_str("codes must be ascii"),
        }
    }
}

impl std::error::Error for FourCcParseError {}

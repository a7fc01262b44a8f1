use super::FourCc;

/// the numeric encodings an smc value may be stored in, selected by its data type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Encoding {
    /// `"flt "`: a 32-bit float, in the host's byte order.
    Float,
    /// `"spXY"`: a big-endian signed 16-bit fixed-point value with `Y` (hex) fraction bits.
    SignedFixed { frac_bits: u8 },
    /// `"fpXY"`: a big-endian unsigned 16-bit fixed-point value with `Y` (hex) fraction bits.
    UnsignedFixed { frac_bits: u8 },
    /// `"ui8 "`
    U8,
    /// `"ui16"`, big-endian.
    U16,
    /// anything else. decodes to the zero sentinel.
    Unknown,
}

// === impl Encoding ===

impl Encoding {
    /// fraction bits used when a fixed-point tag's last character is not a hex digit.
    const DEFAULT_FRAC_BITS: u8 = 8;

    /// decodes `bytes` into a float.
    ///
    /// this never fails: unknown encodings and short payloads decode to `0.0`, which callers
    /// must filter with a physical range check rather than trust.
    pub fn decode(self, bytes: &[u8]) -> f32 {
        match self {
            Self::Float => match bytes.first_chunk::<4>() {
                Some(raw) => f32::from_ne_bytes(*raw),
                None => 0.0,
            },
            Self::SignedFixed { frac_bits } => match bytes.first_chunk::<2>() {
                Some(raw) => f32::from(i16::from_be_bytes(*raw)) / scale(frac_bits),
                None => 0.0,
            },
            Self::UnsignedFixed { frac_bits } => match bytes.first_chunk::<2>() {
                Some(raw) => f32::from(u16::from_be_bytes(*raw)) / scale(frac_bits),
                None => 0.0,
            },
            Self::U8 => bytes.first().copied().map(f32::from).unwrap_or(0.0),
            Self::U16 => match bytes.first_chunk::<2>() {
                Some(raw) => f32::from(u16::from_be_bytes(*raw)),
                None => 0.0,
            },
            Self::Unknown => 0.0,
        }
    }
}

impl From<FourCc> for Encoding {
    fn from(tag: FourCc) -> Self {
        let frac_bits = |c: u8| {
            char::from(c)
                .to_digit(16)
                .map_or(Self::DEFAULT_FRAC_BITS, |d| d as u8)
        };

        match *tag.as_bytes() {
            [b'f', b'l', b't', b' '] => Self::Float,
            [b's', b'p', _, c] => Self::SignedFixed {
                frac_bits: frac_bits(c),
            },
            [b'f', b'p', _, c] => Self::UnsignedFixed {
                frac_bits: frac_bits(c),
            },
            [b'u', b'i', b'8', b' '] => Self::U8,
            [b'u', b'i', b'1', b'6'] => Self::U16,
            _ => Self::Unknown,
        }
    }
}

/// `2^frac_bits`.
fn scale(frac_bits: u8) -> f32 {
    (1u32 << frac_bits.min(15)) as f32
}

/// decodes `bytes` as the encoding named by `tag`.
pub fn decode(tag: FourCc, bytes: &[u8]) -> f32 {
    Encoding::from(tag).decode(bytes)
}

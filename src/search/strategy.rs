//! Word strategies: how a word type turns captured bytes into comparable values
//!
//! Every [`WordType`] maps to one `static` [`WordStrategy`]. A strategy holds
//! no per-search state; it describes the width, alignment and encoding of the
//! words being searched and knows how candidates map onto logical addresses.

use super::value::WordValue;
use crate::core::types::{Address, LogicalAddress, MemSize, WordType};

/// Bit-level layout of a word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    /// Low and high nibble of a byte, evaluated independently
    Nibble,
    Byte,
    LittleEndian16,
    BigEndian16,
    LittleEndian24,
    LittleEndian32,
    BigEndian32,
    /// Number of set bits in a byte
    BitCount,
    Float,
    FloatBigEndian,
    /// Upper 32 bits of a little-endian double
    Double32,
    /// Upper 32 bits of a big-endian double
    Double32BigEndian,
    /// Microsoft Binary Format single precision, exponent byte first
    Mbf32,
    /// Microsoft Binary Format single precision, exponent byte last
    Mbf32LittleEndian,
    Text,
}

/// The raw value and the comparable value of one word
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub raw: u32,
    pub value: WordValue,
}

/// Decode/compare/validate policy for one word type
#[derive(Debug, PartialEq, Eq)]
pub struct WordStrategy {
    word_type: WordType,
    encoding: Encoding,
    mem_size: MemSize,
    padding: usize,
    alignment: u64,
}

macro_rules! strategy {
    (
        $name:ident,
        $word_type:ident,
        $encoding:ident,
        $mem_size:ident,
        $padding:expr,
        $alignment:expr $(,)?
    ) => {
        static $name: WordStrategy = WordStrategy {
            word_type: WordType::$word_type,
            encoding: Encoding::$encoding,
            mem_size: MemSize::$mem_size,
            padding: $padding,
            alignment: $alignment,
        };
    };
}

strategy!(FOUR_BIT, FourBit, Nibble, NibbleLower, 0, 1);
strategy!(EIGHT_BIT, EightBit, Byte, EightBit, 0, 1);
strategy!(SIXTEEN_BIT, SixteenBit, LittleEndian16, SixteenBit, 1, 1);
strategy!(SIXTEEN_BIT_ALIGNED, SixteenBitAligned, LittleEndian16, SixteenBit, 1, 2);
strategy!(SIXTEEN_BIT_BE, SixteenBitBigEndian, BigEndian16, SixteenBitBigEndian, 1, 1);
strategy!(
    SIXTEEN_BIT_BE_ALIGNED,
    SixteenBitBigEndianAligned,
    BigEndian16,
    SixteenBitBigEndian,
    1,
    2,
);
strategy!(TWENTY_FOUR_BIT, TwentyFourBit, LittleEndian24, TwentyFourBit, 2, 1);
strategy!(THIRTY_TWO_BIT, ThirtyTwoBit, LittleEndian32, ThirtyTwoBit, 3, 1);
strategy!(THIRTY_TWO_BIT_ALIGNED, ThirtyTwoBitAligned, LittleEndian32, ThirtyTwoBit, 3, 4);
strategy!(THIRTY_TWO_BIT_BE, ThirtyTwoBitBigEndian, BigEndian32, ThirtyTwoBitBigEndian, 3, 1);
strategy!(
    THIRTY_TWO_BIT_BE_ALIGNED,
    ThirtyTwoBitBigEndianAligned,
    BigEndian32,
    ThirtyTwoBitBigEndian,
    3,
    4,
);
strategy!(BIT_COUNT, BitCount, BitCount, BitCount, 0, 1);
strategy!(FLOAT, Float, Float, Float, 3, 1);
strategy!(FLOAT_BE, FloatBigEndian, FloatBigEndian, FloatBigEndian, 3, 1);
strategy!(DOUBLE32, Double32, Double32, Double32, 3, 1);
strategy!(DOUBLE32_BE, Double32BigEndian, Double32BigEndian, Double32BigEndian, 3, 1);
strategy!(MBF32, Mbf32, Mbf32, Mbf32, 3, 1);
strategy!(MBF32_LE, Mbf32LittleEndian, Mbf32LittleEndian, Mbf32LittleEndian, 3, 1);
strategy!(ASCII_TEXT, AsciiText, Text, Text, 0, 1);

impl WordStrategy {
    /// The strategy singleton for a word type
    pub fn for_word_type(word_type: WordType) -> &'static WordStrategy {
        match word_type {
            WordType::FourBit => &FOUR_BIT,
            WordType::EightBit => &EIGHT_BIT,
            WordType::SixteenBit => &SIXTEEN_BIT,
            WordType::SixteenBitAligned => &SIXTEEN_BIT_ALIGNED,
            WordType::SixteenBitBigEndian => &SIXTEEN_BIT_BE,
            WordType::SixteenBitBigEndianAligned => &SIXTEEN_BIT_BE_ALIGNED,
            WordType::TwentyFourBit => &TWENTY_FOUR_BIT,
            WordType::ThirtyTwoBit => &THIRTY_TWO_BIT,
            WordType::ThirtyTwoBitAligned => &THIRTY_TWO_BIT_ALIGNED,
            WordType::ThirtyTwoBitBigEndian => &THIRTY_TWO_BIT_BE,
            WordType::ThirtyTwoBitBigEndianAligned => &THIRTY_TWO_BIT_BE_ALIGNED,
            WordType::BitCount => &BIT_COUNT,
            WordType::Float => &FLOAT,
            WordType::FloatBigEndian => &FLOAT_BE,
            WordType::Double32 => &DOUBLE32,
            WordType::Double32BigEndian => &DOUBLE32_BE,
            WordType::Mbf32 => &MBF32,
            WordType::Mbf32LittleEndian => &MBF32_LE,
            WordType::AsciiText => &ASCII_TEXT,
        }
    }

    pub fn word_type(&self) -> WordType {
        self.word_type
    }

    /// Size tag of the values this strategy yields (the low nibble for nibbles)
    pub fn mem_size(&self) -> MemSize {
        self.mem_size
    }

    /// Bytes beyond a word's first byte needed to decode it
    pub fn padding(&self) -> usize {
        self.padding
    }

    pub fn alignment(&self) -> u64 {
        self.alignment
    }

    pub fn is_float(&self) -> bool {
        self.word_type.is_float()
    }

    pub fn is_text(&self) -> bool {
        self.encoding == Encoding::Text
    }

    pub fn is_nibble(&self) -> bool {
        self.encoding == Encoding::Nibble
    }

    /// Number of logical addresses per byte address
    pub fn values_per_byte(&self) -> u64 {
        if self.is_nibble() {
            2
        } else {
            1
        }
    }

    pub fn is_address_valid(&self, address: Address) -> bool {
        address.is_aligned(self.alignment)
    }

    /// Logical address of a byte address; `upper` selects the high nibble
    pub fn to_logical(&self, address: Address, upper: bool) -> LogicalAddress {
        if self.is_nibble() {
            address.as_u64() * 2 + u64::from(upper)
        } else {
            address.as_u64()
        }
    }

    /// Byte address holding a logical address
    pub fn from_logical(&self, logical: LogicalAddress) -> Address {
        if self.is_nibble() {
            Address::new(logical / 2)
        } else {
            Address::new(logical)
        }
    }

    /// Size tag of the value at a logical address
    pub fn mem_size_of(&self, logical: LogicalAddress) -> MemSize {
        if self.is_nibble() && logical & 1 == 1 {
            MemSize::NibbleUpper
        } else {
            self.mem_size
        }
    }

    /// Logical address of a value described by an address and size tag
    pub fn logical_for(&self, address: Address, mem_size: MemSize) -> LogicalAddress {
        self.to_logical(address, mem_size == MemSize::NibbleUpper)
    }

    /// Number of candidates in `byte_count` candidate bytes starting at an aligned address
    pub fn adjust_initial_count(&self, byte_count: u64) -> u64 {
        byte_count.div_ceil(self.alignment) * self.values_per_byte()
    }

    /// Number of candidates whose first byte lies in `[start, start + len)`
    pub fn candidate_count(&self, start: Address, len: u64) -> u64 {
        let end = start.as_u64() + len;
        let first = start.align_up(self.alignment).as_u64();
        if len == 0 || first >= end {
            return 0;
        }

        ((end - 1 - first) / self.alignment + 1) * self.values_per_byte()
    }

    /// The `index`th candidate whose first byte lies in `[start, start + len)`
    pub fn nth_candidate(&self, start: Address, len: u64, index: u64) -> Option<LogicalAddress> {
        let per_byte = self.values_per_byte();
        let first = start.align_up(self.alignment).as_u64();
        let address = first.checked_add((index / per_byte).checked_mul(self.alignment)?)?;
        if address >= start.as_u64() + len {
            return None;
        }

        Some(self.to_logical(Address::new(address), index % per_byte == 1))
    }

    /// Decodes the word starting at `bytes[0]`. Missing bytes read as zero;
    /// the logical address only selects the nibble half.
    pub fn decode(&self, bytes: &[u8], logical: LogicalAddress) -> WordValue {
        let b = word_bytes(bytes);
        match self.encoding {
            Encoding::Nibble => WordValue::Unsigned(nibble(b[0], logical)),
            Encoding::Byte | Encoding::Text => WordValue::Unsigned(u32::from(b[0])),
            Encoding::BitCount => WordValue::Unsigned(b[0].count_ones()),
            Encoding::LittleEndian16 => {
                WordValue::Unsigned(u32::from(u16::from_le_bytes([b[0], b[1]])))
            }
            Encoding::BigEndian16 => {
                WordValue::Unsigned(u32::from(u16::from_be_bytes([b[0], b[1]])))
            }
            Encoding::LittleEndian24 => {
                WordValue::Unsigned(u32::from_le_bytes([b[0], b[1], b[2], 0]))
            }
            Encoding::LittleEndian32 => WordValue::Unsigned(u32::from_le_bytes(b)),
            Encoding::BigEndian32 => WordValue::Unsigned(u32::from_be_bytes(b)),
            Encoding::Float => WordValue::Float(f32::from_le_bytes(b)),
            Encoding::FloatBigEndian => WordValue::Float(f32::from_be_bytes(b)),
            Encoding::Double32 => WordValue::Float(double32_to_f32(u32::from_le_bytes(b))),
            Encoding::Double32BigEndian => WordValue::Float(double32_to_f32(u32::from_be_bytes(b))),
            Encoding::Mbf32 => WordValue::Float(mbf32_to_f32(b)),
            Encoding::Mbf32LittleEndian => WordValue::Float(mbf32_to_f32([b[3], b[2], b[1], b[0]])),
        }
    }

    /// The raw value of the word starting at `bytes[0]`
    ///
    /// Integers yield their decoded value, floats the little-endian bit
    /// pattern of their four bytes, bit counts and text their first byte.
    pub fn raw_value(&self, bytes: &[u8], logical: LogicalAddress) -> u32 {
        read_raw(self.mem_size_of(logical), bytes)
    }

    /// Raw and comparable value of the word starting at `bytes[0]`
    pub fn sample(&self, bytes: &[u8], logical: LogicalAddress) -> Sample {
        Sample {
            raw: self.raw_value(bytes, logical),
            value: self.decode(bytes, logical),
        }
    }

    /// Rebuilds the comparable value from a raw value
    pub fn sample_from_raw(&self, raw: u32) -> Sample {
        let value = match self.encoding {
            Encoding::Nibble | Encoding::Text => WordValue::Unsigned(raw),
            Encoding::BitCount => WordValue::Unsigned((raw & 0xFF).count_ones()),
            _ => self.decode(&raw.to_le_bytes(), 0),
        };
        Sample { raw, value }
    }

    /// Raw bit pattern a float would have in memory in this strategy's format
    pub fn encode_float(&self, value: f32) -> u32 {
        match self.encoding {
            Encoding::Float => value.to_bits(),
            Encoding::FloatBigEndian => value.to_bits().swap_bytes(),
            Encoding::Double32 => f32_to_double32(value),
            Encoding::Double32BigEndian => f32_to_double32(value).swap_bytes(),
            Encoding::Mbf32 => u32::from_le_bytes(f32_to_mbf32(value)),
            Encoding::Mbf32LittleEndian => {
                let [e, b1, b2, b3] = f32_to_mbf32(value);
                u32::from_le_bytes([b3, b2, b1, e])
            }
            _ => value as u32,
        }
    }
}

/// Reads the raw value of a word of the given size. Missing bytes read as zero.
pub fn read_raw(mem_size: MemSize, bytes: &[u8]) -> u32 {
    let b = word_bytes(bytes);
    match mem_size {
        MemSize::NibbleLower => u32::from(b[0] & 0x0F),
        MemSize::NibbleUpper => u32::from(b[0] >> 4),
        MemSize::EightBit | MemSize::BitCount | MemSize::Text => u32::from(b[0]),
        MemSize::SixteenBit => u32::from(u16::from_le_bytes([b[0], b[1]])),
        MemSize::SixteenBitBigEndian => u32::from(u16::from_be_bytes([b[0], b[1]])),
        MemSize::TwentyFourBit => u32::from_le_bytes([b[0], b[1], b[2], 0]),
        MemSize::ThirtyTwoBitBigEndian => u32::from_be_bytes(b),
        MemSize::ThirtyTwoBit
        | MemSize::Float
        | MemSize::FloatBigEndian
        | MemSize::Double32
        | MemSize::Double32BigEndian
        | MemSize::Mbf32
        | MemSize::Mbf32LittleEndian => u32::from_le_bytes(b),
    }
}

/// Stores a raw value into memory bytes; the inverse of [`read_raw`].
/// Nibbles only replace their half of `out[0]`, text only writes the first byte.
pub fn write_raw(mem_size: MemSize, raw: u32, out: &mut [u8]) {
    let bytes: [u8; 4] = match mem_size {
        MemSize::NibbleLower => {
            if let Some(byte) = out.first_mut() {
                *byte = (*byte & 0xF0) | (raw as u8 & 0x0F);
            }
            return;
        }
        MemSize::NibbleUpper => {
            if let Some(byte) = out.first_mut() {
                *byte = (*byte & 0x0F) | ((raw as u8 & 0x0F) << 4);
            }
            return;
        }
        MemSize::SixteenBitBigEndian => {
            let [hi, lo] = (raw as u16).to_be_bytes();
            [hi, lo, 0, 0]
        }
        MemSize::ThirtyTwoBitBigEndian => raw.to_be_bytes(),
        _ => raw.to_le_bytes(),
    };

    let count = match mem_size {
        MemSize::Text => 1,
        other => other.byte_count(),
    }
    .min(out.len());
    out[..count].copy_from_slice(&bytes[..count]);
}

/// Formats a raw value for display: hex for integers, decimal for floats
pub fn format_raw(raw: u32, mem_size: MemSize) -> String {
    match mem_size {
        MemSize::NibbleLower | MemSize::NibbleUpper => format!("0x{:01x}", raw),
        MemSize::EightBit | MemSize::Text => format!("0x{:02x}", raw),
        MemSize::SixteenBit | MemSize::SixteenBitBigEndian => format!("0x{:04x}", raw),
        MemSize::TwentyFourBit => format!("0x{:06x}", raw),
        MemSize::ThirtyTwoBit | MemSize::ThirtyTwoBitBigEndian => format!("0x{:08x}", raw),
        MemSize::BitCount => format!("{} ({:08b})", (raw & 0xFF).count_ones(), raw & 0xFF),
        MemSize::Float => format!("{}", f32::from_le_bytes(raw.to_le_bytes())),
        MemSize::FloatBigEndian => format!("{}", f32::from_be_bytes(raw.to_le_bytes())),
        MemSize::Double32 => format!("{}", double32_to_f32(raw)),
        MemSize::Double32BigEndian => format!("{}", double32_to_f32(raw.swap_bytes())),
        MemSize::Mbf32 => format!("{}", mbf32_to_f32(raw.to_le_bytes())),
        MemSize::Mbf32LittleEndian => {
            let [b3, b2, b1, e] = raw.to_le_bytes();
            format!("{}", mbf32_to_f32([e, b1, b2, b3]))
        }
    }
}

fn word_bytes(bytes: &[u8]) -> [u8; 4] {
    let mut word = [0u8; 4];
    let count = bytes.len().min(4);
    word[..count].copy_from_slice(&bytes[..count]);
    word
}

fn nibble(byte: u8, logical: LogicalAddress) -> u32 {
    if logical & 1 == 1 {
        u32::from(byte >> 4)
    } else {
        u32::from(byte & 0x0F)
    }
}

fn double32_to_f32(high: u32) -> f32 {
    f64::from_bits(u64::from(high) << 32) as f32
}

fn f32_to_double32(value: f32) -> u32 {
    (f64::from(value).to_bits() >> 32) as u32
}

/// `[exponent, sign | mantissa high, mantissa mid, mantissa low]`
fn mbf32_to_f32(bytes: [u8; 4]) -> f32 {
    let [exponent, b1, b2, b3] = bytes;
    if exponent == 0 {
        return 0.0;
    }

    let mantissa =
        (u32::from(b1 & 0x7F) << 16) | (u32::from(b2) << 8) | u32::from(b3) | 0x0080_0000;
    let magnitude =
        f64::from(mantissa) / f64::from(0x0080_0000u32) * 2f64.powi(i32::from(exponent) - 129);
    if b1 & 0x80 != 0 {
        -magnitude as f32
    } else {
        magnitude as f32
    }
}

fn f32_to_mbf32(value: f32) -> [u8; 4] {
    let bits = value.to_bits();
    let sign = (bits >> 31) as u8;
    let exponent = (bits >> 23) & 0xFF;
    let mut mantissa = bits & 0x007F_FFFF;

    // zero and subnormals have no MBF representation other than zero
    if exponent == 0 {
        return [0; 4];
    }

    let mut exponent = exponent + 2;
    if exponent > 0xFF {
        exponent = 0xFF;
        mantissa = 0x007F_FFFF;
    }

    [
        exponent as u8,
        (sign << 7) | ((mantissa >> 16) as u8 & 0x7F),
        (mantissa >> 8) as u8,
        mantissa as u8,
    ]
}

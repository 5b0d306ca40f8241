//! Word types selectable for a search and the value sizes they produce

use super::error::SearchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The representation a search interprets memory as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordType {
    /// Both nibbles of every byte, evaluated independently
    #[serde(alias = "nibble_lower", alias = "nibble_upper")]
    FourBit,
    EightBit,
    SixteenBit,
    SixteenBitAligned,
    SixteenBitBigEndian,
    SixteenBitBigEndianAligned,
    TwentyFourBit,
    ThirtyTwoBit,
    ThirtyTwoBitAligned,
    ThirtyTwoBitBigEndian,
    ThirtyTwoBitBigEndianAligned,
    BitCount,
    Float,
    FloatBigEndian,
    Double32,
    Double32BigEndian,
    Mbf32,
    Mbf32LittleEndian,
    AsciiText,
}

impl WordType {
    pub const ALL: [WordType; 19] = [
        WordType::FourBit,
        WordType::EightBit,
        WordType::SixteenBit,
        WordType::SixteenBitAligned,
        WordType::SixteenBitBigEndian,
        WordType::SixteenBitBigEndianAligned,
        WordType::TwentyFourBit,
        WordType::ThirtyTwoBit,
        WordType::ThirtyTwoBitAligned,
        WordType::ThirtyTwoBitBigEndian,
        WordType::ThirtyTwoBitBigEndianAligned,
        WordType::BitCount,
        WordType::Float,
        WordType::FloatBigEndian,
        WordType::Double32,
        WordType::Double32BigEndian,
        WordType::Mbf32,
        WordType::Mbf32LittleEndian,
        WordType::AsciiText,
    ];

    /// Machine name, matching the serde representation
    pub const fn name(&self) -> &'static str {
        match self {
            WordType::FourBit => "four_bit",
            WordType::EightBit => "eight_bit",
            WordType::SixteenBit => "sixteen_bit",
            WordType::SixteenBitAligned => "sixteen_bit_aligned",
            WordType::SixteenBitBigEndian => "sixteen_bit_big_endian",
            WordType::SixteenBitBigEndianAligned => "sixteen_bit_big_endian_aligned",
            WordType::TwentyFourBit => "twenty_four_bit",
            WordType::ThirtyTwoBit => "thirty_two_bit",
            WordType::ThirtyTwoBitAligned => "thirty_two_bit_aligned",
            WordType::ThirtyTwoBitBigEndian => "thirty_two_bit_big_endian",
            WordType::ThirtyTwoBitBigEndianAligned => "thirty_two_bit_big_endian_aligned",
            WordType::BitCount => "bit_count",
            WordType::Float => "float",
            WordType::FloatBigEndian => "float_big_endian",
            WordType::Double32 => "double32",
            WordType::Double32BigEndian => "double32_big_endian",
            WordType::Mbf32 => "mbf32",
            WordType::Mbf32LittleEndian => "mbf32_little_endian",
            WordType::AsciiText => "ascii_text",
        }
    }

    /// Human readable label used in session summaries
    pub const fn label(&self) -> &'static str {
        match self {
            WordType::FourBit => "4-bit",
            WordType::EightBit => "8-bit",
            WordType::SixteenBit => "16-bit",
            WordType::SixteenBitAligned => "16-bit aligned",
            WordType::SixteenBitBigEndian => "16-bit BE",
            WordType::SixteenBitBigEndianAligned => "16-bit BE aligned",
            WordType::TwentyFourBit => "24-bit",
            WordType::ThirtyTwoBit => "32-bit",
            WordType::ThirtyTwoBitAligned => "32-bit aligned",
            WordType::ThirtyTwoBitBigEndian => "32-bit BE",
            WordType::ThirtyTwoBitBigEndianAligned => "32-bit BE aligned",
            WordType::BitCount => "BitCount",
            WordType::Float => "Float",
            WordType::FloatBigEndian => "Float BE",
            WordType::Double32 => "Double32",
            WordType::Double32BigEndian => "Double32 BE",
            WordType::Mbf32 => "MBF32",
            WordType::Mbf32LittleEndian => "MBF32 LE",
            WordType::AsciiText => "ASCII Text",
        }
    }

    /// Whether filter values for this type are floating point
    pub const fn is_float(&self) -> bool {
        matches!(
            self,
            WordType::Float
                | WordType::FloatBigEndian
                | WordType::Double32
                | WordType::Double32BigEndian
                | WordType::Mbf32
                | WordType::Mbf32LittleEndian
        )
    }

    /// Whether filter values for this type are strings
    pub const fn is_text(&self) -> bool {
        matches!(self, WordType::AsciiText)
    }
}

impl FromStr for WordType {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");

        let alias = match normalized.as_str() {
            "nibble_lower" | "nibble_upper" | "4_bit_low" | "4_bit_high" | "4_bit" => {
                Some(WordType::FourBit)
            }
            "8_bit" => Some(WordType::EightBit),
            "16_bit" => Some(WordType::SixteenBit),
            "24_bit" => Some(WordType::TwentyFourBit),
            "32_bit" => Some(WordType::ThirtyTwoBit),
            "text" | "ascii" => Some(WordType::AsciiText),
            _ => None,
        };

        alias
            .or_else(|| WordType::ALL.into_iter().find(|t| t.name() == normalized))
            .ok_or_else(|| SearchError::UnknownWordType(s.to_string()))
    }
}

impl fmt::Display for WordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Size/format tag of a single decoded value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemSize {
    NibbleLower,
    NibbleUpper,
    EightBit,
    SixteenBit,
    SixteenBitBigEndian,
    TwentyFourBit,
    ThirtyTwoBit,
    ThirtyTwoBitBigEndian,
    BitCount,
    Float,
    FloatBigEndian,
    Double32,
    Double32BigEndian,
    Mbf32,
    Mbf32LittleEndian,
    Text,
}

impl MemSize {
    /// Number of bytes a value of this size is read from
    pub const fn byte_count(&self) -> usize {
        match self {
            MemSize::NibbleLower | MemSize::NibbleUpper | MemSize::EightBit | MemSize::BitCount => {
                1
            }
            MemSize::SixteenBit | MemSize::SixteenBitBigEndian => 2,
            MemSize::TwentyFourBit => 3,
            MemSize::ThirtyTwoBit
            | MemSize::ThirtyTwoBitBigEndian
            | MemSize::Float
            | MemSize::FloatBigEndian
            | MemSize::Double32
            | MemSize::Double32BigEndian
            | MemSize::Mbf32
            | MemSize::Mbf32LittleEndian => 4,
            // leading window used when rendering text candidates
            MemSize::Text => 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_type_parsing() {
        assert_eq!("eight_bit".parse::<WordType>().unwrap(), WordType::EightBit);
        assert_eq!("16-bit".parse::<WordType>().unwrap(), WordType::SixteenBit);
        assert_eq!("4-bit-low".parse::<WordType>().unwrap(), WordType::FourBit);
        assert_eq!("nibble_upper".parse::<WordType>().unwrap(), WordType::FourBit);
        assert_eq!(
            "Thirty-Two-Bit-Big-Endian-Aligned".parse::<WordType>().unwrap(),
            WordType::ThirtyTwoBitBigEndianAligned
        );
        assert!(matches!(
            "twelve_bit".parse::<WordType>(),
            Err(SearchError::UnknownWordType(_))
        ));
    }

    #[test]
    fn test_word_type_names_round_trip() {
        for word_type in WordType::ALL {
            assert_eq!(word_type.name().parse::<WordType>().unwrap(), word_type);
        }
    }

    #[test]
    fn test_word_type_serde_aliases() {
        let parsed: WordType = serde_json::from_str("\"nibble_lower\"").unwrap();
        assert_eq!(parsed, WordType::FourBit);
        assert_eq!(
            serde_json::to_string(&WordType::Double32BigEndian).unwrap(),
            "\"double32_big_endian\""
        );
    }

    #[test]
    fn test_word_type_categories() {
        assert!(WordType::Mbf32.is_float());
        assert!(!WordType::ThirtyTwoBit.is_float());
        assert!(WordType::AsciiText.is_text());
        assert_eq!(WordType::SixteenBit.to_string(), "16-bit");
    }

    #[test]
    fn test_mem_size_byte_count() {
        assert_eq!(MemSize::NibbleUpper.byte_count(), 1);
        assert_eq!(MemSize::TwentyFourBit.byte_count(), 3);
        assert_eq!(MemSize::Mbf32LittleEndian.byte_count(), 4);
    }
}

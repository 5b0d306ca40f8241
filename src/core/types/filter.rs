//! Filter descriptions: what a filter pass compares and against what

use super::error::{SearchError, SearchResult};
use super::word::WordType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison applied between the current value and the filter operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonType {
    #[default]
    Equals,
    NotEqualTo,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl ComparisonType {
    /// Evaluates `left <op> right`
    pub fn compare<T: PartialOrd>(self, left: T, right: T) -> bool {
        match self {
            ComparisonType::Equals => left == right,
            ComparisonType::NotEqualTo => left != right,
            ComparisonType::LessThan => left < right,
            ComparisonType::LessThanOrEqual => left <= right,
            ComparisonType::GreaterThan => left > right,
            ComparisonType::GreaterThanOrEqual => left >= right,
        }
    }

    /// Whether two identical operands satisfy this comparison
    pub const fn accepts_equal(self) -> bool {
        matches!(
            self,
            ComparisonType::Equals
                | ComparisonType::LessThanOrEqual
                | ComparisonType::GreaterThanOrEqual
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            ComparisonType::Equals => "EQUAL",
            ComparisonType::NotEqualTo => "NOT EQUAL",
            ComparisonType::LessThan => "LESS THAN",
            ComparisonType::LessThanOrEqual => "LESS THAN/EQUAL",
            ComparisonType::GreaterThan => "GREATER THAN",
            ComparisonType::GreaterThanOrEqual => "GREATER THAN/EQUAL",
        }
    }
}

/// What the current value is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// No filter applied (fresh capture)
    #[default]
    None,
    Constant,
    InitialValue,
    LastKnownValue,
    LastKnownValuePlus,
    LastKnownValueMinus,
}

impl FilterType {
    /// Checks if this filter type compares against previously captured memory
    pub const fn uses_previous_value(&self) -> bool {
        matches!(
            self,
            FilterType::InitialValue
                | FilterType::LastKnownValue
                | FilterType::LastKnownValuePlus
                | FilterType::LastKnownValueMinus
        )
    }

    /// Checks if this filter type needs a value from the user
    pub const fn requires_value(&self) -> bool {
        matches!(
            self,
            FilterType::Constant | FilterType::LastKnownValuePlus | FilterType::LastKnownValueMinus
        )
    }
}

/// Operand supplied with a filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FilterValue {
    Integer(u32),
    Float(f32),
    Text(String),
}

impl Default for FilterValue {
    fn default() -> Self {
        FilterValue::Integer(0)
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Integer(v) => write!(f, "{}", v),
            FilterValue::Float(v) => write!(f, "{}", v),
            FilterValue::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// A complete filter: comparison, filter type and operand
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchFilter {
    pub comparison: ComparisonType,
    pub filter_type: FilterType,
    #[serde(default)]
    pub value: FilterValue,
}

impl SearchFilter {
    pub fn new(comparison: ComparisonType, filter_type: FilterType, value: FilterValue) -> Self {
        SearchFilter {
            comparison,
            filter_type,
            value,
        }
    }

    /// Compare against a constant number
    pub fn constant(comparison: ComparisonType, value: u32) -> Self {
        Self::new(comparison, FilterType::Constant, FilterValue::Integer(value))
    }

    /// Compare against a constant floating point number
    pub fn constant_float(comparison: ComparisonType, value: f32) -> Self {
        Self::new(comparison, FilterType::Constant, FilterValue::Float(value))
    }

    /// Compare against a constant string
    pub fn constant_text(comparison: ComparisonType, text: impl Into<String>) -> Self {
        Self::new(comparison, FilterType::Constant, FilterValue::Text(text.into()))
    }

    /// Compare against the value captured by the source session
    pub fn last_known(comparison: ComparisonType) -> Self {
        Self::new(comparison, FilterType::LastKnownValue, FilterValue::default())
    }

    /// Compare against the value captured by the source session
    pub fn initial(comparison: ComparisonType) -> Self {
        Self::new(comparison, FilterType::InitialValue, FilterValue::default())
    }

    /// Compare against the captured value plus `delta`
    pub fn last_known_plus(comparison: ComparisonType, delta: u32) -> Self {
        Self::new(comparison, FilterType::LastKnownValuePlus, FilterValue::Integer(delta))
    }

    /// Compare against the captured value minus `delta`
    pub fn last_known_minus(comparison: ComparisonType, delta: u32) -> Self {
        Self::new(comparison, FilterType::LastKnownValueMinus, FilterValue::Integer(delta))
    }

    /// Builds a filter from user input, validating the operand for the word type.
    ///
    /// Integers are read as decimal first and hex second (`0x`/`$` prefixes are
    /// accepted), floats as `f32`, text verbatim. An empty operand is only
    /// allowed when the filter type does not need one.
    pub fn parse(
        word_type: WordType,
        comparison: ComparisonType,
        filter_type: FilterType,
        input: &str,
    ) -> SearchResult<Self> {
        let value = Self::parse_value(word_type, filter_type, input)?;
        Ok(Self::new(comparison, filter_type, value))
    }

    /// Validates and converts the operand of a filter
    pub fn parse_value(
        word_type: WordType,
        filter_type: FilterType,
        input: &str,
    ) -> SearchResult<FilterValue> {
        if word_type.is_text() {
            if matches!(
                filter_type,
                FilterType::LastKnownValuePlus | FilterType::LastKnownValueMinus
            ) {
                return Err(SearchError::UnsupportedFilter(
                    "text searches cannot adjust the last known value".to_string(),
                ));
            }
            if input.is_empty() && filter_type == FilterType::Constant {
                return Err(SearchError::invalid_filter_value(input, "cannot match 0 characters"));
            }
            return Ok(FilterValue::Text(input.to_string()));
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            if filter_type.requires_value() {
                return Err(SearchError::invalid_filter_value(input, "a value is required"));
            }
            return Ok(if word_type.is_float() {
                FilterValue::Float(0.0)
            } else {
                FilterValue::Integer(0)
            });
        }

        if word_type.is_float() {
            return trimmed
                .parse::<f32>()
                .map(FilterValue::Float)
                .map_err(|_| SearchError::invalid_filter_value(input, "not a number"));
        }

        parse_integer(trimmed)
            .map(FilterValue::Integer)
            .ok_or_else(|| SearchError::invalid_filter_value(input, "not a decimal or hex number"))
    }

    /// Short description of the operand, as used in summaries
    pub fn describe_operand(&self) -> String {
        match self.filter_type {
            FilterType::None => String::new(),
            FilterType::Constant => self.value.to_string(),
            FilterType::InitialValue => "initial value".to_string(),
            FilterType::LastKnownValue => "last known value".to_string(),
            FilterType::LastKnownValuePlus => format!("last known value plus {}", self.value),
            FilterType::LastKnownValueMinus => format!("last known value minus {}", self.value),
        }
    }
}

fn parse_integer(s: &str) -> Option<u32> {
    if let Some(hex) = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix('$'))
    {
        return u32::from_str_radix(hex, 16).ok();
    }

    if let Some(negative) = s.strip_prefix('-') {
        return negative
            .parse::<u32>()
            .ok()
            .and_then(|v| i32::try_from(v).ok())
            .map(|v| (-v) as u32);
    }

    s.parse::<u32>()
        .ok()
        .or_else(|| u32::from_str_radix(s, 16).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparisons() {
        assert!(ComparisonType::Equals.compare(3, 3));
        assert!(ComparisonType::NotEqualTo.compare(3, 4));
        assert!(ComparisonType::LessThan.compare(3, 4));
        assert!(ComparisonType::LessThanOrEqual.compare(4, 4));
        assert!(ComparisonType::GreaterThan.compare(5.0f32, 4.5));
        assert!(ComparisonType::GreaterThanOrEqual.compare(b'b', b'a'));
        assert!(!ComparisonType::GreaterThan.compare(4, 4));

        assert!(ComparisonType::LessThanOrEqual.accepts_equal());
        assert!(!ComparisonType::NotEqualTo.accepts_equal());
    }

    #[test]
    fn test_filter_type_flags() {
        assert!(FilterType::InitialValue.uses_previous_value());
        assert!(!FilterType::Constant.uses_previous_value());
        assert!(FilterType::LastKnownValueMinus.requires_value());
        assert!(!FilterType::LastKnownValue.requires_value());
    }

    #[test]
    fn test_parse_integer_values() {
        let parse = |s| SearchFilter::parse_value(WordType::EightBit, FilterType::Constant, s);
        assert_eq!(parse("171").unwrap(), FilterValue::Integer(171));
        assert_eq!(parse("0xAB").unwrap(), FilterValue::Integer(0xAB));
        assert_eq!(parse("$ab").unwrap(), FilterValue::Integer(0xAB));
        assert_eq!(parse("AB").unwrap(), FilterValue::Integer(0xAB));
        assert_eq!(parse("-1").unwrap(), FilterValue::Integer(u32::MAX));
        assert!(parse("12g").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn test_parse_optional_values() {
        let value = SearchFilter::parse_value(WordType::SixteenBit, FilterType::LastKnownValue, "");
        assert_eq!(value.unwrap(), FilterValue::Integer(0));

        let value = SearchFilter::parse_value(WordType::Float, FilterType::InitialValue, "");
        assert_eq!(value.unwrap(), FilterValue::Float(0.0));
    }

    #[test]
    fn test_parse_float_values() {
        let value = SearchFilter::parse_value(WordType::Float, FilterType::Constant, "1.5");
        assert_eq!(value.unwrap(), FilterValue::Float(1.5));
        assert!(SearchFilter::parse_value(WordType::Mbf32, FilterType::Constant, "abc").is_err());
    }

    #[test]
    fn test_parse_text_values() {
        let value =
            SearchFilter::parse_value(WordType::AsciiText, FilterType::Constant, "WORLD").unwrap();
        assert_eq!(value, FilterValue::Text("WORLD".to_string()));

        assert!(SearchFilter::parse_value(WordType::AsciiText, FilterType::Constant, "").is_err());
        assert!(matches!(
            SearchFilter::parse_value(WordType::AsciiText, FilterType::LastKnownValuePlus, "1"),
            Err(SearchError::UnsupportedFilter(_))
        ));
        assert!(
            SearchFilter::parse_value(WordType::AsciiText, FilterType::LastKnownValue, "").is_ok()
        );
    }

    #[test]
    fn test_describe_operand() {
        assert_eq!(
            SearchFilter::constant(ComparisonType::Equals, 171).describe_operand(),
            "171"
        );
        assert_eq!(
            SearchFilter::last_known(ComparisonType::NotEqualTo).describe_operand(),
            "last known value"
        );
        assert_eq!(
            SearchFilter::last_known_plus(ComparisonType::Equals, 2).describe_operand(),
            "last known value plus 2"
        );
        assert_eq!(
            SearchFilter::constant_text(ComparisonType::Equals, "HI").describe_operand(),
            "\"HI\""
        );
    }

    #[test]
    fn test_parse_full_filter() {
        let filter = SearchFilter::parse(
            WordType::SixteenBit,
            ComparisonType::GreaterThan,
            FilterType::LastKnownValueMinus,
            "3",
        )
        .unwrap();
        assert_eq!(filter, SearchFilter::last_known_minus(ComparisonType::GreaterThan, 3));
    }
}

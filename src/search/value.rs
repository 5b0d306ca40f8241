//! Decoded word values and the arithmetic filters apply to them

use crate::core::types::{FilterType, FilterValue};
use std::fmt;

/// A decoded word: either an unsigned integer or a float
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum WordValue {
    Unsigned(u32),
    Float(f32),
}

impl WordValue {
    /// Applies the `LastKnownValuePlus`/`Minus` adjustment. Integers wrap in
    /// 32 bits, floats use float arithmetic. Other filter types return the
    /// value unchanged.
    pub fn adjusted(self, filter_type: FilterType, delta: &FilterValue) -> WordValue {
        let negate = match filter_type {
            FilterType::LastKnownValuePlus => false,
            FilterType::LastKnownValueMinus => true,
            _ => return self,
        };

        match self {
            WordValue::Unsigned(value) => {
                let delta = match delta {
                    FilterValue::Integer(d) => *d,
                    FilterValue::Float(d) => *d as u32,
                    FilterValue::Text(_) => 0,
                };
                if negate {
                    WordValue::Unsigned(value.wrapping_sub(delta))
                } else {
                    WordValue::Unsigned(value.wrapping_add(delta))
                }
            }
            WordValue::Float(value) => {
                let delta = match delta {
                    FilterValue::Integer(d) => *d as f32,
                    FilterValue::Float(d) => *d,
                    FilterValue::Text(_) => 0.0,
                };
                if negate {
                    WordValue::Float(value - delta)
                } else {
                    WordValue::Float(value + delta)
                }
            }
        }
    }
}

/// Whether an adjustment operand is zero (or absent)
pub fn is_zero_delta(delta: &FilterValue) -> bool {
    match delta {
        FilterValue::Integer(d) => *d == 0,
        FilterValue::Float(d) => *d == 0.0,
        FilterValue::Text(_) => true,
    }
}

impl fmt::Display for WordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordValue::Unsigned(v) => write!(f, "{}", v),
            WordValue::Float(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_adjustment_wraps() {
        let value = WordValue::Unsigned(0);
        assert_eq!(
            value.adjusted(FilterType::LastKnownValueMinus, &FilterValue::Integer(1)),
            WordValue::Unsigned(u32::MAX)
        );
        assert_eq!(
            WordValue::Unsigned(u32::MAX).adjusted(
                FilterType::LastKnownValuePlus,
                &FilterValue::Integer(2),
            ),
            WordValue::Unsigned(1)
        );
        // no truncation to the word width
        assert_eq!(
            WordValue::Unsigned(0xFF).adjusted(
                FilterType::LastKnownValuePlus,
                &FilterValue::Integer(1),
            ),
            WordValue::Unsigned(0x100)
        );
    }

    #[test]
    fn test_float_adjustment() {
        let value = WordValue::Float(1.5);
        assert_eq!(
            value.adjusted(FilterType::LastKnownValuePlus, &FilterValue::Float(0.25)),
            WordValue::Float(1.75)
        );
        assert_eq!(
            value.adjusted(FilterType::LastKnownValueMinus, &FilterValue::Integer(1)),
            WordValue::Float(0.5)
        );
    }

    #[test]
    fn test_non_adjusting_filters() {
        let value = WordValue::Unsigned(7);
        assert_eq!(value.adjusted(FilterType::LastKnownValue, &FilterValue::Integer(3)), value);
        assert_eq!(value.adjusted(FilterType::Constant, &FilterValue::Integer(3)), value);
    }

    #[test]
    fn test_zero_delta() {
        assert!(is_zero_delta(&FilterValue::Integer(0)));
        assert!(is_zero_delta(&FilterValue::Float(-0.0)));
        assert!(!is_zero_delta(&FilterValue::Integer(2)));
    }

    #[test]
    fn test_value_ordering() {
        assert!(WordValue::Unsigned(3) < WordValue::Unsigned(4));
        assert!(WordValue::Float(-1.0) < WordValue::Float(0.5));
        assert!(WordValue::Float(f32::NAN) != WordValue::Float(f32::NAN));
        assert_eq!(WordValue::Float(2.5).to_string(), "2.5");
    }
}

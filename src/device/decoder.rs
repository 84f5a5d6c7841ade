use std::collections::VecDeque;

use crate::device::types::{Field, Measurement};
use crate::error::DecodeError;

/**
 * Minimum frame length: reserved slot, battery digit, squeeze digit and at least one strength character.
 */
pub const MIN_FRAME_LEN: usize = 4;

// The device sends one character per field slot, so a frame is read front to back as a queue:
// [reserved] [battery digit] [squeeze digit] [strength ...]
pub fn decode(frame: &[u8]) -> Result<Measurement, DecodeError> {
    let mut chars: VecDeque<char> = frame.iter().map(|&byte| char::from(byte)).collect();

    if chars.len() < MIN_FRAME_LEN {
        return Err(DecodeError::TooShort { len: chars.len() });
    }

    let (Some(_reserved), Some(raw_battery), Some(raw_squeeze)) =
        (chars.pop_front(), chars.pop_front(), chars.pop_front())
    else {
        return Err(DecodeError::TooShort { len: frame.len() });
    };

    let battery_charge = parse_battery_charge(raw_battery)?;
    let is_squeezing = parse_squeezing(raw_squeeze)?;
    let strength = parse_strength(chars)?;

    Ok(Measurement { strength, is_squeezing, battery_charge })
}

fn parse_digit(raw: char, field: Field) -> Result<u8, DecodeError> {
    raw.to_digit(10)
        .map(|digit| digit as u8)
        .ok_or_else(|| DecodeError::InvalidField { field, value: raw.to_string() })
}

// digit 0 => 10%, digit 9 => 100%
fn parse_battery_charge(raw: char) -> Result<u8, DecodeError> {
    let digit = parse_digit(raw, Field::Battery)?;
    Ok(10 * (digit + 1))
}

fn parse_squeezing(raw: char) -> Result<bool, DecodeError> {
    Ok(parse_digit(raw, Field::Squeeze)? != 0)
}

// whitespace, plus the ASCII file/group/record/unit separators U+001C..U+001F
fn is_padding(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/**
 * Above this magnitude every f64 is a whole number, so rounding to one decimal is a no-op.
 */
const ROUNDING_LIMIT: f64 = 4503599627370496.0; // 2^52

fn parse_strength(chars: VecDeque<char>) -> Result<f64, DecodeError> {
    let raw: String = chars.into_iter().collect();
    let cleaned = raw.replace('\0', "");
    let cleaned = cleaned.trim_matches(is_padding);

    let invalid = || DecodeError::InvalidField { field: Field::Strength, value: raw.clone() };

    let value: f64 = cleaned.parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }

    if value.abs() >= ROUNDING_LIMIT {
        return Ok(value);
    }
    Ok((value * 10.0).round() / 10.0)
}

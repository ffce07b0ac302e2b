//! Turns the raw text of a comparison argument into a typed [`Value`].

use crate::{
    error::CastError,
    value::{Value, ValueType},
};
use jiff::{Timestamp, Zoned, fmt::temporal::SpanParser};
use rust_decimal::Decimal;

/// Timestamps with a mandatory fraction and a numeric offset, e.g.
/// `2014-11-20T10:15:30.000+0100`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%f%z";

static SPAN_PARSER: SpanParser = SpanParser::new();

pub fn cast(target: &ValueType, raw: &str) -> Result<Value, CastError> {
    match target {
        ValueType::Timestamp => cast_timestamp(raw).map(Value::Timestamp),
        ValueType::Decimal => cast_decimal(raw).map(Value::Decimal),
        other => cast_primitive(other, raw),
    }
}

/// Strict timestamp first. The last `:` of the input is dropped before that
/// attempt so `+01:00` offsets match `%z`. Anything that does not parse is
/// read as an ISO-8601 duration and added to the current time.
pub fn cast_timestamp(raw: &str) -> Result<Timestamp, CastError> {
    let normalized = match raw.rfind(':') {
        Some(at) => format!("{}{}", &raw[..at], &raw[at + 1..]),
        None => raw.to_string(),
    };
    match Timestamp::strptime(TIMESTAMP_FORMAT, &normalized) {
        Ok(timestamp) => Ok(timestamp),
        Err(strict) => from_now(raw).map_err(|duration| CastError::Date {
            raw: raw.to_string(),
            strict,
            duration,
        }),
    }
}

// ISO-8601 only (`P1D`, `-PT2H`); jiff's friendly `1 day` is refused.
fn from_now(raw: &str) -> Result<Timestamp, jiff::Error> {
    let span = SPAN_PARSER.parse_span(raw)?;
    Ok(Zoned::now().checked_add(span)?.timestamp())
}

/// Plain (`1500000.50`) or scientific (`1.5e6`) notation.
///
/// Values are kept exactly: anything needing more than 28 significant digits
/// or 28 fractional digits fails instead of being rounded.
pub fn cast_decimal(raw: &str) -> Result<Decimal, CastError> {
    exact_decimal(raw).map_err(|source| CastError::Numeric {
        raw: raw.to_string(),
        source,
    })
}

fn exact_decimal(raw: &str) -> Result<Decimal, rust_decimal::Error> {
    let Some((mantissa, exponent)) = raw.split_once(['e', 'E']) else {
        return Decimal::from_str_exact(raw);
    };
    let mut value = Decimal::from_str_exact(mantissa)?.normalize();
    let exponent: i64 = exponent.parse().map_err(|_| {
        rust_decimal::Error::ErrorString(format!("invalid exponent {exponent:?}"))
    })?;
    if value.is_zero() {
        return Ok(value);
    }

    // value * 10^exponent, moving the decimal point first and only
    // multiplying once there is no scale left to shrink.
    let scale = i64::from(value.scale())
        .checked_sub(exponent)
        .ok_or(rust_decimal::Error::ExceedsMaximumPossibleValue)?;
    if scale >= 0 {
        let scale = u32::try_from(scale).map_err(|_| rust_decimal::Error::Underflow)?;
        value.set_scale(scale)?;
        return Ok(value);
    }
    value.set_scale(0)?;
    for _ in 0..scale.unsigned_abs() {
        value = value
            .checked_mul(Decimal::TEN)
            .ok_or(rust_decimal::Error::ExceedsMaximumPossibleValue)?;
    }
    Ok(value)
}

fn cast_primitive(target: &ValueType, raw: &str) -> Result<Value, CastError> {
    let value = match target {
        ValueType::Text => Some(Value::Text(raw.to_string())),
        ValueType::Char => single_char(raw).map(Value::Char),
        ValueType::Bool => parse_bool(raw).map(Value::Bool),
        ValueType::I8 => raw.parse().ok().map(Value::I8),
        ValueType::I16 => raw.parse().ok().map(Value::I16),
        ValueType::I32 => raw.parse().ok().map(Value::I32),
        ValueType::I64 => raw.parse().ok().map(Value::I64),
        ValueType::U8 => raw.parse().ok().map(Value::U8),
        ValueType::U16 => raw.parse().ok().map(Value::U16),
        ValueType::U32 => raw.parse().ok().map(Value::U32),
        ValueType::U64 => raw.parse().ok().map(Value::U64),
        ValueType::F32 => raw.parse().ok().map(Value::F32),
        ValueType::F64 => raw.parse().ok().map(Value::F64),
        ValueType::Decimal | ValueType::Timestamp | ValueType::Record(_) => None,
    };
    value.ok_or_else(|| CastError::Primitive {
        raw: raw.to_string(),
        target: target.to_string(),
    })
}

fn single_char(raw: &str) -> Option<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

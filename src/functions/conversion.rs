use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::{locale, utils::*};
use crate::{
    config::Options,
    error::{Error, ExpressionResult},
    expression::{ExpressionEvaluator, ExpressionType, ReturnType},
    value::{format_iso, Value},
};

const DATA_URI_PREFIX: &str = "data:text/plain;charset=utf-8;base64,";

fn to_float(args: &[Value]) -> ExpressionResult<Value> {
    match &args[0] {
        Value::Integer(i) => Ok(Value::Float(*i as f64)),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| Error::evaluation(format!("parameter {} is not a valid number string.", s))),
        other => Err(Error::evaluation(format!(
            "{} is not a valid number.",
            other
        ))),
    }
}

fn to_int(args: &[Value]) -> ExpressionResult<Value> {
    match &args[0] {
        Value::Integer(i) => Ok(Value::Integer(*i)),
        Value::Float(f) if f.is_finite() && f.abs() < i64::MAX as f64 => {
            Ok(Value::Integer(f.round_ties_even() as i64))
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| Error::evaluation(format!("parameter {} is not a valid number string.", s))),
        other => Err(Error::evaluation(format!(
            "{} is not a valid integer.",
            other
        ))),
    }
}

/// `string()` keeps float fractions and renders containers as JSON.
pub(crate) fn to_string_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::DateTime(dt) => format_iso(dt),
        Value::Binary(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        other => other.to_json_string(),
    }
}

fn bytes_of(value: &Value) -> Vec<u8> {
    match value {
        Value::Binary(bytes) => bytes.clone(),
        Value::Null => Vec::new(),
        other => to_string_value(other).into_bytes(),
    }
}

fn decode_base64(text: &str) -> ExpressionResult<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| Error::evaluation(format!("{} is not a valid base64 string: {}", text, e)))
}

fn utf8(bytes: Vec<u8>) -> ExpressionResult<Value> {
    String::from_utf8(bytes)
        .map(Value::String)
        .map_err(|e| Error::evaluation(format!("decoded bytes are not valid UTF-8: {}", e)))
}

/// Splits `data:<media>;base64,<payload>` and decodes the payload.
fn decode_data_uri(text: &str) -> Option<ExpressionResult<Vec<u8>>> {
    let rest = text.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    if header.ends_with(";base64") {
        Some(decode_base64(payload))
    } else {
        Some(percent_decode(payload))
    }
}

fn data_uri_to_binary(args: &[Value]) -> ExpressionResult<Value> {
    let text = parse_string_or_null(&args[0]);
    match decode_data_uri(&text) {
        Some(decoded) => decoded.map(Value::Binary),
        None => Ok(Value::Binary(text.into_bytes())),
    }
}

fn data_uri_to_string(args: &[Value]) -> ExpressionResult<Value> {
    let text = parse_string_or_null(&args[0]);
    let decoded = decode_data_uri(&text)
        .ok_or_else(|| Error::evaluation(format!("{} is not a valid data URI.", text)))??;
    utf8(decoded)
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~')
}

pub(crate) fn percent_encode(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for byte in text.bytes() {
        if is_unreserved(byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

pub(crate) fn percent_decode(text: &str) -> ExpressionResult<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = text
                .get(i + 1..i + 3)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| {
                    Error::evaluation(format!("{} is not a valid uri component.", text))
                })?;
            decoded.push(hex);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    Ok(decoded)
}

/// Groups integer digits in threes with the culture's separators.
fn format_number(args: &[Value], options: &Options) -> ExpressionResult<Value> {
    let number = args[0]
        .as_f64()
        .ok_or_else(|| Error::evaluation(format!("{} is not a number.", args[0])))?;
    let precision = match &args[1] {
        Value::Integer(p) if *p >= 0 && *p <= 15 => *p as usize,
        Value::Float(p) if p.fract() == 0.0 && *p >= 0.0 && *p <= 15.0 => *p as usize,
        other => {
            return Err(Error::evaluation(format!(
                "{} is not a valid precision: it must be an integer between 0 and 15.",
                other
            )))
        }
    };
    let locale = match args.get(2) {
        None => locale::lookup(options.locale.as_deref()),
        Some(Value::String(name)) => locale::lookup(Some(name)),
        Some(other) => {
            return Err(Error::evaluation(format!(
                "{} should be a locale string.",
                other
            )))
        }
    };

    let scale = 10f64.powi(precision as i32);
    let rounded = (number.abs() * scale).round() / scale;
    let fixed = format!("{:.*}", precision, rounded);
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::new();
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push_str(locale.group_separator);
        }
        grouped.push(digit);
    }
    let sign = if number < 0.0 && rounded != 0.0 { "-" } else { "" };
    let text = if fraction.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}{}{}", sign, grouped, locale.decimal_separator, fraction)
    };
    Ok(Value::String(text))
}

pub(super) fn evaluators() -> Vec<ExpressionEvaluator> {
    vec![
        ExpressionEvaluator::new(
            ExpressionType::Float.as_ref(),
            apply_with_error(to_float, None),
            ReturnType::NUMBER,
            validate_unary,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Int.as_ref(),
            apply_with_error(to_int, None),
            ReturnType::NUMBER,
            validate_unary,
        ),
        ExpressionEvaluator::new(
            ExpressionType::String.as_ref(),
            apply(|args| Value::String(to_string_value(&args[0])), None),
            ReturnType::STRING,
            |e| validate_order(e, &[ReturnType::STRING], &[ReturnType::OBJECT]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::Array.as_ref(),
            apply(|args| Value::List(vec![args[0].clone()]), Some(verify_string)),
            ReturnType::ARRAY,
            validate_unary_string,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Binary.as_ref(),
            apply(|args| Value::Binary(bytes_of(&args[0])), None),
            ReturnType::OBJECT,
            validate_unary,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Base64.as_ref(),
            apply(|args| Value::String(STANDARD.encode(bytes_of(&args[0]))), None),
            ReturnType::STRING,
            validate_unary,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Base64ToBinary.as_ref(),
            apply_with_error(
                |args| decode_base64(&parse_string_or_null(&args[0])).map(Value::Binary),
                Some(verify_string),
            ),
            ReturnType::OBJECT,
            validate_unary_string,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Base64ToString.as_ref(),
            apply_with_error(
                |args| utf8(decode_base64(&parse_string_or_null(&args[0]))?),
                Some(verify_string),
            ),
            ReturnType::STRING,
            validate_unary_string,
        ),
        ExpressionEvaluator::new(
            ExpressionType::DataUri.as_ref(),
            apply(
                |args| match &args[0] {
                    Value::Binary(bytes) => Value::String(format!(
                        "data:application/octet-stream;base64,{}",
                        STANDARD.encode(bytes)
                    )),
                    other => Value::String(format!(
                        "{}{}",
                        DATA_URI_PREFIX,
                        STANDARD.encode(bytes_of(other))
                    )),
                },
                None,
            ),
            ReturnType::STRING,
            validate_unary,
        ),
        ExpressionEvaluator::new(
            ExpressionType::DataUriToBinary.as_ref(),
            apply_with_error(data_uri_to_binary, Some(verify_string)),
            ReturnType::OBJECT,
            validate_unary_string,
        ),
        ExpressionEvaluator::new(
            ExpressionType::DataUriToString.as_ref(),
            apply_with_error(data_uri_to_string, Some(verify_string)),
            ReturnType::STRING,
            validate_unary_string,
        ),
        ExpressionEvaluator::new(
            ExpressionType::UriComponent.as_ref(),
            apply(
                |args| Value::String(percent_encode(&parse_string_or_null(&args[0]))),
                Some(verify_string),
            ),
            ReturnType::STRING,
            validate_unary_string,
        ),
        ExpressionEvaluator::new(
            ExpressionType::UriComponentToString.as_ref(),
            apply_with_error(
                |args| utf8(percent_decode(&parse_string_or_null(&args[0]))?),
                Some(verify_string),
            ),
            ReturnType::STRING,
            validate_unary_string,
        ),
        ExpressionEvaluator::new(
            ExpressionType::JsonStringify.as_ref(),
            apply(|args| Value::String(args[0].to_json().to_string()), None),
            ReturnType::STRING,
            validate_unary,
        ),
        ExpressionEvaluator::new(
            ExpressionType::FormatNumber.as_ref(),
            apply_with_options_and_error(format_number, None),
            ReturnType::STRING,
            |e| {
                validate_order(
                    e,
                    &[ReturnType::STRING],
                    &[ReturnType::NUMBER, ReturnType::NUMBER],
                )
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_conversions() {
        assert_eq!(to_float(&[Value::from("10.333")]).unwrap(), Value::Float(10.333));
        assert_eq!(to_int(&[Value::from("10")]).unwrap(), Value::Integer(10));
        assert_eq!(to_int(&[Value::Float(2.5)]).unwrap(), Value::Integer(2));
        assert!(to_int(&[Value::from("ten")]).is_err());
    }

    #[test]
    fn test_string_keeps_fraction() {
        assert_eq!(to_string_value(&Value::Float(1.0)), "1.0");
        assert_eq!(to_string_value(&Value::Boolean(true)), "true");
        assert_eq!(
            to_string_value(&Value::from_json_str(r#"{"a": "b"}"#).unwrap()),
            r#"{"a":"b"}"#
        );
    }

    #[test]
    fn test_uri_component_round_trip() {
        assert_eq!(percent_encode("http://contoso.com"), "http%3A%2F%2Fcontoso.com");
        assert_eq!(
            percent_decode("http%3A%2F%2Fcontoso.com").unwrap(),
            b"http://contoso.com".to_vec()
        );
        assert!(percent_decode("%zz").is_err());
    }

    #[test]
    fn test_data_uri() {
        assert_eq!(
            data_uri_to_string(&[Value::from(
                "data:text/plain;charset=utf-8;base64,aGVsbG8="
            )])
            .unwrap(),
            Value::from("hello")
        );
        assert_eq!(
            data_uri_to_binary(&[Value::from("aGVsbG8=")]).unwrap(),
            Value::Binary(b"aGVsbG8=".to_vec())
        );
    }

    #[test]
    fn test_format_number() {
        let format = |args: &[Value]| format_number(args, &Options::new()).unwrap();
        assert_eq!(
            format(&[Value::Float(20.0), Value::Integer(2)]),
            Value::from("20.00")
        );
        assert_eq!(
            format(&[Value::Float(1234567.891), Value::Integer(1)]),
            Value::from("1,234,567.9")
        );
        assert_eq!(
            format(&[Value::Float(12000.3), Value::Integer(4), Value::from("fr-FR")]),
            Value::from("12\u{a0}000,3000")
        );
        assert_eq!(
            format(&[Value::Float(-0.001), Value::Integer(2)]),
            Value::from("0.00")
        );
    }
}

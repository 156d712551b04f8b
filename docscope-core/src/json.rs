//! JSON encoding of BSON documents.
//!
//! JSON-native BSON kinds (null, booleans, integers, doubles, strings, arrays and
//! documents) map directly onto [`serde_json::Value`]. Everything else is handed to a
//! fallback hook which either renders it as a string or rejects it. The default hook
//! is [`custom_serializer`].

use bson::{Bson, DateTime, Decimal128};
use chrono::DateTime as ChronoDateTime;
use serde::Serialize;
use serde_json::{Map, Serializer, Value, ser::PrettyFormatter};

use crate::error::{ConnectorError, ConnectorResult};

/// Indentation used for every pretty-printed document.
pub const INDENT: &[u8] = b"    ";

/// Hook invoked for values the encoder cannot represent natively.
pub type Fallback = fn(&Bson) -> ConnectorResult<String>;

/// Converts non-JSON-native BSON values into strings.
///
/// The first matching rule wins:
///
/// 1. `DateTime` becomes a naive ISO 8601 string (`2019-02-16T05:00:00`), the UTC
///    wall-clock time without an offset. Microseconds are appended only when the
///    instant has a sub-second part.
/// 2. `Decimal128` becomes its exact base-10 representation in positional notation,
///    keeping trailing zeros (`80.00`) and never using an exponent.
/// 3. Anything else fails with [`ConnectorError::UnsupportedType`] naming the type.
pub fn custom_serializer(value: &Bson) -> ConnectorResult<String> {
    match value {
        Bson::DateTime(datetime) => iso_datetime(datetime),
        Bson::Decimal128(decimal) => Ok(plain_decimal(decimal)),
        other => Err(ConnectorError::UnsupportedType(format!(
            "{:?}",
            other.element_type()
        ))),
    }
}

/// Fails instead of clamping when the instant is outside chrono's range.
fn iso_datetime(datetime: &DateTime) -> ConnectorResult<String> {
    let millis = datetime.timestamp_millis();
    let naive = ChronoDateTime::from_timestamp_millis(millis)
        .ok_or_else(|| {
            ConnectorError::Serialization(format!("datetime {millis}ms is out of range"))
        })?
        .naive_utc();

    Ok(if millis.rem_euclid(1000) == 0 {
        naive.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        naive.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    })
}

/// Rewrites bson's scientific string (`1E-7`, `1.5E+3`) in positional form.
///
/// Special values (`NaN`, `Infinity`) and strings without an exponent pass through.
fn plain_decimal(decimal: &Decimal128) -> String {
    let text = decimal.to_string();
    let Some((mantissa, exponent)) = text.split_once(['E', 'e']) else {
        return text;
    };
    let Ok(exponent) = exponent.parse::<i64>() else {
        return text;
    };

    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{whole}{fraction}");
    let scale = exponent - fraction.len() as i64;

    if scale >= 0 {
        return format!("{sign}{digits}{}", "0".repeat(scale as usize));
    }

    let point = digits.len() as i64 + scale;
    if point > 0 {
        let (integer, rest) = digits.split_at(point as usize);
        format!("{sign}{integer}.{rest}")
    } else {
        format!("{sign}0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    }
}

/// Pretty-printing BSON to JSON encoder with a pluggable fallback.
#[derive(Debug, Clone, Copy)]
pub struct JsonEncoder {
    fallback: Fallback,
}

impl Default for JsonEncoder {
    fn default() -> Self {
        JsonEncoder {
            fallback: custom_serializer,
        }
    }
}

impl JsonEncoder {
    /// Creates an encoder using [`custom_serializer`] as its fallback.
    pub fn new() -> Self {
        JsonEncoder::default()
    }

    /// Creates an encoder with a different fallback hook.
    pub fn with_fallback(fallback: Fallback) -> Self {
        JsonEncoder { fallback }
    }

    /// Converts a BSON value into a JSON value, preserving document key order.
    ///
    /// Non-finite doubles become `null`. A single unsupported value anywhere in the
    /// tree fails the whole conversion.
    pub fn to_value(&self, value: &Bson) -> ConnectorResult<Value> {
        Ok(match value {
            Bson::Null => Value::Null,
            Bson::Boolean(flag) => Value::Bool(*flag),
            Bson::Int32(number) => Value::from(*number),
            Bson::Int64(number) => Value::from(*number),
            Bson::Double(number) => Value::from(*number),
            Bson::String(text) => Value::String(text.clone()),
            Bson::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.to_value(item))
                    .collect::<ConnectorResult<Vec<_>>>()?,
            ),
            Bson::Document(document) => Value::Object(
                document
                    .iter()
                    .map(|(key, item)| Ok((key.clone(), self.to_value(item)?)))
                    .collect::<ConnectorResult<Map<_, _>>>()?,
            ),
            other => Value::String((self.fallback)(other)?),
        })
    }

    /// Encodes a BSON value as indented JSON text.
    pub fn encode(&self, value: &Bson) -> ConnectorResult<String> {
        let json = self.to_value(value)?;
        let mut buffer = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));

        json.serialize(&mut serializer)?;

        String::from_utf8(buffer).map_err(|err| ConnectorError::Serialization(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{Binary, doc, spec::BinarySubtype};
    use chrono::{NaiveDateTime, TimeZone, Utc};
    use std::str::FromStr;

    fn decimal(text: &str) -> Bson {
        Bson::Decimal128(Decimal128::from_str(text).unwrap())
    }

    #[test]
    fn test_datetime_serializes_as_naive_iso8601() {
        let instant = Utc.with_ymd_and_hms(2019, 2, 16, 5, 0, 0).unwrap();
        let value = Bson::DateTime(DateTime::from_chrono(instant));

        let text = custom_serializer(&value).unwrap();

        assert_eq!(text, "2019-02-16T05:00:00");
        let parsed = NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S").unwrap();
        assert_eq!(parsed.and_utc().timestamp_millis(), instant.timestamp_millis());
    }

    #[test]
    fn test_datetime_keeps_milliseconds() {
        let value = Bson::DateTime(DateTime::from_millis(1_550_293_200_123));

        let text = custom_serializer(&value).unwrap();

        assert_eq!(text, "2019-02-16T05:00:00.123000");
        let parsed = NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f").unwrap();
        assert_eq!(parsed.and_utc().timestamp_millis(), 1_550_293_200_123);
    }

    #[test]
    fn test_datetime_before_epoch() {
        let value = Bson::DateTime(DateTime::from_millis(-1));

        assert_eq!(custom_serializer(&value).unwrap(), "1969-12-31T23:59:59.999000");
    }

    #[test]
    fn test_datetime_out_of_range_is_an_error() {
        let value = Bson::DateTime(DateTime::from_millis(i64::MAX));

        assert!(matches!(
            custom_serializer(&value),
            Err(ConnectorError::Serialization(_))
        ));
    }

    #[test]
    fn test_decimal_serializes_exactly() {
        assert_eq!(custom_serializer(&decimal("19.99")).unwrap(), "19.99");
        assert_eq!(custom_serializer(&decimal("80.00")).unwrap(), "80.00");
        assert_eq!(custom_serializer(&decimal("-0.5")).unwrap(), "-0.5");
    }

    #[test]
    fn test_decimal_small_exponent_is_positional() {
        assert_eq!(custom_serializer(&decimal("0.0000001")).unwrap(), "0.0000001");
        assert_eq!(custom_serializer(&decimal("1E-7")).unwrap(), "0.0000001");
        assert_eq!(custom_serializer(&decimal("-1.25E-8")).unwrap(), "-0.0000000125");
    }

    #[test]
    fn test_decimal_large_exponent_is_positional() {
        assert_eq!(custom_serializer(&decimal("1E+3")).unwrap(), "1000");
        assert_eq!(custom_serializer(&decimal("1.5E+3")).unwrap(), "1500");
        assert_eq!(custom_serializer(&decimal("12345E+2")).unwrap(), "1234500");
    }

    #[test]
    fn test_unsupported_type_names_the_type() {
        let value = Bson::Binary(Binary {
            subtype: BinarySubtype::Generic,
            bytes: vec![0xde, 0xad],
        });

        match custom_serializer(&value) {
            Err(ConnectorError::UnsupportedType(name)) => assert_eq!(name, "Binary"),
            other => panic!("expected UnsupportedType, got {other:?}"),
        }
    }

    #[test]
    fn test_encoder_preserves_key_order_and_indent() {
        let value = Bson::Document(doc! {
            "name": "Loft",
            "beds": 2,
            "price": Decimal128::from_str("19.99").unwrap(),
        });

        let text = JsonEncoder::new().encode(&value).unwrap();

        assert_eq!(
            text,
            "{\n    \"name\": \"Loft\",\n    \"beds\": 2,\n    \"price\": \"19.99\"\n}"
        );
    }

    #[test]
    fn test_encoder_fails_whole_document_on_unsupported_value() {
        let value = Bson::Array(vec![
            Bson::Document(doc! { "ok": true }),
            Bson::Document(doc! {
                "blob": Binary { subtype: BinarySubtype::Generic, bytes: vec![1] },
            }),
        ]);

        assert!(matches!(
            JsonEncoder::new().encode(&value),
            Err(ConnectorError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_encoder_uses_custom_fallback() {
        fn placeholder(_: &Bson) -> ConnectorResult<String> {
            Ok("<opaque>".to_string())
        }
        let value = Bson::Document(doc! { "_id": bson::oid::ObjectId::new() });

        let json = JsonEncoder::with_fallback(placeholder).to_value(&value).unwrap();

        assert_eq!(json["_id"], Value::String("<opaque>".into()));
    }

    #[test]
    fn test_encoder_empty_document() {
        assert_eq!(JsonEncoder::new().encode(&Bson::Document(doc! {})).unwrap(), "{}");
    }
}

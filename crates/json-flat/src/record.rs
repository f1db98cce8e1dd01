//! Record table: the wire-level representation shared by both codec halves.
//!
//! The envelope is a JSON array of slots. Inside a composite slot every text
//! leaf is a Reference Token, the decimal index of another slot. A text slot
//! at the top level is plain text. [`parse_table`] reads an envelope into
//! [`Record`]s where that distinction is carried by the [`Field`] tag rather
//! than by the shape of the text.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::FlatError;
use crate::graph::Value;

/// Payload of one slot after the tagged parse.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Record {
    Leaf(Value),
    Object(Vec<(String, Field)>),
    Array(Vec<Field>),
}

/// A field of a composite slot.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Field {
    /// Reference Token: index of the slot holding the value.
    Ref(usize),
    Leaf(Value),
}

pub(crate) fn format_token(index: usize) -> String {
    index.to_string()
}

/// Parses a Reference Token: decimal digits with no sign and no leading zero.
pub(crate) fn parse_token(token: &str) -> Result<usize, FlatError> {
    let bytes = token.as_bytes();
    let canonical = !bytes.is_empty()
        && bytes.iter().all(|b| b.is_ascii_digit())
        && !(bytes.len() > 1 && bytes[0] == b'0');
    if !canonical {
        return Err(FlatError::InvalidToken(token.to_owned()));
    }
    token
        .parse()
        .map_err(|_| FlatError::InvalidToken(token.to_owned()))
}

/// Reads a parsed envelope into tagged records.
///
/// Every token is range-checked here, before any reconstruction, so a
/// dangling reference can never leave a half-built value behind.
pub(crate) fn parse_table(envelope: serde_json::Value) -> Result<Vec<Record>, FlatError> {
    let serde_json::Value::Array(slots) = envelope else {
        return Err(FlatError::Envelope(
            "expected an array of slots".to_owned(),
        ));
    };
    if slots.is_empty() {
        return Err(FlatError::Envelope(
            "record table has no root slot".to_owned(),
        ));
    }
    let len = slots.len();
    let table = slots
        .into_iter()
        .enumerate()
        .map(|(slot, payload)| read_record(slot, payload))
        .collect::<Result<Vec<_>, _>>()?;
    let check = |field: &Field| match field {
        Field::Ref(index) if *index >= len => Err(FlatError::DanglingReference { index: *index, len }),
        _ => Ok(()),
    };
    for record in &table {
        match record {
            Record::Leaf(_) => {}
            Record::Object(fields) => fields.iter().try_for_each(|(_, field)| check(field))?,
            Record::Array(items) => items.iter().try_for_each(&check)?,
        }
    }
    Ok(table)
}

fn read_record(slot: usize, payload: serde_json::Value) -> Result<Record, FlatError> {
    Ok(match payload {
        serde_json::Value::Array(items) => Record::Array(
            items
                .into_iter()
                .map(|item| read_field(slot, item))
                .collect::<Result<_, _>>()?,
        ),
        serde_json::Value::Object(obj) => Record::Object(
            obj.into_iter()
                .map(|(key, item)| read_field(slot, item).map(|field| (key, field)))
                .collect::<Result<_, _>>()?,
        ),
        leaf => Record::Leaf(read_leaf(leaf)),
    })
}

fn read_field(slot: usize, item: serde_json::Value) -> Result<Field, FlatError> {
    match item {
        serde_json::Value::String(token) => Ok(Field::Ref(parse_token(&token)?)),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(FlatError::Envelope(
            format!("slot {slot} nests a composite instead of referencing it"),
        )),
        leaf => Ok(Field::Leaf(read_leaf(leaf))),
    }
}

fn read_leaf(leaf: serde_json::Value) -> Value {
    match leaf {
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => Value::Number(n),
        serde_json::Value::String(s) => Value::String(s),
        _ => Value::Null,
    }
}

/// Serializes one slot, pretty-printed when an indentation unit is given.
pub(crate) fn write_slot(slot: &serde_json::Value, indent: Option<&str>) -> Result<String, FlatError> {
    let Some(indent) = indent else {
        return serde_json::to_string(slot).map_err(|e| FlatError::Unserializable(e.to_string()));
    };
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
    slot.serialize(&mut ser)
        .map_err(|e| FlatError::Unserializable(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| FlatError::Unserializable(e.to_string()))
}

/// Joins serialized slots into the `[s0,s1,...]` envelope.
pub(crate) fn join_slots(slots: &[String]) -> String {
    let mut out = String::with_capacity(slots.iter().map(|s| s.len() + 1).sum::<usize>() + 1);
    out.push('[');
    out.push_str(&slots.join(","));
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn token_grammar() {
        assert_eq!(parse_token("0").unwrap(), 0);
        assert_eq!(parse_token("42").unwrap(), 42);
        for bad in ["", "-1", "+1", "01", "1.0", "x", " 1"] {
            assert!(
                matches!(parse_token(bad), Err(FlatError::InvalidToken(_))),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(format_token(17), "17");
    }

    #[test]
    fn text_is_tagged_by_position() {
        let table = parse_table(json!([{"a": "1", "b": 2}, "1"])).unwrap();
        assert_eq!(
            table[0],
            Record::Object(vec![
                ("a".into(), Field::Ref(1)),
                ("b".into(), Field::Leaf(Value::from(2i64))),
            ])
        );
        assert_eq!(table[1], Record::Leaf(Value::from("1")));
    }

    #[test]
    fn table_shape_is_validated() {
        assert!(matches!(parse_table(json!({})), Err(FlatError::Envelope(_))));
        assert!(matches!(parse_table(json!([])), Err(FlatError::Envelope(_))));
        assert!(matches!(
            parse_table(json!([{"a": [1]}])),
            Err(FlatError::Envelope(_))
        ));
        assert!(matches!(
            parse_table(json!([["3"], {}])),
            Err(FlatError::DanglingReference { index: 3, len: 2 })
        ));
    }

    #[test]
    fn slots_pretty_print_with_indent() {
        let slot = json!({"a": "1"});
        assert_eq!(write_slot(&slot, None).unwrap(), r#"{"a":"1"}"#);
        assert_eq!(write_slot(&slot, Some("  ")).unwrap(), "{\n  \"a\": \"1\"\n}");
        assert_eq!(join_slots(&["1".into(), "2".into()]), "[1,2]");
        assert_eq!(join_slots(&[]), "[]");
    }
}

//! Renders flattened fields as `label: value` lines.
//!
//! Strings are written without quotes and `null` marks a null reference.
//! Other leaves are written as compact JSON. Lines follow the order of the
//! [`FieldMap`], which callers should not depend on.

use {
    crate::{
        Fields,
        fields::{FieldMap, flatten::flattened_with},
        options::FlattenOptions,
    },
    serde::Serialize,
    serde_json::Value,
    std::fmt,
    tap::Pipe,
    tracing::{debug, instrument},
};

struct LeafText<'a>(&'a Value);

impl fmt::Display for LeafText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::String(text) => f.write_str(text),
            other => write!(f, "{other}"),
        }
    }
}

pub fn write_fields(out: &mut impl fmt::Write, fields: &FieldMap) -> fmt::Result {
    fields
        .iter()
        .try_for_each(|(label, value)| writeln!(out, "{label}: {}", LeafText(value)))
}

#[instrument(level = "debug", skip(value))]
pub fn formatted_with<T: Serialize + ?Sized>(options: &FlattenOptions, value: &T) -> String {
    flattened_with(options, value).pipe(|fields| {
        let mut out = String::new();
        write_fields(&mut out, &fields)
            .map(|()| out)
            .unwrap_or_else(|error| {
                debug!(%error, "formatting fields");
                String::new()
            })
    })
}

pub fn formatted<T: Serialize + ?Sized>(value: &T) -> String {
    formatted_with(&FlattenOptions::default(), value)
}

impl<T: Serialize + ?Sized> fmt::Display for Fields<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_fields(f, &flattened_with(&FlattenOptions::default(), self.0))
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    fn field_map(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            other => panic!("expected an object: {other}"),
        }
    }

    #[test]
    fn test_leaf_text() {
        let fields = field_map(json!({
            "name": "a b",
            "count": 7,
            "ratio": 0.5,
            "ok": false,
            "missing": null,
            "tags": ["x", "y"],
            "limits": {"soft": 1}
        }));
        let mut out = String::new();
        write_fields(&mut out, &fields).unwrap();
        assert_eq!(
            out,
            [
                "name: a b",
                "count: 7",
                "ratio: 0.5",
                "ok: false",
                "missing: null",
                "tags: [\"x\",\"y\"]",
                "limits: {\"soft\":1}",
                "",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_unsupported_values_format_empty() {
        assert_eq!(formatted(&1.5f64), "");
        assert_eq!(formatted(&()), "");
        assert_eq!(formatted(&None::<u8>), "");
    }

    #[test]
    fn test_fields_display_matches_formatted() {
        #[derive(Serialize)]
        struct Request {
            method: &'static str,
            status: u16,
        }

        let request = Request {
            method: "GET",
            status: 200,
        };
        assert_eq!(Fields(&request).to_string(), formatted(&request));
        assert_eq!(Fields(&request).to_string(), "method: GET\nstatus: 200\n");
    }
}

//! # Canonicalization
//!
//! A canonicalizer deterministically serializes a document so that the same
//! logical content always produces the same bytes, regardless of property
//! order. The engine is agnostic to the algorithm used; [`Jcs`] implements the
//! JSON Canonicalization Scheme ([RFC8785]).
//!
//! [RFC8785]: https://www.rfc-editor.org/rfc/rfc8785

use std::future::Future;

use serde_json::Value;

use crate::error::{Error, Result};

/// Options passed to a canonicalizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CanonicalizeOptions {
    /// Use the native (optimised) engine rather than the reference
    /// implementation. Must not change output for well-formed input.
    pub native: bool,
}

/// Deterministic serialization of a JSON document.
pub trait Canonicalizer: Send + Sync {
    /// Canonicalize the document.
    fn canonicalize(
        &self, document: &Value, options: &CanonicalizeOptions,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// JSON Canonicalization Scheme.
#[derive(Clone, Copy, Debug, Default)]
pub struct Jcs;

impl Canonicalizer for Jcs {
    async fn canonicalize(&self, document: &Value, options: &CanonicalizeOptions) -> Result<Vec<u8>> {
        if options.native {
            return serde_json_canonicalizer::to_vec(document)
                .map_err(|e| Error::Canonicalization(e.to_string()));
        }

        let mut out = String::new();
        write_value(document, &mut out)?;
        Ok(out.into_bytes())
    }
}

// Reference implementation: properties sorted by their UTF-16 code units,
// strings escaped minimally, numbers in their ECMAScript form.
fn write_value(value: &Value, out: &mut String) -> Result<()> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => {
            let n = serde_json_canonicalizer::to_string(n)
                .map_err(|e| Error::Canonicalization(e.to_string()))?;
            out.push_str(&n);
        }
        Value::String(s) => write_string(s, out)?,
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries = map.iter().collect::<Vec<_>>();
            entries.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));

            out.push('{');
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out)?;
                out.push(':');
                write_value(value, out)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn write_string(s: &str, out: &mut String) -> Result<()> {
    let escaped = serde_json::to_string(s).map_err(|e| Error::Canonicalization(e.to_string()))?;
    out.push_str(&escaped);
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const NATIVE: CanonicalizeOptions = CanonicalizeOptions { native: true };
    const REFERENCE: CanonicalizeOptions = CanonicalizeOptions { native: false };

    #[tokio::test]
    async fn property_order_independent() {
        let a = json!({"b": 1, "a": {"y": [1, 2, "x"], "x": null}});
        let b = json!({"a": {"x": null, "y": [1, 2, "x"]}, "b": 1});

        let ca = Jcs.canonicalize(&a, &REFERENCE).await.expect("should canonicalize");
        let cb = Jcs.canonicalize(&b, &REFERENCE).await.expect("should canonicalize");
        assert_eq!(ca, cb);
        assert_eq!(String::from_utf8(ca).expect("utf8"), r#"{"a":{"x":null,"y":[1,2,"x"]},"b":1}"#);
    }

    #[tokio::test]
    async fn native_matches_reference() {
        let doc = json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "name": "Alice \"A\" \n Smith",
            "\u{20ac}": "euro",
            "\r": "control",
            "1": 1.5,
            "big": 100_000_000_000_u64,
            "neg": -3,
            "flag": false,
            "nested": [{"z": 1, "a": [true, null]}]
        });

        let native = Jcs.canonicalize(&doc, &NATIVE).await.expect("should canonicalize");
        let reference = Jcs.canonicalize(&doc, &REFERENCE).await.expect("should canonicalize");
        assert_eq!(native, reference);
    }
}

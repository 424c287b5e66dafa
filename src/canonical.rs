//! Canonical JSON serialization
//!
//! Semantically equal JSON values canonicalize to the same string regardless
//! of the key order they were built or parsed with:
//!
//! - strings, booleans and null use their standard JSON encoding
//! - numbers use the ECMAScript `Number::toString` form, so `10`, `10.0` and
//!   `1e1` all become `10` and `-0` becomes `0`
//! - arrays keep element order: `[a,b,c]`
//! - objects sort keys: `{"k1":v1,"k2":v2}`
//!
//! No whitespace is emitted anywhere.

use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Largest magnitude at which every integer is exactly representable as f64
const MAX_SAFE_INTEGER: u64 = 1 << 53;

/// Canonicalize a JSON value
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_by(|a, b| compare_keys(a, b));

            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_scalar(&Value::String(key.clone()), out);
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Number(n) => write_number(n, out),
        scalar => write_scalar(scalar, out),
    }
}

fn write_number(n: &Number, out: &mut String) {
    if let Some(i) = n.as_i64() {
        if i.unsigned_abs() <= MAX_SAFE_INTEGER {
            out.push_str(&i.to_string());
            return;
        }
    } else if let Some(u) = n.as_u64() {
        if u <= MAX_SAFE_INTEGER {
            out.push_str(&u.to_string());
            return;
        }
    }

    // Everything else goes through f64, as a JavaScript producer would see it
    match n.as_f64() {
        Some(f) => out.push_str(&format_f64(f)),
        None => out.push_str(&n.to_string()),
    }
}

fn format_f64(f: f64) -> String {
    if f == 0.0 {
        // Covers -0
        return "0".to_string();
    }
    if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER as f64 {
        return (f as i64).to_string();
    }
    ryu_js::Buffer::new().format(f).to_string()
}

fn write_scalar(value: &Value, out: &mut String) {
    // Display on a Value is its compact JSON encoding and cannot fail
    out.push_str(&value.to_string());
}

/// Key order used for objects: UTF-16 code unit order
///
/// Matches the default string sort of JavaScript runtimes, which is what the
/// producers of these logs use. For keys inside the Basic Multilingual Plane
/// this is the same as plain byte order.
fn compare_keys(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

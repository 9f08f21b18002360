//! Canonical document digest.
//!
//! The payload is flattened to one leaf per scalar, `"<pointer>=<json>"`.
//! Leaf hashes are sorted and hashed together, so the digest does not
//! depend on key order in the source document.

use crate::certificate::CertificateData;
use crate::error::CoreResult;
use crate::hash::Hash;
use serde_json::Value;

/// Compute the target hash a payload should carry.
///
/// # Errors
///
/// Returns error if the payload cannot be encoded as JSON
pub fn document_digest(data: &CertificateData) -> CoreResult<Hash> {
    let value = serde_json::to_value(data)?;

    let mut leaves = Vec::new();
    flatten(&value, &mut String::new(), &mut leaves);

    let mut leaf_hashes: Vec<Hash> = leaves
        .iter()
        .map(|leaf| Hash::compute(leaf.as_bytes()))
        .collect();
    leaf_hashes.sort();

    let mut concat = Vec::with_capacity(leaf_hashes.len() * Hash::LEN);
    for hash in &leaf_hashes {
        concat.extend_from_slice(hash.as_bytes());
    }
    Ok(Hash::compute(&concat))
}

fn flatten(value: &Value, pointer: &mut String, leaves: &mut Vec<String>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let mark = pointer.len();
                pointer.push('/');
                pointer.push_str(&key.replace('~', "~0").replace('/', "~1"));
                flatten(child, pointer, leaves);
                pointer.truncate(mark);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                let mark = pointer.len();
                pointer.push('/');
                pointer.push_str(&index.to_string());
                flatten(child, pointer, leaves);
                pointer.truncate(mark);
            }
        }
        // Scalars and empty containers
        other => leaves.push(format!("{}={}", pointer, other)),
    }
}

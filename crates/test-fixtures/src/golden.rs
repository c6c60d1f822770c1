//! Golden byte vectors for both wire protocols.

use serde::Deserialize;

use crate::load_fixture;

#[derive(Debug, Clone, Deserialize)]
pub struct GoldenVectors {
    pub values: Vec<ValueVector>,
    pub envelopes: Vec<EnvelopeVector>,
}

/// A single tagged value, hex-encoded in each protocol.
#[derive(Debug, Clone, Deserialize)]
pub struct ValueVector {
    pub name: String,
    pub compact: String,
    pub binary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeVector {
    pub name: String,
    pub method: String,
    pub message_type: u8,
    pub sequence_id: i32,
    pub compact: String,
    pub binary: String,
}

pub fn codec_vectors() -> GoldenVectors {
    load_fixture("golden/codec_vectors.json")
}

/// Decode a lowercase or uppercase hex string.
///
/// # Panics
/// Panics on odd length or non-hex characters.
pub fn hex(s: &str) -> Vec<u8> {
    let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    assert!(s.len() % 2 == 0, "odd-length hex string: {s}");
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .unwrap_or_else(|e| panic!("bad hex at {i} in {s}: {e}"))
        })
        .collect()
}

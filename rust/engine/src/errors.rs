use thiserror::Error;

/// A card code that does not name one of the 52 cards (e.g. `"1x"`).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardParseError {
    #[error("Empty card code")]
    Empty,
    #[error("Unknown rank in card code {code:?}")]
    UnknownRank { code: String },
    #[error("Unknown suit in card code {code:?}")]
    UnknownSuit { code: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NumberParseError {
    #[error("Invalid number literal {literal:?}")]
    InvalidLiteral { literal: String },
    #[error("Number is not finite")]
    NotFinite,
    #[error("Invalid sign {sign} (expected -1, 0 or 1)")]
    InvalidSign { sign: i8 },
    #[error("Exponent {exponent} is out of range")]
    ExponentOutOfRange { exponent: i64 },
}

/// Failure to decode a single persisted key.
///
/// The codec never propagates these out of a load: each one is downgraded to
/// the field's default. They exist so the fallback can be logged with a cause.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Key {key} is absent")]
    Missing { key: &'static str },
    #[error("Key {key} holds malformed JSON: {source}")]
    Malformed {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Key {key} holds an out-of-range value: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("Failed to encode key {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

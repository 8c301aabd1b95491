//! Error types for the protocol layer.

/// Errors that can occur while encoding, decoding, or validating
/// wire-level data.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed — malformed JSON, missing fields, or a
    /// frame that isn't a known command. The dispatcher treats this as
    /// silently ignorable input, not a fault.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A room code of the wrong length or containing characters outside
    /// the approved alphabet.
    #[error("invalid room code: {0:?}")]
    InvalidRoomCode(String),
}

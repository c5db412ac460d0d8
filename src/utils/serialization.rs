// src/utils/serialization.rs
//! Encoding of credential documents for content storage.

/// Serializes a document together with its metadata into the envelope
/// that is handed to content storage.
///
/// The envelope is `{"metadata": ..., "document": ...}`; keys in
/// `serde_json::Value` maps are sorted, so equal inputs give equal bytes.
pub fn document_envelope(
    document: &serde_json::Value,
    metadata: &serde_json::Value,
) -> Result<Vec<u8>, serde_json::Error> {
    let envelope = serde_json::json!({
        "metadata": metadata,
        "document": document,
    });
    serde_json::to_vec(&envelope)
}

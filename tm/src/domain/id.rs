//! Record ID generation
//!
//! IDs use the format `{kind}-{8-char-hex}`, e.g. `flight-019430ab`.
//! Extraction synthesizes these for records the generation service
//! returned without an identifier.

/// Generate a record ID from a kind tag
pub fn generate_id(kind: &str) -> String {
    let uuid = uuid::Uuid::now_v7();
    let hex = uuid.simple().to_string();
    format!("{}-{}", kind, &hex[..8])
}

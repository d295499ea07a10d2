//! Name encoding and filename helpers.
//!
//! The encoded name is the deduplication key for virtual persons: two persons
//! in the same project with equal encoded names are the same person.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::{Result, VpError};

/// Fallback slug for names without a single ASCII alphanumeric character.
const FALLBACK_FILE_NAME: &str = "person";

/// Encodes a display name into its lookup key.
///
/// URL-safe base64 without padding over the UTF-8 bytes, so the mapping is
/// deterministic and injective and the key is safe in query strings.
pub fn encode_name(name: &str) -> String {
    URL_SAFE_NO_PAD.encode(name.as_bytes())
}

/// Decodes a key produced by [`encode_name`].
pub fn decode_name(encoded: &str) -> Result<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded.as_bytes())
        .map_err(|e| VpError::Serialization {
            format: "base64".to_string(),
            message: e.to_string(),
        })?;

    String::from_utf8(bytes).map_err(|e| VpError::Serialization {
        format: "base64".to_string(),
        message: format!("decoded name is not valid UTF-8: {e}"),
    })
}

/// Builds the `link` slug stored with a person.
///
/// Lowercase ASCII alphanumerics are kept, every other run of characters
/// becomes a single `-`.
pub fn create_file_name(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_deterministic() {
        assert_eq!(encode_name("Jane Doe"), encode_name("Jane Doe"));
    }

    #[test]
    fn test_distinct_names_get_distinct_keys() {
        let names = ["Jane Doe", "Jane  Doe", "jane doe", "Jane Doe ", "Jöhn Müller", ""];
        let keys: std::collections::HashSet<String> =
            names.iter().map(|n| encode_name(n)).collect();
        assert_eq!(keys.len(), names.len());
    }

    #[test]
    fn test_decode_reverses_encode() {
        for name in ["Jane Doe", "Zoë O'Neil", "李 雷", ""] {
            assert_eq!(decode_name(&encode_name(name)).unwrap(), name);
        }
    }

    #[test]
    fn test_encoded_key_is_query_safe() {
        let key = encode_name("??>>~~ subjects");
        assert!(
            key.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_name("not base64!").unwrap_err();
        assert!(matches!(err, VpError::Serialization { .. }));
    }

    #[test]
    fn test_create_file_name() {
        assert_eq!(create_file_name("Jane Doe"), "jane-doe");
        assert_eq!(create_file_name("  Dr. Anna-Maria  O'Brien "), "dr-anna-maria-o-brien");
        assert_eq!(create_file_name("José García"), "jos-garc-a");
        assert_eq!(create_file_name("!!!"), "person");
    }
}

//! Base64 serde adapter for raw byte fields.

/// Serializes `Vec<u8>` fields as base64 strings inside state snapshots.
///
/// Checkpoints are JSON documents; encoding image bytes as base64 keeps them
/// readable and far smaller than a JSON number array. Use with
/// `#[serde(with = "base64_bytes")]`.
pub mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes the byte slice as a base64 string.
    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    /// Deserializes a base64 string back into bytes.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "super::base64_bytes")]
        data: Vec<u8>,
    }

    #[test]
    fn round_trips_bytes() {
        let holder = Holder {
            data: vec![0x89, b'P', b'N', b'G', 0x00, 0xff],
        };
        let json = serde_json::to_string(&holder).unwrap();
        let back: Holder = serde_json::from_str(&json).unwrap();

        assert_eq!(holder, back);
    }

    #[test]
    fn encodes_as_a_string() {
        let holder = Holder {
            data: b"abc".to_vec(),
        };
        let value = serde_json::to_value(&holder).unwrap();

        assert!(value["data"].is_string());
        assert_eq!(value["data"], "YWJj");
    }

    #[test]
    fn rejects_invalid_base64() {
        let result: Result<Holder, _> = serde_json::from_str(r#"{"data": "!!not-base64!!"}"#);
        assert!(result.is_err());
    }
}

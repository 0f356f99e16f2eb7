//! Identifier shape check.

/// Length of a hex-encoded document identifier.
const OBJECT_ID_HEX_LEN: usize = 24;

/// True when `token` is exactly 24 hexadecimal characters (either case).
///
/// Run before any store access so a malformed id is reported as a client
/// error instead of a driver failure.
pub fn is_valid_object_id(token: &str) -> bool {
    token.len() == OBJECT_ID_HEX_LEN && token.bytes().all(|byte| byte.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_24_hex_chars() {
        assert!(is_valid_object_id("507f1f77bcf86cd799439011"));
        assert!(is_valid_object_id("507F1F77BCF86CD799439011"));
    }

    #[test]
    fn rejects_wrong_length_or_alphabet() {
        assert!(!is_valid_object_id("507f1f77bcf86cd79943901"));
        assert!(!is_valid_object_id("507f1f77bcf86cd7994390111"));
        assert!(!is_valid_object_id("507f1f77bcf86cd79943901g"));
        assert!(!is_valid_object_id(""));
        // 24 bytes but multi-byte characters
        assert!(!is_valid_object_id("ééééééééééee"));
    }
}

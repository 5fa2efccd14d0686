//! Domain models for the health tracker backend.

pub mod activity_log;
pub mod institution;
pub mod relationships;
pub mod user;

/// Check whether an identifier has the store's canonical shape:
/// exactly 24 lowercase-insensitive hex characters.
///
/// Identifier shape is request-scoped: a malformed child id fails the whole
/// request before any per-item work happens.
pub fn is_well_formed_id(id: &str) -> bool {
    id.len() == 24 && id.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_id() {
        assert!(is_well_formed_id("5c86d00c2239a917e8b591a0"));
        assert!(is_well_formed_id("ABCDEF012345678901234567"));
    }

    #[test]
    fn test_malformed_ids() {
        assert!(!is_well_formed_id(""));
        assert!(!is_well_formed_id("123"));
        assert!(!is_well_formed_id("5c86d00c2239a917e8b591a")); // 23 chars
        assert!(!is_well_formed_id("5c86d00c2239a917e8b591a01")); // 25 chars
        assert!(!is_well_formed_id("zzzzzzzzzzzzzzzzzzzzzzzz")); // not hex
    }
}

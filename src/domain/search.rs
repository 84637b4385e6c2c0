//! Search keys for locating call recordings.
//!
//! Recordings are named after the caller and the moment the call started,
//! e.g. `34600111222_20240101T101500.wav`. A search term carries the same
//! two leading `_`-separated parts and may have any trailing parts.

/// Phone identifier and timestamp parsed from a search term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchKey {
    /// Phone number (or any caller identifier)
    pub phone: String,

    /// Timestamp fragment as it appears in the object name
    pub timestamp: String,
}

impl SearchKey {
    /// Parse a search term of the form `<phone>_<timestamp>[_...]`.
    ///
    /// Returns `None` when the term has fewer than two `_`-separated parts.
    /// Parts beyond the second are ignored.
    pub fn parse(term: &str) -> Option<Self> {
        let mut parts = term.split('_');
        let phone = parts.next()?;
        let timestamp = parts.next()?;

        Some(Self {
            phone: phone.to_string(),
            timestamp: timestamp.to_string(),
        })
    }

    /// True if both substrings occur anywhere in the object name
    pub fn matches(&self, object_name: &str) -> bool {
        object_name.contains(&self.phone) && object_name.contains(&self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_parts() {
        let key = SearchKey::parse("101_20240101").unwrap();
        assert_eq!(key.phone, "101");
        assert_eq!(key.timestamp, "20240101");
    }

    #[test]
    fn test_parse_ignores_extra_parts() {
        let key = SearchKey::parse("101_20240101_extra_more").unwrap();
        assert_eq!(key.phone, "101");
        assert_eq!(key.timestamp, "20240101");
    }

    #[test]
    fn test_parse_requires_separator() {
        assert!(SearchKey::parse("10120240101").is_none());
        assert!(SearchKey::parse("").is_none());
    }

    #[test]
    fn test_trailing_separator_yields_empty_timestamp() {
        // "101_" splits into two parts; the empty timestamp matches anything
        let key = SearchKey::parse("101_").unwrap();
        assert_eq!(key.timestamp, "");
        assert!(key.matches("calls/101_20240101.wav"));
    }

    #[test]
    fn test_matches_anywhere_in_path() {
        let key = SearchKey::parse("101_20240101").unwrap();
        assert!(key.matches("a/101_20240101.wav"));
        assert!(key.matches("20240101/caller-101.wav"));
        assert!(!key.matches("a/202_20240101.wav"));
        assert!(!key.matches("a/101_20240102.wav"));
    }
}

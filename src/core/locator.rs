//! Locate call recordings by search key.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapters::ObjectStore;
use crate::domain::{ObjectInfo, SearchKey};

/// How to pick one recording when several match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// First match in store listing order
    #[default]
    First,

    /// Match with the newest creation time; ties keep listing order
    Latest,
}

impl Selection {
    /// Pick one object from the ordered matches
    pub fn pick(self, matches: &[ObjectInfo]) -> Option<&ObjectInfo> {
        match self {
            Self::First => matches.first(),
            // max_by_key keeps the last maximum, so fold to keep the first
            Self::Latest => matches.iter().fold(None, |best: Option<&ObjectInfo>, candidate| {
                match best {
                    Some(current) if current.created >= candidate.created => Some(current),
                    _ => Some(candidate),
                }
            }),
        }
    }
}

/// Keep objects whose names contain both parts of the key, preserving order
pub fn filter_matches(key: &SearchKey, objects: Vec<ObjectInfo>) -> Vec<ObjectInfo> {
    objects
        .into_iter()
        .filter(|object| key.matches(&object.name))
        .collect()
}

/// List `prefix` in `bucket` and return recordings matching `search_term`.
///
/// A term without at least two `_`-separated parts matches nothing, and the
/// store is not queried at all in that case.
pub async fn search(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
    search_term: &str,
) -> Result<Vec<ObjectInfo>> {
    let Some(key) = SearchKey::parse(search_term) else {
        debug!(search_term, "Search term has fewer than two parts");
        return Ok(Vec::new());
    };

    let objects = store.list(bucket, prefix).await?;
    let listed = objects.len();
    let matches = filter_matches(&key, objects);

    debug!(
        phone = %key.phone,
        timestamp = %key.timestamp,
        listed,
        matched = matches.len(),
        "Searched recordings"
    );
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(name: &str, hour: u32) -> ObjectInfo {
        ObjectInfo {
            name: name.to_string(),
            created: Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).single(),
            size: None,
        }
    }

    #[test]
    fn test_filter_preserves_order() {
        let key = SearchKey::parse("101_20240101").unwrap();
        let objects = vec![
            ObjectInfo::named("a/101_20240101_b.wav"),
            ObjectInfo::named("a/202_20240101.wav"),
            ObjectInfo::named("a/101_20240101_a.wav"),
        ];
        let names: Vec<_> = filter_matches(&key, objects)
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, ["a/101_20240101_b.wav", "a/101_20240101_a.wav"]);
    }

    #[test]
    fn test_select_first() {
        let matches = vec![at("a/1", 9), at("a/2", 11)];
        assert_eq!(Selection::First.pick(&matches).unwrap().name, "a/1");
        assert!(Selection::First.pick(&[]).is_none());
    }

    #[test]
    fn test_select_latest() {
        let matches = vec![at("a/1", 9), at("a/2", 11), at("a/3", 10)];
        assert_eq!(Selection::Latest.pick(&matches).unwrap().name, "a/2");
    }

    #[test]
    fn test_select_latest_ties_keep_listing_order() {
        let matches = vec![at("a/1", 9), at("a/2", 9)];
        assert_eq!(Selection::Latest.pick(&matches).unwrap().name, "a/1");

        // Missing timestamps sort before any known one
        let matches = vec![ObjectInfo::named("a/0"), at("a/1", 9)];
        assert_eq!(Selection::Latest.pick(&matches).unwrap().name, "a/1");
    }

    #[test]
    fn test_selection_yaml() {
        let selection: Selection = serde_yaml::from_str("latest").unwrap();
        assert_eq!(selection, Selection::Latest);
        assert_eq!(Selection::default(), Selection::First);
    }
}

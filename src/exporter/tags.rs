//! Tag Merging

use crate::config::TagFormat;
use crate::view::Tag;

/// Combine a row's tags with the base tags into the list sent on the wire.
///
/// The result is always freshly allocated and never shares storage with
/// either input.
pub fn merge_tags(row_tags: &[Tag], base_tags: &[String], format: TagFormat) -> Vec<String> {
    match format {
        TagFormat::KeyValue => {
            let mut merged = Vec::with_capacity(row_tags.len() + base_tags.len());
            merged.extend(row_tags.iter().map(|t| format!("{}:{}", t.key, t.value)));
            merged.extend(base_tags.iter().cloned());
            merged
        }
        TagFormat::LegacyKeysOnly => {
            // Values are dropped and only the last base tag survives.
            let Some(last) = base_tags.last() else {
                return Vec::new();
            };
            let mut merged = Vec::with_capacity(row_tags.len() + 1);
            merged.extend(row_tags.iter().map(|t| t.key.clone()));
            merged.push(last.clone());
            merged
        }
    }
}

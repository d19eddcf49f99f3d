//! Per-frame options from an external specification table
//!
//! The table is partitioned by version bucket: ID3v2.2 frames have their own
//! entries, ID3v2.3 and ID3v2.4 share one. This module only looks entries
//! up; their contents are defined and validated by whoever supplies the
//! table.

use crate::error::Result;
use crate::id3::header::Id3v2Version;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;

/// Version partition of a specification table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecBucket {
    V2,
    V3,
}

impl From<Id3v2Version> for SpecBucket {
    fn from(version: Id3v2Version) -> Self {
        match version {
            Id3v2Version::V2 => SpecBucket::V2,
            Id3v2Version::V3 | Id3v2Version::V4 => SpecBucket::V3,
        }
    }
}

/// Options record for one frame field
///
/// `multiple` is the one option every table defines; anything else is
/// forwarded untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameOptions {
    #[serde(default)]
    pub multiple: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Anything that can answer spec lookups
pub trait FrameOptionsSource {
    fn lookup(&self, bucket: SpecBucket, name: &str) -> Option<&FrameOptions>;
}

/// A specification table held in memory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameOptionsTable {
    #[serde(default)]
    pub v2: HashMap<String, FrameOptions>,
    #[serde(default)]
    pub v3: HashMap<String, FrameOptions>,
}

impl FrameOptionsTable {
    /// Load a table shaped `{ "v2": { NAME: {..} }, "v3": { NAME: {..} } }`
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl FrameOptionsSource for FrameOptionsTable {
    fn lookup(&self, bucket: SpecBucket, name: &str) -> Option<&FrameOptions> {
        match bucket {
            SpecBucket::V2 => self.v2.get(name),
            SpecBucket::V3 => self.v3.get(name),
        }
    }
}

/// Options for `name` in `version`'s bucket, or an empty record
pub fn get_spec_options<'a, S>(
    source: &'a S,
    name: &str,
    version: Id3v2Version,
) -> Cow<'a, FrameOptions>
where
    S: FrameOptionsSource + ?Sized,
{
    match source.lookup(version.into(), name) {
        Some(options) => Cow::Borrowed(options),
        None => Cow::Owned(FrameOptions::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"{
        "v2": { "PIC": { "multiple": false } },
        "v3": {
            "APIC": { "multiple": true, "updateCompatibleFrames": { "version": 3 } },
            "TXXX": { "multiple": true }
        }
    }"#;

    #[test]
    fn test_lookup_by_bucket() {
        let table = FrameOptionsTable::from_json(TABLE).unwrap();

        assert!(!get_spec_options(&table, "PIC", Id3v2Version::V2).multiple);
        assert!(get_spec_options(&table, "APIC", Id3v2Version::V3).multiple);
        assert!(get_spec_options(&table, "APIC", Id3v2Version::V4).multiple);
        assert_eq!(
            get_spec_options(&table, "APIC", Id3v2Version::V4).extra["updateCompatibleFrames"],
            serde_json::json!({ "version": 3 })
        );
    }

    #[test]
    fn test_missing_entries_are_empty() {
        let table = FrameOptionsTable::from_json(TABLE).unwrap();

        assert_eq!(*get_spec_options(&table, "APIC", Id3v2Version::V2), FrameOptions::default());
        assert_eq!(*get_spec_options(&table, "PIC", Id3v2Version::V3), FrameOptions::default());
        assert_eq!(*get_spec_options(&table, "NOPE", Id3v2Version::V4), FrameOptions::default());
        assert_eq!(
            *get_spec_options(&FrameOptionsTable::default(), "TXXX", Id3v2Version::V3),
            FrameOptions::default()
        );
    }

    #[test]
    fn test_bad_table() {
        assert!(FrameOptionsTable::from_json("{ \"v3\": [] }").is_err());
        assert!(FrameOptionsTable::from_json("{}").unwrap().v3.is_empty());
    }
}

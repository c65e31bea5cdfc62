//! Resource tag sets

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const TAG_PURPOSE: &str = "Purpose";
pub const TAG_LAST_MODIFIED: &str = "Last-Modified";
pub const TAG_ENVIRONMENT: &str = "Environment";
pub const TAG_VERSION: &str = "Version";

/// Value of the `Purpose` tag
pub const PIPELINE_PURPOSE: &str = "SWSOC Pipeline";

/// Ordered tag key/value pairs for a single resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceTagSet {
    tags: Vec<(String, String)>,
}

impl ResourceTagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag, replacing the value in place if the key exists
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.tags.iter_mut().find(|(k, _)| *k == key) {
            Some(tag) => tag.1 = value,
            None => self.tags.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Serialize for ResourceTagSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tags.len()))?;
        for (key, value) in &self.tags {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

//! Raw configuration entries as read from the source file

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// A configuration value: a single scalar or a list of scalars
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Scalar(String),
    List(Vec<String>),
}

impl ConfigValue {
    /// Scalar contents, `None` for lists
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            ConfigValue::Scalar(value) => Some(value),
            ConfigValue::List(_) => None,
        }
    }

    /// List contents, `None` for scalars
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ConfigValue::Scalar(_) => None,
            ConfigValue::List(values) => Some(values),
        }
    }

    /// Every string held by this value, scalars yield themselves
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            ConfigValue::Scalar(value) => std::slice::from_ref(value),
            ConfigValue::List(values) => values,
        };
        slice.iter().map(String::as_str)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Scalar(value.to_string())
    }
}

impl From<Vec<&str>> for ConfigValue {
    fn from(values: Vec<&str>) -> Self {
        ConfigValue::List(values.into_iter().map(str::to_string).collect())
    }
}

/// Flat key/value configuration, kept in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    entries: Vec<(String, ConfigValue)>,
}

impl RawConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry. Replacing keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for RawConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for RawConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut raw = RawConfig::new();
        for (key, value) in iter {
            raw.insert(key, value);
        }
        raw
    }
}

//! Name-keyed record capabilities.
//!
//! Rendering only reads fields and parsing only writes them, so the two sides
//! are separate traits. Typed structs bind to the codec by implementing them.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Read access to a record's fields by name.
pub trait FieldSource {
    /// The value for `name`, or `None` if the record has no such field.
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;
}

/// Write access to a record's fields by name.
pub trait FieldSink {
    /// Store `value` under `name`, replacing any previous value.
    fn set_field(&mut self, name: &str, value: String);
}

impl<S: BuildHasher> FieldSource for HashMap<String, String, S> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|v| Cow::Borrowed(v.as_str()))
    }
}

impl<S: BuildHasher> FieldSink for HashMap<String, String, S> {
    fn set_field(&mut self, name: &str, value: String) {
        self.insert(name.to_string(), value);
    }
}

impl FieldSource for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|v| Cow::Borrowed(v.as_str()))
    }
}

impl FieldSink for BTreeMap<String, String> {
    fn set_field(&mut self, name: &str, value: String) {
        self.insert(name.to_string(), value);
    }
}

impl<T: FieldSource + ?Sized> FieldSource for &T {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).field(name)
    }
}

/// An insertion-ordered set of string fields.
///
/// This is what [`CompiledFormat::parse`](crate::CompiledFormat::parse)
/// returns: names appear in the order their variables were first filled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    entries: Vec<(String, String)>,
}

impl Fields {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set a field. An existing field keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Consume the record, yielding its pairs in insertion order.
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.entries
    }
}

impl FieldSource for Fields {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(Cow::Borrowed)
    }
}

impl FieldSink for Fields {
    fn set_field(&mut self, name: &str, value: String) {
        self.insert(name, value);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

impl From<Fields> for HashMap<String, String> {
    fn from(fields: Fields) -> Self {
        fields.entries.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_kept() {
        let mut fields = Fields::new();
        fields.insert("status", "200");
        fields.insert("request", "GET /");
        fields.insert("status", "404");
        assert_eq!(
            fields.iter().collect::<Vec<_>>(),
            vec![("status", "404"), ("request", "GET /")]
        );
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn map_capabilities() {
        let mut map: HashMap<String, String> = HashMap::new();
        map.set_field("a", "1".to_string());
        assert_eq!(map.field("a").as_deref(), Some("1"));
        assert_eq!(map.field("b"), None);

        let mut tree: BTreeMap<String, String> = BTreeMap::new();
        tree.set_field("a", "2".to_string());
        assert_eq!(tree.field("a").as_deref(), Some("2"));
    }

    #[test]
    fn collect_and_convert() {
        let fields: Fields = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(fields.get("b"), Some("2"));
        let map: HashMap<String, String> = fields.into();
        assert_eq!(map.len(), 2);
    }
}

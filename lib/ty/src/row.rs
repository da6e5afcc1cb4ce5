//! An ordered mapping from column name to [`Value`].

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::fmt;

use crate::Value;

/// The fields of one document, in the order they were written.
///
/// Keys are unique: inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    /// Sets `key` to `value`, returning the previous value if the key was present.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(index).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copies every field of `other` into `self`. Returns `true` if any stored
    /// value changed.
    pub fn merge(&mut self, other: &Row) -> bool {
        let mut changed = false;
        for (key, value) in other.iter() {
            match self.insert(key, value.clone()) {
                Some(previous) if previous == *value => {}
                _ => changed = true,
            }
        }
        changed
    }

    /// Returns a new row holding only the requested keys that exist in `self`,
    /// in the requested order.
    pub fn project<S: AsRef<str>>(&self, keys: &[S]) -> Row {
        keys.iter()
            .filter_map(|key| {
                self.get(key.as_ref())
                    .map(|value| (key.as_ref().to_string(), value.clone()))
            })
            .collect()
    }

    /// Converts the row into a JSON object, keeping field order.
    pub fn to_json(&self) -> serde_json::Value {
        let object = self
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(object)
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (key, value) in iter {
            row.insert(key, value);
        }
        row
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value.to_literal())?;
        }
        write!(f, "}}")
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct RowVisitor;

impl<'de> Visitor<'de> for RowVisitor {
    type Value = Row;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of column names to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Row, A::Error> {
        let mut row = Row::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            row.insert(key, value);
        }
        Ok(row)
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RowVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions_sorted::assert_eq;

    fn user() -> Row {
        let mut row = Row::new();
        row.insert("id", Value::Integer(1));
        row.insert("name", Value::Text("John".into()));
        row.insert("age", Value::Integer(30));
        row
    }

    #[test]
    fn test_insert_keeps_position() {
        let mut row = user();
        let previous = row.insert("name", Value::Text("Johnny".into()));

        assert_eq!(previous, Some(Value::Text("John".into())));
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["id", "name", "age"]);
    }

    #[test]
    fn test_merge_reports_changes() {
        let mut row = user();
        let mut same = Row::new();
        same.insert("age", Value::Integer(30));
        assert!(!row.merge(&same));

        let mut older = Row::new();
        older.insert("age", Value::Integer(31));
        assert!(row.merge(&older));
        assert_eq!(row.get("age"), Some(&Value::Integer(31)));
    }

    #[test]
    fn test_project_skips_missing_keys() {
        let projected = user().project(&["age", "email", "name"]);
        assert_eq!(projected.keys().collect::<Vec<_>>(), vec!["age", "name"]);
    }

    #[test]
    fn test_serde_preserves_order() {
        let json = serde_json::to_string(&user()).unwrap();
        let back: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(back.keys().collect::<Vec<_>>(), vec!["id", "name", "age"]);
        assert_eq!(back, user());
    }
}

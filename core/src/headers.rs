//! Ordered header collection shared by requests and responses.
//!
//! # Design
//! Names are compared as exact strings, so `Content-type` and `Content-Type`
//! are two distinct entries. Setting an existing name replaces its value but
//! keeps its original position, which fixes the order headers go out on the
//! wire. Only one value is kept per name; a repeated response header such as
//! `Set-Cookie` ends up holding the last value received.

/// Insertion-ordered, case-sensitive header map with one value per name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderStore {
    entries: Vec<(String, String)>,
}

impl HeaderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `name`, or overwrite its value in place if already present.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Remove `name`. Absent names are ignored.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| n != name);
    }

    /// Value stored under exactly `name`, or `None`. An empty header value
    /// is returned as `Some("")`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a HeaderStore {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

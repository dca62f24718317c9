use serde::{Deserialize, Serialize};

/// Ordered set of tags collected for a finished session.
///
/// Tags are trimmed; blanks and exact (case-sensitive) duplicates are
/// dropped, and the first insertion position wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split comma-separated input, e.g. `"deep work, writing"`.
    pub fn parse_list(input: &str) -> Self {
        input.split(',').collect()
    }

    /// Add a tag. Returns false if it was blank or already present.
    pub fn add(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    /// Drop the most recently added tag (backspace on an empty input).
    pub fn pop_last(&mut self) -> Option<String> {
        self.0.pop()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = TagSet::new();
        for tag in iter {
            tags.add(tag.as_ref());
        }
        tags
    }
}

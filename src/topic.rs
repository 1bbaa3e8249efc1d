//! Topic identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Named channel identifying a source and the events it publishes.
///
/// Equality and hashing use the code only. The code is not validated here;
/// the directory rejects codes that do not form a valid address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic {
    code: String,
}

impl Topic {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// The code used for equality and address construction.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Directory address of the source owning this topic.
    ///
    /// Publishers and subscribers must use the same prefix.
    pub fn address(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.code)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

impl From<&str> for Topic {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for Topic {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_topic_equality_by_code() {
        assert_eq!(Topic::new("sport"), Topic::from("sport"));
        assert_ne!(Topic::new("sport"), Topic::new("music"));

        let set: HashSet<Topic> = [Topic::new("sport"), Topic::from("sport".to_string())]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_topic_address_concatenates_prefix() {
        let topic = Topic::new("technology");
        assert_eq!(topic.address("//localhost/"), "//localhost/technology");
        assert_eq!(topic.address(""), "technology");
    }

    #[test]
    fn test_topic_serializes_as_plain_string() {
        let topic: Topic = serde_json::from_str("\"gaming\"").unwrap();
        assert_eq!(topic.code(), "gaming");
        assert_eq!(serde_json::to_string(&topic).unwrap(), "\"gaming\"");
        assert_eq!(topic.to_string(), "gaming");
    }
}

//! Data models for linkdb
//!
//! A `Link` is one bookmark. Its `linkdate` doubles as the unique key and
//! the sort key: `YYYYMMDD_HHMMSS` compares lexicographically in the same
//! order as the timestamps it encodes.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::hash::small_hash;

/// Format of a `linkdate` key
pub const LINKDATE_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A saved link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    /// Unique key, `YYYYMMDD_HHMMSS`
    pub linkdate: String,
    /// The URL (absolute, or relative for notes)
    pub url: String,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Space-separated tags
    #[serde(default)]
    pub tags: String,
    /// Only visible when logged in
    #[serde(default, with = "int_flag")]
    pub private: bool,
}

impl Link {
    /// Create a new link for `url`, keyed by the current local time
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_linkdate(linkdate_from(Local::now().naive_local()), url)
    }

    /// Create a link with a specific key (for seeding and imports)
    pub fn with_linkdate(linkdate: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            linkdate: linkdate.into(),
            url: url.into(),
            title: String::new(),
            description: String::new(),
            tags: String::new(),
            private: false,
        }
    }

    /// Update the title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Update the description
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Replace the space-separated tag string
    pub fn set_tags(&mut self, tags: impl Into<String>) {
        self.tags = tags.into();
    }

    /// Mark the link private or public
    pub fn set_private(&mut self, private: bool) {
        self.private = private;
    }

    /// Parse the key back into a timestamp
    ///
    /// Returns `None` for keys that are not in `YYYYMMDD_HHMMSS` form.
    pub fn date(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.linkdate, LINKDATE_FORMAT).ok()
    }

    /// The `YYYYMMDD` day this link belongs to
    pub fn day(&self) -> Option<&str> {
        day_of(&self.linkdate)
    }

    /// Individual tags, split on spaces
    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        self.tags.split(' ').filter(|t| !t.is_empty())
    }

    /// Permalink token for this link
    pub fn small_hash(&self) -> String {
        small_hash(&self.linkdate)
    }
}

/// Format a timestamp as a `linkdate` key
pub fn linkdate_from(datetime: NaiveDateTime) -> String {
    datetime.format(LINKDATE_FORMAT).to_string()
}

/// The 8-character day prefix of a key, if it has one
pub(crate) fn day_of(linkdate: &str) -> Option<&str> {
    linkdate.get(..8)
}

/// Persist `private` as 0/1; read any non-zero integer (or a bool) as set.
mod int_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Int(i64),
        Bool(bool),
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Flag::deserialize(deserializer)? {
            Flag::Int(n) => n != 0,
            Flag::Bool(b) => b,
        })
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single saved entry, kept as the JSON object the client sent.
///
/// Fields are not interpreted on the way in or out; `title` and `url` are only
/// read when the index page is rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bookmark(pub Map<String, Value>);

impl Bookmark {
    pub fn new(title: &str, url: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("title".to_owned(), Value::from(title));
        fields.insert("url".to_owned(), Value::from(url));
        Bookmark(fields)
    }

    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    pub fn url(&self) -> Option<&str> {
        self.0.get("url").and_then(Value::as_str)
    }
}

/// Ordered list of bookmarks, in the order the client saved them.
pub type Collection = Vec<Bookmark>;

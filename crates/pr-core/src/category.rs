use std::collections::HashMap;

use serde::Deserialize;

/// Resolves category ids (roles, tags, departments...) to display labels.
///
/// Passed explicitly into rendering; the caller owns loading and refresh.
pub trait CategoryResolver: Send + Sync {
    fn label(&self, id: &str) -> Option<String>;
}

/// Resolver that knows no labels; ids render bare.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLabels;

impl CategoryResolver for NoLabels {
    fn label(&self, _id: &str) -> Option<String> {
        None
    }
}

/// In-memory id → label table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap {
    labels: HashMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryDocument {
    /// `{"3": "Manager", ...}`
    Map(HashMap<String, String>),
    /// `[{"id": 3, "name": "Manager"}, ...]`
    List(Vec<CategoryEntry>),
}

#[derive(Deserialize)]
struct CategoryEntry {
    id: serde_json::Value,
    #[serde(alias = "label", alias = "title")]
    name: String,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, label: impl Into<String>) {
        self.labels.insert(id.into(), label.into());
    }

    /// Parse either an `{id: label}` object or a `[{id, name}]` array.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let doc: CategoryDocument = serde_json::from_str(json)?;
        let labels = match doc {
            CategoryDocument::Map(m) => m,
            CategoryDocument::List(entries) => entries
                .into_iter()
                .map(|e| {
                    let id = match e.id {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (id, e.name)
                })
                .collect(),
        };
        Ok(Self { labels })
    }

    /// Swap in a freshly loaded table.
    pub fn replace_all(&mut self, other: CategoryMap) {
        self.labels = other.labels;
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl CategoryResolver for CategoryMap {
    fn label(&self, id: &str) -> Option<String> {
        self.labels.get(id).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CategoryMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            labels: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    Deref,
    From,
    Into,
    AsRef,
)]
#[serde(transparent)]
pub struct CategoryId(String);

crate::impl_string_newtype!(CategoryId);

/// One age of the timeline as supplied by the data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(alias = "age_number")]
    pub ordinal_index: i64,
    /// Primary name. Serialized as `name`, the key the data layer uses.
    #[serde(default, rename = "name", alias = "display_name")]
    pub display_name: Option<String>,
    /// Secondary name, used when `name` is missing or blank.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_year: Option<i64>,
    #[serde(default)]
    pub end_year: Option<i64>,
}

impl Category {
    pub fn new(id: impl Into<String>, ordinal_index: i64, display_name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(id),
            ordinal_index,
            display_name: Some(display_name.into()),
            title: None,
            description: None,
            start_year: None,
            end_year: None,
        }
    }

    /// Text drawn along the ring: the name, else the title, else the ordinal.
    pub fn label(&self) -> String {
        [&self.display_name, &self.title]
            .into_iter()
            .filter_map(|name| name.as_deref().map(str::trim))
            .find(|name| !name.is_empty())
            .map_or_else(|| format!("Age {}", self.ordinal_index), str::to_string)
    }

    /// Year span shown under the title of an expanded age, open ends rendered as `∞`.
    pub fn subtitle(&self) -> String {
        let year = |y: Option<i64>| y.map_or_else(|| "∞".to_string(), |y| y.to_string());
        format!("{} – {}", year(self.start_year), year(self.end_year))
    }
}

/// Orders categories innermost-first and drops repeated ids, keeping the lowest ordinal.
pub fn arrange(mut categories: Vec<Category>) -> Vec<Category> {
    categories.sort_by(|a, b| {
        a.ordinal_index
            .cmp(&b.ordinal_index)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut seen = HashSet::new();
    categories.retain(|c| {
        let fresh = seen.insert(c.id.clone());
        if !fresh {
            log::warn!("Dropping duplicate category id '{}'", c.id);
        }
        fresh
    });
    categories
}

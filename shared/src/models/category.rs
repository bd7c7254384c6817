//! Category Model

use serde::{Deserialize, Serialize};

/// Selectable attribute declared by a category (e.g. "Color": red, blue)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    /// Allowed values, in declared order
    #[serde(default)]
    pub values: Vec<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Category entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    /// Parent category reference (None = root). Not guaranteed to resolve.
    #[serde(default, alias = "parent")]
    pub parent_id: Option<String>,
    /// Properties declared on this category only (inherited ones are resolved separately)
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

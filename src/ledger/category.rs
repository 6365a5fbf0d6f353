use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Categorises ledger activity for reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub kind: CategoryKind,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
        }
    }
}

/// Supported category types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Expense,
    Income,
}

/// Id-keyed view of the caller's categories.
///
/// References that do not resolve fall back to the uncategorized sentinel;
/// a deleted category never turns into an error.
#[derive(Debug, Clone)]
pub struct CategoryLookup {
    categories: HashMap<Uuid, Category>,
    uncategorized_label: String,
}

impl Default for CategoryLookup {
    fn default() -> Self {
        Self {
            categories: HashMap::new(),
            uncategorized_label: UNCATEGORIZED_LABEL.to_string(),
        }
    }
}

impl CategoryLookup {
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut lookup = Self::default();
        for category in categories {
            lookup.insert(category);
        }
        lookup
    }

    pub fn with_uncategorized_label(mut self, label: impl Into<String>) -> Self {
        self.uncategorized_label = label.into();
        self
    }

    pub fn insert(&mut self, category: Category) {
        self.categories.insert(category.id, category);
    }

    /// Resolves a weak reference, treating dangling ids as uncategorized.
    pub fn resolve(&self, id: Option<Uuid>) -> Option<&Category> {
        let id = id?;
        let found = self.categories.get(&id);
        if found.is_none() {
            tracing::debug!(category_id = %id, "dangling category reference treated as uncategorized");
        }
        found
    }

    pub fn name_for(&self, id: Option<Uuid>) -> &str {
        self.resolve(id)
            .map(|category| category.name.as_str())
            .unwrap_or(&self.uncategorized_label)
    }
}

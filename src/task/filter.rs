//! Per-category visibility flags.

use std::collections::BTreeMap;

use super::category::Category;
use super::task::Task;

/// Category name → visible.
///
/// Keys are free-form: toggling a name no task uses is allowed and simply has
/// no visible effect. A key that was never set counts as visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    flags: BTreeMap<String, bool>,
}

impl Default for FilterSet {
    fn default() -> Self {
        Self { flags: Category::ALL.iter().map(|c| (c.as_str().to_string(), true)).collect() }
    }
}

impl FilterSet {
    /// Default set with the given categories hidden.
    #[must_use]
    pub fn with_hidden(hidden: &[Category]) -> Self {
        let mut set = Self::default();
        for category in hidden {
            set.flags.insert(category.as_str().to_string(), false);
        }
        set
    }

    /// Whether tasks of `category` are shown.
    #[must_use]
    pub fn is_visible(&self, category: &str) -> bool {
        self.flags.get(category).copied().unwrap_or(true)
    }

    /// Flips the flag for `category` and returns the new value.
    pub fn toggle(&mut self, category: &str) -> bool {
        let visible = !self.is_visible(category);
        self.flags.insert(category.to_string(), visible);
        visible
    }

    /// Whether `task` passes the filter.
    ///
    /// An uncategorized task passes exactly when `work` is visible, whatever
    /// the other flags say.
    #[must_use]
    pub fn admits(&self, task: &Task) -> bool {
        match task.fields().category {
            Some(category) => self.is_visible(category.as_str()),
            None => self.is_visible(Category::Work.as_str()),
        }
    }

    /// Iterates over every explicitly set flag.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

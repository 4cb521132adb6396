//! Configuration options for block conversion

use std::fmt;
use std::sync::Arc;

/// Bullet glyph used for unordered list items
pub const DEFAULT_BULLET: &str = "• ";

/// Maps a task item's checked state to its display prefix
pub type CheckboxPrefixFn = Arc<dyn Fn(bool) -> String + Send + Sync>;

/// List rendering options
#[derive(Clone, Default)]
pub struct ListOptions {
    /// Prefix for task list items; `None` renders them with [`DEFAULT_BULLET`]
    pub checkbox_prefix: Option<CheckboxPrefixFn>,
}

impl ListOptions {
    pub fn with_checkbox_prefix<F>(f: F) -> Self
    where
        F: Fn(bool) -> String + Send + Sync + 'static,
    {
        Self {
            checkbox_prefix: Some(Arc::new(f)),
        }
    }

    /// Prefix for an item with an explicit checked state
    pub fn checkbox(&self, checked: bool) -> String {
        match &self.checkbox_prefix {
            Some(f) => f(checked),
            None => DEFAULT_BULLET.to_string(),
        }
    }
}

impl fmt::Debug for ListOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListOptions")
            .field(
                "checkbox_prefix",
                &self.checkbox_prefix.as_ref().map(|_| "Fn(bool) -> String"),
            )
            .finish()
    }
}

/// Options for block conversion
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// List rendering
    pub lists: ListOptions,
}

//! Domain records
//!
//! Recipes and users as stored, the filters their list endpoints accept, and
//! the views returned to clients. Every record here implements
//! [`Record`](crate::store::Record) so it can be paginated by any store.

mod recipe;
mod user;

pub use recipe::{slugify, Difficulty, Recipe, RecipeFilter, RecipeQuery, RecipeView};
pub use user::{Role, User, UserFilter, UserView};

use serde::{Deserialize, Serialize};

/// The caller on whose behalf a list is produced
///
/// `None` wherever a `Option<&Viewer>` is accepted means an anonymous caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewer {
    /// User id of the caller
    pub id: String,
}

impl Viewer {
    /// Create a viewer for the given user id
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Normalise a tag or ingredient name (trimmed, lowercase)
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Normalise a list of labels, dropping blanks and repeats (first one wins)
pub fn normalize_labels<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = normalize_label(label.as_ref());
        if !label.is_empty() && !out.contains(&label) {
            out.push(label);
        }
    }
    out
}

/// Case-insensitive substring match
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

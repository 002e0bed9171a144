//! Resolution of id references between workshop entities.

use std::fmt;

/// Label shown for an id that no longer resolves.
pub const NOT_FOUND_LABEL: &str = "Not found";

/// Label shown for an entity that resolves but has no text yet.
pub const NOT_SPECIFIED_LABEL: &str = "Not specified";

/// Entities that have a human-readable description.
pub trait Describe {
    fn description(&self) -> &str;
}

/// Outcome of following an id into one of the aggregate's lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference<'a, I, T> {
    Found(&'a T),
    Missing(&'a I),
}

impl<'a, I, T: Describe> Reference<'a, I, T> {
    /// Display label: the description, or a placeholder when missing or blank.
    pub fn label(&self) -> &'a str {
        match self {
            Reference::Found(entity) => {
                let entity: &'a T = *entity;
                let text = entity.description();
                if text.trim().is_empty() {
                    NOT_SPECIFIED_LABEL
                } else {
                    text
                }
            }
            Reference::Missing(_) => NOT_FOUND_LABEL,
        }
    }
}

impl<'a, I, T> Reference<'a, I, T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Reference::Found(_))
    }

    pub fn entity(&self) -> Option<&'a T> {
        match self {
            Reference::Found(entity) => Some(*entity),
            Reference::Missing(_) => None,
        }
    }

    /// Resolves `id` against `lookup`.
    pub fn resolve(id: &'a I, lookup: impl FnOnce(&I) -> Option<&'a T>) -> Self {
        match lookup(id) {
            Some(entity) => Reference::Found(entity),
            None => Reference::Missing(id),
        }
    }
}

impl<I, T: Describe> fmt::Display for Reference<'_, I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

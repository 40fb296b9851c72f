//! Resolves the previous and next pages for a doc page from its navigation
//! tree.

use crate::nav::{flatten, NavEntry};
use gtmpl::Value;

/// The pages adjacent to the current page in navigation order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pagination<'a> {
    /// The entry before the current page, if any.
    pub prev: Option<&'a NavEntry>,

    /// The entry after the current page, if any.
    pub next: Option<&'a NavEntry>,
}

impl Pagination<'_> {
    /// Converts an optional link into a template value: the link's `title`
    /// and `url`, or [`Value::Nil`] so templates can test it with `if`.
    pub fn link_value(link: Option<&NavEntry>) -> Value {
        match link {
            Some(entry) => entry.to_link_value(),
            None => Value::Nil,
        }
    }
}

/// Finds `current_url` in the flattened `tree` and returns its neighbors.
/// When the URL isn't in the tree, both neighbors are `None`; a page outside
/// the navigation simply renders without pagination links. If the URL occurs
/// more than once, the first occurrence wins.
pub fn resolve_pagination<'a>(current_url: &str, tree: &'a [NavEntry]) -> Pagination<'a> {
    resolve_flattened(current_url, &flatten(tree))
}

/// Like [`resolve_pagination`], for a tree that was already flattened with
/// [`flatten`].
pub fn resolve_flattened<'a>(current_url: &str, flattened: &[&'a NavEntry]) -> Pagination<'a> {
    match flattened.iter().position(|entry| entry.url == current_url) {
        None => Pagination::default(),
        Some(i) => Pagination {
            prev: match i < 1 {
                true => None,
                false => Some(flattened[i - 1]),
            },
            next: flattened.get(i + 1).copied(),
        },
    }
}

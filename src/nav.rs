//! Defines the [`NavEntry`] type, the navigation trees that drive the
//! sidebar, and [`flatten`], which linearizes a tree in the order the sidebar
//! displays it.

use gtmpl::Value;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};

/// One node of a navigation tree: a link to a documentation or guide page,
/// possibly with nested sub-links.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NavEntry {
    /// The link text.
    pub title: String,

    /// The page's canonical path. Expected to be unique within a tree.
    pub url: String,

    /// Nested entries, in display order.
    #[serde(default)]
    pub children: Vec<NavEntry>,
}

impl NavEntry {
    /// Converts the entry (without its children) into a [`Value`] with fields
    /// `title` and `url`. This is the shape of the `prev` and `next` links.
    pub fn to_link_value(&self) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), (&self.title).into());
        m.insert("url".to_owned(), (&self.url).into());
        Value::Object(m)
    }

    /// Converts the entry and its children into a sidebar [`Value`]. An entry
    /// is `active` when `permalink` contains the entry's URL, so parents of
    /// the current page are highlighted along with the page itself.
    pub fn to_sidebar_value(&self, permalink: &str) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), (&self.title).into());
        m.insert("url".to_owned(), (&self.url).into());
        m.insert(
            "active".to_owned(),
            Value::Bool(permalink.contains(self.url.as_str())),
        );
        m.insert(
            "children".to_owned(),
            sidebar_value(&self.children, permalink),
        );
        Value::Object(m)
    }
}

/// Converts a whole tree into the sidebar [`Value`] for the page at
/// `permalink`. See [`NavEntry::to_sidebar_value`].
pub fn sidebar_value(tree: &[NavEntry], permalink: &str) -> Value {
    Value::Array(
        tree.iter()
            .map(|entry| entry.to_sidebar_value(permalink))
            .collect(),
    )
}

/// Linearizes `tree` depth-first in pre-order: each entry is followed by all
/// of its descendants before its next sibling. The result borrows from
/// `tree` and is stable for a given input.
pub fn flatten(tree: &[NavEntry]) -> Vec<&NavEntry> {
    let mut flattened = Vec::new();

    // Siblings are pushed in reverse so the first one is popped first.
    let mut stack: Vec<&NavEntry> = tree.iter().rev().collect();
    while let Some(entry) = stack.pop() {
        flattened.push(entry);
        stack.extend(entry.children.iter().rev());
    }

    flattened
}

/// Returns every URL that appears more than once in `tree`, in flatten
/// order, each reported once.
pub fn duplicate_urls(tree: &[NavEntry]) -> Vec<&str> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut reported: HashSet<&str> = HashSet::new();
    let mut duplicates = Vec::new();
    for entry in flatten(tree) {
        let url = entry.url.as_str();
        if !seen.insert(url) && reported.insert(url) {
            duplicates.push(url);
        }
    }
    duplicates
}

/// Loads a navigation tree from a YAML file holding a sequence of entries.
/// Duplicate URLs are logged but tolerated; lookups resolve to the first
/// occurrence.
pub fn load_tree(path: &Path) -> Result<Vec<NavEntry>> {
    let file = File::open(path).map_err(|err| Error::Open {
        path: path.to_owned(),
        err,
    })?;
    let tree: Vec<NavEntry> =
        serde_yaml::from_reader(file).map_err(|err| Error::Deserialize {
            path: path.to_owned(),
            err,
        })?;

    for url in duplicate_urls(&tree) {
        tracing::warn!(path = %path.display(), url, "duplicate navigation url");
    }

    Ok(tree)
}

/// The result of loading a navigation tree.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading a navigation tree.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the navigation file can't be opened.
    #[error("Opening navigation file '{}': {err}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when the navigation file isn't a valid sequence of entries.
    #[error("Parsing navigation file '{}': {err}", path.display())]
    Deserialize {
        path: PathBuf,
        #[source]
        err: serde_yaml::Error,
    },
}

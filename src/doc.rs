//! Defines the [`Doc`] type, a parsed documentation or guide page, and
//! [`PageType`], which decides the page's category and navigation tree.

use gtmpl::Value;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Which section of the site a page belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageType {
    Docs,
    Guides,
}

impl Default for PageType {
    fn default() -> Self {
        PageType::Docs
    }
}

impl PageType {
    /// The breadcrumb label for the section.
    pub fn category(self) -> &'static str {
        match self {
            PageType::Guides => "Guides",
            PageType::Docs => "Documentation",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PageType::Guides => "guides",
            PageType::Docs => "docs",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PageType {
    type Err = std::convert::Infallible;

    /// Anything other than `guides` is a docs page.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "guides" => PageType::Guides,
            _ => PageType::Docs,
        })
    }
}

impl<'de> Deserialize<'de> for PageType {
    fn deserialize<D>(deserializer: D) -> Result<PageType, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse::<PageType>()
            .map_err(|e| D::Error::custom(format!("{}", e)))
    }
}

/// A page parsed from a Markdown source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Doc {
    /// The page title, shown in the breadcrumb and as the article heading.
    pub title: String,

    /// Selects the breadcrumb category and the navigation tree.
    pub page_type: PageType,

    /// The page's canonical path, e.g., `/docs/quickstart`. This is what the
    /// navigation trees refer to.
    pub permalink: String,

    /// The source path relative to the content directory, used for the edit
    /// link.
    pub source_path: String,

    /// The target location on disk for the output file.
    pub file_path: PathBuf,

    /// The rendered HTML body.
    pub body: String,
}

impl Doc {
    /// The `id` for the article heading.
    pub fn anchor(&self) -> String {
        slug::slugify(&self.title)
    }

    /// Converts the page's own fields into a [`Value::Object`] with fields
    /// `title`, `anchor`, `category`, `page_type`, `permalink`, and `body`.
    /// Navigation, pagination and site-wide fields are added by the writer.
    pub fn to_value(&self) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), (&self.title).into());
        m.insert("anchor".to_owned(), Value::String(self.anchor()));
        m.insert(
            "category".to_owned(),
            Value::String(self.page_type.category().to_owned()),
        );
        m.insert(
            "page_type".to_owned(),
            Value::String(self.page_type.to_string()),
        );
        m.insert("permalink".to_owned(), (&self.permalink).into());
        m.insert("body".to_owned(), (&self.body).into());
        Value::Object(m)
    }
}

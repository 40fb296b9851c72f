//! The library code for the `docpages` static site generator, which builds
//! documentation and guide pages from Markdown sources and two navigation
//! trees. The architecture can be broken down into three steps:
//!
//! 1. Parsing pages from source files on disk ([`crate::parser`])
//! 2. Loading the docs and guides navigation trees ([`crate::nav`])
//! 3. Composing and writing each page ([`crate::write`])
//!
//! The third step does most of the work. Each page is rendered with the
//! navigation tree for its page type: the tree becomes the sidebar, and
//! flattening it in sidebar order gives the previous and next pages
//! ([`crate::pagination`]). The page also gets a breadcrumb, an edit link,
//! and the search widget ([`crate::search`]) when those are configured.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod doc;
pub mod nav;
pub mod pagination;
pub mod parser;
pub mod search;
pub mod write;

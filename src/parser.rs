//! Defines the [`Parser`] and [`Error`] types: the logic for parsing doc
//! pages from the content directory into [`Doc`] objects.

use std::{
    fs::File,
    path::{Component, Path, PathBuf},
};

use pulldown_cmark::{html, Options};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::doc::{Doc, PageType};

const MARKDOWN_EXTENSION: &str = "md";

/// Parses [`Doc`] objects from source files.
pub struct Parser<'a> {
    /// `output_directory` is the directory in which pages will be rendered.
    /// A page with permalink `/docs/api` is written to
    /// `{output_directory}/docs/api/index.html`.
    output_directory: &'a Path,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(output_directory: &'a Path) -> Parser<'a> {
        Parser { output_directory }
    }

    /// Searches `source_directory` recursively for Markdown files and returns
    /// the parsed [`Doc`]s sorted by permalink. Each file must be structured
    /// as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with field `Title` and optionally `Type` and
    ///    `Permalink`
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Page body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// Title: Quickstart
    /// Type: docs
    /// ---
    /// # Install
    /// ```
    pub fn parse_docs(&self, source_directory: &Path) -> Result<Vec<Doc>> {
        let mut docs = Vec::new();
        for result in WalkDir::new(source_directory) {
            let entry = result?;
            let is_markdown = entry
                .path()
                .extension()
                .map_or(false, |ext| ext == MARKDOWN_EXTENSION);
            if entry.file_type().is_file() && is_markdown {
                // strip_prefix() should never fail; walkdir yields paths
                // beneath `source_directory`.
                let relative_path = entry
                    .path()
                    .strip_prefix(source_directory)
                    .map_err(|_| InvalidFileNameError(entry.path().to_owned()))?;
                docs.push(self.parse_doc(source_directory, relative_path)?);
            }
        }

        docs.sort_by(|a, b| a.permalink.cmp(&b.permalink));
        if let Some([first, second]) = docs
            .windows(2)
            .find(|pair| pair[0].permalink == pair[1].permalink)
        {
            return Err(Error::DuplicatePermalink {
                permalink: first.permalink.clone(),
                first: first.source_path.clone(),
                second: second.source_path.clone(),
            });
        }
        tracing::debug!(
            directory = %source_directory.display(),
            count = docs.len(),
            "parsed docs"
        );
        Ok(docs)
    }

    /// Parses a single [`Doc`], annotating any error with the page's path.
    fn parse_doc(&self, source_directory: &Path, relative_path: &Path) -> Result<Doc> {
        match self._parse_doc(source_directory, relative_path) {
            Ok(doc) => Ok(doc),
            Err(e) => Err(Error::Annotated(
                format!("parsing doc `{}`", relative_path.display()),
                Box::new(e),
            )),
        }
    }

    fn _parse_doc(&self, source_directory: &Path, relative_path: &Path) -> Result<Doc> {
        use std::io::Read;
        let mut contents = String::new();
        File::open(source_directory.join(relative_path))?.read_to_string(&mut contents)?;

        let (frontmatter, body) = split_frontmatter(&contents)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(frontmatter)?;

        let source_path = source_path(relative_path)?;
        let permalink = match frontmatter.permalink {
            Some(permalink) if is_valid_permalink(&permalink) => permalink,
            Some(permalink) => return Err(Error::InvalidPermalink(permalink)),
            None => derive_permalink(&source_path),
        };

        Ok(Doc {
            title: frontmatter.title,
            page_type: frontmatter.page_type,
            file_path: output_file_path(self.output_directory, &permalink),
            permalink,
            source_path,
            body: markdown_to_html(body),
        })
    }
}

/// A permalink starts with `/` and has no `.` or `..` segments, so the page
/// stays inside the output directory.
fn is_valid_permalink(permalink: &str) -> bool {
    permalink.starts_with('/')
        && permalink
            .split('/')
            .all(|segment| segment != "." && segment != "..")
}

/// Splits a source file into its YAML frontmatter and its Markdown body. The
/// closing fence must start a line.
fn split_frontmatter(input: &str) -> Result<(&str, &str)> {
    const FENCE: &str = "---";
    const CLOSING_FENCE: &str = "\n---";
    if !input.starts_with(FENCE) {
        return Err(Error::FrontmatterMissingStartFence);
    }
    let rest = &input[FENCE.len()..];
    match rest.find(CLOSING_FENCE) {
        None => Err(Error::FrontmatterMissingEndFence),
        Some(offset) => Ok((
            &rest[..offset + 1],                    // yaml, keeping its final newline
            &rest[offset + CLOSING_FENCE.len()..], // body
        )),
    }
}

/// Joins the components of `relative_path` with `/` so the result is the same
/// on every platform.
fn source_path(relative_path: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative_path.components() {
        match component {
            Component::Normal(part) => parts.push(
                part.to_str()
                    .ok_or_else(|| InvalidFileNameError(relative_path.to_owned()))?,
            ),
            _ => return Err(InvalidFileNameError(relative_path.to_owned()).into()),
        }
    }
    Ok(parts.join("/"))
}

/// Maps a `/`-separated source path to a permalink: `docs/api.md` becomes
/// `/docs/api` and `docs/index.md` becomes `/docs`.
fn derive_permalink(source_path: &str) -> String {
    let without_extension = source_path.strip_suffix(".md").unwrap_or(source_path);
    let stem = match without_extension {
        "index" => "",
        _ => without_extension
            .strip_suffix("/index")
            .unwrap_or(without_extension),
    };
    format!("/{}", stem)
}

fn output_file_path(output_directory: &Path, permalink: &str) -> PathBuf {
    let mut path = output_directory.to_owned();
    for segment in permalink.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path.join("index.html")
}

fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut body = String::new();
    html::push_html(&mut body, pulldown_cmark::Parser::new_ext(markdown, options));
    body
}

#[derive(Deserialize, Clone)]
struct Frontmatter {
    /// The title of the page.
    #[serde(rename = "Title")]
    pub title: String,

    /// `guides` for guide pages; anything else (or nothing) for docs pages.
    #[serde(default, rename = "Type")]
    pub page_type: PageType,

    /// Overrides the permalink derived from the source path.
    #[serde(default, rename = "Permalink")]
    pub permalink: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid file name: {0:?}")]
pub struct InvalidFileNameError(PathBuf);

/// Represents the result of a [`Doc`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Doc`] object.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a source file is missing its starting frontmatter fence
    /// (`---`).
    #[error("Page must begin with `---`")]
    FrontmatterMissingStartFence,

    /// Returned when a source file is missing its terminal frontmatter fence.
    #[error("Missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    #[error(transparent)]
    DeserializeYaml(#[from] serde_yaml::Error),

    /// Returned when a `Permalink` doesn't start with `/` or has a `.` or
    /// `..` segment.
    #[error("permalink must start with `/` and have no `.` or `..` segments: {0:?}")]
    InvalidPermalink(String),

    /// Returned when two pages resolve to the same permalink.
    #[error("`{first}` and `{second}` both have permalink {permalink:?}")]
    DuplicatePermalink {
        permalink: String,
        first: String,
        second: String,
    },

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned for WalkDir I/O errors.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Returned when a source path isn't valid UTF-8.
    #[error(transparent)]
    InvalidFileName(#[from] InvalidFileNameError),

    /// An error with an annotation.
    #[error("{0}: {1}")]
    Annotated(String, #[source] Box<Error>),
}

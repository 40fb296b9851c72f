//! Loads the project configuration (`docpages.yaml`) and the theme
//! configuration (`theme/theme.yaml`) into a [`Config`].

use crate::search::SearchWidget;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "docpages.yaml";

#[derive(Deserialize)]
struct Navigation {
    #[serde(default = "Navigation::default_docs")]
    docs: PathBuf,

    #[serde(default = "Navigation::default_guides")]
    guides: PathBuf,
}

impl Navigation {
    fn default_docs() -> PathBuf {
        PathBuf::from("nav/docs.yaml")
    }

    fn default_guides() -> PathBuf {
        PathBuf::from("nav/guides.yaml")
    }
}

impl Default for Navigation {
    fn default() -> Self {
        Navigation {
            docs: Navigation::default_docs(),
            guides: Navigation::default_guides(),
        }
    }
}

#[derive(Deserialize)]
struct Project {
    site_root: Url,

    #[serde(default)]
    home_page: String,

    #[serde(default)]
    edit_base: Option<Url>,

    #[serde(default)]
    navigation: Navigation,

    #[serde(default)]
    search: Option<SearchWidget>,
}

#[derive(Deserialize)]
struct Theme {
    doc_template: Vec<PathBuf>,
}

/// Everything [`crate::build::build_site`] needs to build a site.
#[derive(Debug)]
pub struct Config {
    /// The directory holding the Markdown pages (`{project}/content`).
    pub content_directory: PathBuf,

    /// The navigation tree file for docs pages.
    pub docs_navigation: PathBuf,

    /// The navigation tree file for guide pages.
    pub guides_navigation: PathBuf,

    /// The URL of the site's home page.
    pub home_page: Url,

    /// The URL under which static assets are served.
    pub static_url: Url,

    /// Prefix for "edit this page" links. The page's source path is appended
    /// verbatim.
    pub edit_base: Option<Url>,

    /// Search widget settings, if the site has search.
    pub search: Option<SearchWidget>,

    /// Template files for doc pages, concatenated in order before parsing.
    pub doc_template: Vec<PathBuf>,

    /// The theme's static asset directory.
    pub static_source_directory: PathBuf,

    /// The directory the site is written to.
    pub root_output_directory: PathBuf,

    /// The directory static assets are copied to.
    pub static_output_directory: PathBuf,
}

impl Config {
    /// Finds [`PROJECT_FILE`] in `dir` or the nearest ancestor of `dir` and
    /// loads it with [`Config::from_project_file`].
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let mut current = Some(dir);
        while let Some(dir) = current {
            let path = dir.join(PROJECT_FILE);
            if path.exists() {
                return Config::from_project_file(&path, output_directory);
            }
            current = dir.parent();
        }
        Err(Error::ProjectFileNotFound(dir.to_owned()))
    }

    /// Loads the project file at `path` and its theme. When `output_directory`
    /// is `None`, the site is written to `{project}/_output`.
    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path)?).map_err(|err| {
            Error::Deserialize {
                path: path.to_owned(),
                err,
            }
        })?;
        let project_root = path
            .parent()
            .ok_or_else(|| Error::NoParentDirectory(path.to_owned()))?;

        let theme_dir = project_root.join("theme");
        let theme_path = theme_dir.join("theme.yaml");
        let theme: Theme = serde_yaml::from_reader(open(&theme_path)?).map_err(|err| {
            Error::Deserialize {
                path: theme_path.clone(),
                err,
            }
        })?;

        let root_output_directory = match output_directory {
            Some(dir) => dir.to_owned(),
            None => project_root.join("_output"),
        };

        Ok(Config {
            content_directory: project_root.join("content"),
            docs_navigation: project_root.join(&project.navigation.docs),
            guides_navigation: project_root.join(&project.navigation.guides),
            home_page: project.site_root.join(&project.home_page)?,
            static_url: project.site_root.join("static/")?,
            edit_base: project.edit_base,
            search: project.search,
            doc_template: theme
                .doc_template
                .iter()
                .map(|relpath| theme_dir.join(relpath))
                .collect(),
            static_source_directory: theme_dir.join("static"),
            static_output_directory: root_output_directory.join("static"),
            root_output_directory,
        })
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|err| Error::Open {
        path: path.to_owned(),
        err,
    })
}

/// The result of loading configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the project or theme configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when no ancestor of the starting directory has a project
    /// file.
    #[error("Could not find `docpages.yaml` in '{}' or any parent directory", .0.display())]
    ProjectFileNotFound(PathBuf),

    /// Returned when a configuration file can't be opened.
    #[error("Opening '{}': {err}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when a configuration file isn't valid.
    #[error("Loading configuration '{}': {err}", path.display())]
    Deserialize {
        path: PathBuf,
        #[source]
        err: serde_yaml::Error,
    },

    /// Returned when the project file path has no parent directory.
    #[error("Can't get parent directory for project file '{}'", .0.display())]
    NoParentDirectory(PathBuf),

    /// Returned when the site URLs can't be joined.
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
}

//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: parsing the doc pages
//! ([`crate::parser`]), loading the navigation trees ([`crate::nav`]),
//! rendering the pages ([`crate::write`]), and copying the theme's static
//! directory into the output directory.

use crate::config::Config;
use crate::nav::{self, load_tree};
use crate::parser::{self, Parser};
use crate::write::{self, Writer};
use gtmpl::Template;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Marks an output directory as created by `docpages`. Only directories
/// carrying this file are deleted before a rebuild.
pub const WATERMARK_FILE: &str = ".docpages";

/// Builds the site from a [`Config`] object and returns the number of pages
/// written. This calls into [`Parser::parse_docs`], [`load_tree`], and
/// [`Writer::write_docs`] which do the heavy-lifting.
pub fn build_site(config: &Config) -> Result<usize> {
    tracing::info!(
        content = %config.content_directory.display(),
        output = %config.root_output_directory.display(),
        "building site"
    );

    let docs =
        Parser::new(&config.root_output_directory).parse_docs(&config.content_directory)?;
    let docs_navigation = load_tree(&config.docs_navigation)?;
    let guides_navigation = load_tree(&config.guides_navigation)?;
    let doc_template = parse_template(config.doc_template.iter())?;

    clean_output(&config.root_output_directory)?;

    let writer = Writer {
        doc_template: &doc_template,
        docs_navigation: &docs_navigation,
        guides_navigation: &guides_navigation,
        edit_base: config.edit_base.as_ref(),
        search: config.search.as_ref(),
        home_page: &config.home_page,
        static_url: &config.static_url,
    };
    writer.write_docs(&docs)?;

    if config.static_source_directory.is_dir() {
        copy_dir(
            &config.static_source_directory,
            &config.static_output_directory,
        )?;
    }

    tracing::info!(pages = docs.len(), "built site");
    Ok(docs.len())
}

// Deletes a previous build and recreates the output directory with a
// watermark. Refuses to delete a non-empty directory without the watermark,
// in case the user passed the wrong directory.
fn clean_output(dir: &Path) -> Result<()> {
    if dir.exists() {
        let is_empty = std::fs::read_dir(dir)?.next().is_none();
        if !is_empty && !dir.join(WATERMARK_FILE).is_file() {
            return Err(Error::UnmanagedOutput(dir.to_owned()));
        }
        std::fs::remove_dir_all(dir).map_err(|err| Error::Clean {
            path: dir.to_owned(),
            err,
        })?;
    }
    std::fs::create_dir_all(dir)?;
    File::create(dir.join(WATERMARK_FILE))?;
    Ok(())
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &dst.join(entry.file_name()))?;
        } else {
            std::fs::copy(entry.path(), dst.join(entry.file_name()))?;
        }
    }

    Ok(())
}

// Loads the template file contents, concatenates them, and parses the result
// into a template.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(template_file)
            .map_err(|err| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing, loading
/// navigation, writing, cleaning output directories, parsing template files,
/// and other I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for errors parsing doc pages.
    #[error(transparent)]
    Parse(#[from] parser::Error),

    /// Returned for errors loading a navigation tree.
    #[error(transparent)]
    Navigation(#[from] nav::Error),

    /// Returned for errors writing pages to disk as HTML files.
    #[error(transparent)]
    Write(#[from] write::Error),

    /// Returned when the output directory has content that `docpages` didn't
    /// create.
    #[error(
        "Refusing to clean '{}': it is not empty and has no `{}` file",
        .0.display(),
        WATERMARK_FILE
    )]
    UnmanagedOutput(PathBuf),

    /// Returned for I/O problems while cleaning output directories.
    #[error("Cleaning directory '{}': {err}", path.display())]
    Clean {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned for I/O problems while opening template files.
    #[error("Opening template file '{}': {err}", path.display())]
    OpenTemplateFile {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned for errors parsing template files.
    #[error("Parsing template: {0}")]
    ParseTemplate(String),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    const PROJECT: &str = "\
site_root: https://example.org/
edit_base: https://github.com/example/site/tree/main/content/
search:
  api_key: key
  index_name: example
";

    const DOCS_NAV: &str = "\
- title: Quickstart
  url: /docs/quickstart
- title: API
  url: /docs/api
  children:
    - title: Editor
      url: /docs/api/editor
";

    const GUIDES_NAV: &str = "\
- title: Why
  url: /guides/why
";

    const TEMPLATE: &str = "\
{{ define \"links\" }}\
{{ with .prev }}<a class=\"prev\" href=\"{{ .url }}\">{{ .title }}</a>{{ end }}\
{{ with .next }}<a class=\"next\" href=\"{{ .url }}\">{{ .title }}</a>{{ end }}\
{{ end }}";

    const DOC_TEMPLATE: &str = "\
<link rel=\"stylesheet\" href=\"{{ .static_url }}style.css\">\
<span>{{ .category }}:</span><span>{{ .title }}</span>\
{{ if .edit_url }}<a class=\"edit\" href=\"{{ .edit_url }}\">Edit</a>{{ end }}\
<h1 id=\"{{ .anchor }}\">{{ .title }}</h1>{{ .body }}\
{{ template \"links\" . }}";

    fn write(root: &Path, relative_path: &str, contents: &str) -> std::io::Result<()> {
        let path = root.join(relative_path);
        fs::create_dir_all(path.parent().unwrap())?;
        fs::write(path, contents)
    }

    fn project() -> std::io::Result<tempfile::TempDir> {
        let dir = tempfile::tempdir()?;
        let root = dir.path();
        write(root, "docpages.yaml", PROJECT)?;
        write(root, "nav/docs.yaml", DOCS_NAV)?;
        write(root, "nav/guides.yaml", GUIDES_NAV)?;
        write(
            root,
            "theme/theme.yaml",
            "doc_template: [links.html, doc.html]\n",
        )?;
        write(root, "theme/links.html", TEMPLATE)?;
        write(root, "theme/doc.html", DOC_TEMPLATE)?;
        write(root, "theme/static/style.css", "body {}")?;
        write(root, "theme/static/fonts/a.woff", "font")?;
        write(
            root,
            "content/docs/quickstart.md",
            "---\nTitle: Quickstart\n---\nInstall it.\n",
        )?;
        write(root, "content/docs/api.md", "---\nTitle: API\n---\nCall it.\n")?;
        write(
            root,
            "content/docs/api/editor.md",
            "---\nTitle: Editor\n---\nEdit it.\n",
        )?;
        write(
            root,
            "content/guides/why.md",
            "---\nTitle: Why\nType: guides\n---\nBecause.\n",
        )?;
        Ok(dir)
    }

    #[test]
    fn test_build_site() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = project()?;
        let config = Config::from_directory(dir.path(), None)?;

        assert_eq!(4, build_site(&config)?);

        let out = dir.path().join("_output");
        let api = fs::read_to_string(out.join("docs/api/index.html"))?;
        assert!(api.contains("<span>Documentation:</span><span>API</span>"));
        assert!(api.contains(
            "href=\"https://github.com/example/site/tree/main/content/docs/api.md\""
        ));
        assert!(api.contains("<h1 id=\"api\">API</h1><p>Call it.</p>"));
        assert!(api.contains("<a class=\"prev\" href=\"/docs/quickstart\">Quickstart</a>"));
        assert!(api.contains("<a class=\"next\" href=\"/docs/api/editor\">Editor</a>"));
        assert!(api.contains("href=\"https://example.org/static/style.css\""));

        let quickstart = fs::read_to_string(out.join("docs/quickstart/index.html"))?;
        assert!(!quickstart.contains("class=\"prev\""));

        let editor = fs::read_to_string(out.join("docs/api/editor/index.html"))?;
        assert!(!editor.contains("class=\"next\""));

        let why = fs::read_to_string(out.join("guides/why/index.html"))?;
        assert!(why.contains("<span>Guides:</span><span>Why</span>"));
        assert!(!why.contains("class=\"prev\""));
        assert!(!why.contains("class=\"next\""));

        assert_eq!("body {}", fs::read_to_string(out.join("static/style.css"))?);
        assert_eq!("font", fs::read_to_string(out.join("static/fonts/a.woff"))?);
        assert!(out.join(WATERMARK_FILE).is_file());
        Ok(())
    }

    #[test]
    fn test_rebuild_replaces_previous_output() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = project()?;
        let config = Config::from_directory(dir.path(), None)?;
        build_site(&config)?;

        let stale = dir.path().join("_output/docs/removed/index.html");
        write(dir.path(), "_output/docs/removed/index.html", "stale")?;
        build_site(&config)?;

        assert!(!stale.exists());
        Ok(())
    }

    #[test]
    fn test_refuses_unmanaged_output() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = project()?;
        let output = dir.path().join("precious");
        write(&output, "thesis.txt", "do not delete")?;
        let config = Config::from_directory(dir.path(), Some(output.as_path()))?;

        match build_site(&config) {
            Err(Error::UnmanagedOutput(path)) => assert_eq!(output, path),
            other => panic!("expected UnmanagedOutput, got {:?}", other),
        }
        assert!(output.join("thesis.txt").is_file());
        Ok(())
    }
}

use crate::doc::{Doc, PageType};
use crate::nav::{flatten, sidebar_value, NavEntry};
use crate::pagination::{resolve_flattened, Pagination};
use crate::search::SearchWidget;
use gtmpl::{Template, Value};
use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use url::Url;

/// Responsible for composing, templating, and writing HTML pages to disk from
/// [`Doc`] sources.
pub struct Writer<'a> {
    /// The template for doc pages.
    pub doc_template: &'a Template,

    /// The navigation tree for docs pages.
    pub docs_navigation: &'a [NavEntry],

    /// The navigation tree for guide pages.
    pub guides_navigation: &'a [NavEntry],

    /// Prefix for "edit this page" links, if any. The page's source path is
    /// appended to it.
    pub edit_base: Option<&'a Url>,

    /// The search widget placed on each doc page, if any.
    pub search: Option<&'a SearchWidget>,

    /// The URL for the site's home page. This is made available to the
    /// template, typically as the destination for the site-header link.
    pub home_page: &'a Url,

    /// The URL for the static assets. This is made available to the template,
    /// typically for the theme's stylesheet.
    pub static_url: &'a Url,
}

impl Writer<'_> {
    /// The navigation tree a page of type `page_type` belongs to.
    pub fn navigation(&self, page_type: PageType) -> &[NavEntry] {
        match page_type {
            PageType::Guides => self.guides_navigation,
            PageType::Docs => self.docs_navigation,
        }
    }

    /// Composes the full template value for `doc`: the page's own fields
    /// ([`Doc::to_value`]) plus `sidebar`, `prev`, `next`, `edit_url`,
    /// `search`, `home_page`, and `static_url`. Absent links and widgets are
    /// [`Value::Nil`].
    pub fn page_value(&self, doc: &Doc) -> Result<Value> {
        let navigation = self.navigation(doc.page_type);
        let flattened = flatten(navigation);
        if !flattened.iter().any(|e| e.url == doc.permalink) {
            tracing::warn!(
                permalink = %doc.permalink,
                page_type = %doc.page_type,
                "page is not in its navigation tree"
            );
        }
        let pagination = resolve_flattened(&doc.permalink, &flattened);

        let mut value = doc.to_value();
        if let Value::Object(obj) = &mut value {
            obj.insert(
                "sidebar".to_owned(),
                sidebar_value(navigation, &doc.permalink),
            );
            obj.insert("prev".to_owned(), Pagination::link_value(pagination.prev));
            obj.insert("next".to_owned(), Pagination::link_value(pagination.next));
            obj.insert(
                "edit_url".to_owned(),
                match self.edit_base {
                    Some(base) => Value::String(format!("{}{}", base, doc.source_path)),
                    None => Value::Nil,
                },
            );
            obj.insert(
                "search".to_owned(),
                match self.search {
                    Some(search) => search.to_value()?,
                    None => Value::Nil,
                },
            );
            obj.insert(
                "home_page".to_owned(),
                Value::String(self.home_page.to_string()),
            );
            obj.insert(
                "static_url".to_owned(),
                Value::String(self.static_url.to_string()),
            );
        }
        Ok(value)
    }

    /// Renders a single [`Doc`] to a string.
    pub fn render(&self, doc: &Doc) -> Result<String> {
        let mut buf: Vec<u8> = Vec::new();
        self.render_to(doc, &mut buf)?;
        String::from_utf8(buf).map_err(|e| Error::Template(e.to_string()))
    }

    fn render_to(&self, doc: &Doc, w: &mut impl io::Write) -> Result<()> {
        let context = gtmpl::Context::from(self.page_value(doc)?).map_err(Error::Template)?;
        self.doc_template
            .execute(w, &context)
            .map_err(Error::Template)
    }

    /// Takes a slice of [`Doc`]s and writes each page to its
    /// [`Doc::file_path`].
    pub fn write_docs(&self, docs: &[Doc]) -> Result<()> {
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        for doc in docs {
            if let Some(dir) = doc.file_path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir)?;
                }
            }
            let mut file = std::fs::File::create(&doc.file_path)?;
            self.render_to(doc, &mut file)?;
            tracing::debug!(
                permalink = %doc.permalink,
                path = %doc.file_path.display(),
                "wrote page"
            );
        }
        Ok(())
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error during templating.
    #[error("{0}")]
    Template(String),

    /// An error serializing the search widget options.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// An error writing the output files.
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    const TEMPLATE: &str = concat!(
        "<title>{{ .title }}</title>",
        "<span>{{ .category }}:</span><span>{{ .title }}</span>",
        "{{ if .edit_url }}<a class=\"edit\" href=\"{{ .edit_url }}\">Edit on GitHub</a>{{ end }}",
        "<ul>{{ range .sidebar }}<li{{ if .active }} class=\"active\"{{ end }}>",
        "<a href=\"{{ .url }}\">{{ .title }}</a></li>{{ end }}</ul>",
        "<h1 id=\"{{ .anchor }}\">{{ .title }}</h1>{{ .body }}",
        "{{ with .prev }}<a class=\"prev\" href=\"{{ .url }}\">{{ .title }}</a>{{ end }}",
        "{{ with .next }}<a class=\"next\" href=\"{{ .url }}\">{{ .title }}</a>{{ end }}",
        "{{ with .search }}<script>{{ .setup }}{{ .teardown }}</script>{{ end }}",
    );

    fn entry(title: &str, url: &str) -> NavEntry {
        NavEntry {
            title: title.to_owned(),
            url: url.to_owned(),
            children: Vec::new(),
        }
    }

    fn doc(title: &str, page_type: PageType, permalink: &str) -> Doc {
        Doc {
            title: title.to_owned(),
            page_type,
            permalink: permalink.to_owned(),
            source_path: format!("{}.md", permalink.trim_start_matches('/')),
            file_path: PathBuf::from("/unused/index.html"),
            body: String::from("<p>Body</p>"),
        }
    }

    struct Fixture {
        template: Template,
        docs: Vec<NavEntry>,
        guides: Vec<NavEntry>,
        edit_base: Url,
        search: SearchWidget,
        home_page: Url,
        static_url: Url,
    }

    impl Fixture {
        fn new() -> Fixture {
            let mut template = Template::default();
            template.parse(TEMPLATE).unwrap();
            Fixture {
                template,
                docs: vec![
                    NavEntry {
                        title: String::from("Quickstart"),
                        url: String::from("/docs/quickstart"),
                        children: vec![entry("Installation", "/docs/quickstart/installation")],
                    },
                    entry("API", "/docs/api"),
                ],
                guides: vec![entry("Why", "/guides/why"), entry("Cloning", "/guides/cloning")],
                edit_base: Url::parse("https://github.com/example/site/tree/main/content/").unwrap(),
                search: serde_yaml::from_str("api_key: k\nindex_name: idx\n").unwrap(),
                home_page: Url::parse("https://example.org/").unwrap(),
                static_url: Url::parse("https://example.org/static/").unwrap(),
            }
        }

        fn writer(&self, with_extras: bool) -> Writer<'_> {
            Writer {
                doc_template: &self.template,
                docs_navigation: &self.docs,
                guides_navigation: &self.guides,
                edit_base: if with_extras { Some(&self.edit_base) } else { None },
                search: if with_extras { Some(&self.search) } else { None },
                home_page: &self.home_page,
                static_url: &self.static_url,
            }
        }
    }

    #[test]
    fn test_render_docs_page() -> Result<()> {
        let fixture = Fixture::new();
        let html = fixture
            .writer(true)
            .render(&doc("Installation", PageType::Docs, "/docs/quickstart/installation"))?;

        assert!(html.contains("<span>Documentation:</span><span>Installation</span>"));
        assert!(html.contains(
            "href=\"https://github.com/example/site/tree/main/content/docs/quickstart/installation.md\""
        ));
        assert!(html.contains("<li class=\"active\"><a href=\"/docs/quickstart\">Quickstart</a></li>"));
        assert!(html.contains("<li><a href=\"/docs/api\">API</a></li>"));
        assert!(html.contains("<h1 id=\"installation\">Installation</h1><p>Body</p>"));
        assert!(html.contains("<a class=\"prev\" href=\"/docs/quickstart\">Quickstart</a>"));
        assert!(html.contains("<a class=\"next\" href=\"/docs/api\">API</a>"));
        assert!(html.contains("window.__docsearch = docsearch("));
        assert!(html.contains("pagehide"));
        Ok(())
    }

    #[test]
    fn test_render_guides_page_uses_guides_navigation() -> Result<()> {
        let fixture = Fixture::new();
        let html = fixture
            .writer(false)
            .render(&doc("Why", PageType::Guides, "/guides/why"))?;

        assert!(html.contains("<span>Guides:</span><span>Why</span>"));
        assert!(html.contains("href=\"/guides/cloning\">Cloning</a></li>"));
        assert!(!html.contains("/docs/api"));
        assert!(!html.contains("class=\"prev\""));
        assert!(html.contains("<a class=\"next\" href=\"/guides/cloning\">Cloning</a>"));
        assert!(!html.contains("class=\"edit\""));
        assert!(!html.contains("<script>"));
        Ok(())
    }

    #[test]
    fn test_render_page_missing_from_navigation() -> Result<()> {
        let fixture = Fixture::new();
        let html = fixture
            .writer(false)
            .render(&doc("Orphan", PageType::Docs, "/docs/orphan"))?;

        assert!(!html.contains("class=\"prev\""));
        assert!(!html.contains("class=\"next\""));
        assert!(html.contains("<h1 id=\"orphan\">Orphan</h1>"));
        Ok(())
    }

    #[test]
    fn test_write_docs() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let fixture = Fixture::new();
        let out = tempfile::tempdir()?;
        let mut api = doc("API", PageType::Docs, "/docs/api");
        api.file_path = out.path().join("docs/api/index.html");

        fixture.writer(false).write_docs(&[api])?;

        let html = std::fs::read_to_string(out.path().join("docs/api/index.html"))?;
        assert!(html.contains("<a class=\"prev\" href=\"/docs/quickstart/installation\">Installation</a>"));
        Ok(())
    }
}

//! Server-side rendering of the catalog page.

use std::path::Path;

use anyhow::{bail, Context};

use super::models::Book;

const INDEX_FILE: &str = "index.html";
const SHOW_LIST: &str = "{{ show_list }}";

const DEFAULT_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Book Manager</title>
</head>
<body>
<h1>Books</h1>
<table>
<thead>
<tr><th>ID</th><th>Title</th><th>Author</th><th>Translator/Editor</th><th>Published</th><th>Read</th><th>Comment</th></tr>
</thead>
<tbody>
{{ show_list }}
</tbody>
</table>
</body>
</html>
"#;

/// Produces the catalog page from the full row list.
pub trait Render: Send + Sync {
    fn render(&self, show_list: &[Book]) -> anyhow::Result<String>;
}

/// `index.html` with a `{{ show_list }}` placeholder replaced by one table row per book.
#[derive(Debug, Clone)]
pub struct IndexTemplate {
    source: String,
}

impl IndexTemplate {
    /// Load `index.html` from `dir`, or fall back to the built-in page when there is none.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let path = dir.join(INDEX_FILE);
        if !path.exists() {
            tracing::info!(path = %path.display(), "no index template on disk, using built-in page");
            return Ok(Self::builtin());
        }

        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read template {}", path.display()))?;
        Self::from_source(source)
            .with_context(|| format!("invalid template {}", path.display()))
    }

    pub fn from_source(source: impl Into<String>) -> anyhow::Result<Self> {
        let source = source.into();
        if !source.contains(SHOW_LIST) {
            bail!("template has no `{SHOW_LIST}` placeholder");
        }
        Ok(Self { source })
    }

    pub fn builtin() -> Self {
        Self {
            source: DEFAULT_INDEX.to_string(),
        }
    }
}

impl Render for IndexTemplate {
    fn render(&self, show_list: &[Book]) -> anyhow::Result<String> {
        let rows: String = show_list.iter().map(row).collect();
        Ok(self.source.replace(SHOW_LIST, &rows))
    }
}

fn row(book: &Book) -> String {
    let cells = [
        book.title.as_str(),
        book.author.as_str(),
        book.person.as_str(),
        book.pub_date.as_str(),
        book.read_status.as_str(),
        book.comment.as_str(),
    ];

    let mut html = format!("<tr data-id=\"{id}\"><td>{id}</td>", id = book.id);
    for cell in cells {
        html.push_str("<td>");
        html.push_str(&escape(cell));
        html.push_str("</td>");
    }
    html.push_str("</tr>\n");
    html
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

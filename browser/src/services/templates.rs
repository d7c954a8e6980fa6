use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::errors::{BrowserError, BrowserResult};

pub const MAIN_TEMPLATE: &str = "main.html.jinja2";
pub const RESOURCE_PAGE_TEMPLATE: &str = "resource_page.html.jinja2";
pub const TREE_TEMPLATE: &str = "tree.html.jinja2";

/// Page templates, read from disk on every render so edits show up without a restart.
pub struct TemplateRenderer {
    dir: PathBuf,
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|name| {
            if name.contains(".html") {
                AutoEscape::Html
            } else {
                AutoEscape::None
            }
        });
        Self {
            dir: dir.into(),
            env,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn render<S: Serialize>(&self, name: &str, ctx: S) -> BrowserResult<String> {
        let path = self.dir.join(name);
        let source = tokio::fs::read_to_string(&path).await.map_err(|e| {
            tracing::error!(template = %path.display(), error = %e, "Unable to read template");
            BrowserError::Internal(format!("Unable to read template {name}"))
        })?;
        Ok(self.env.render_named_str(name, &source, ctx)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_render_reads_template_each_time() {
        let dir = TempDir::new().unwrap();
        let renderer = TemplateRenderer::new(dir.path());
        std::fs::write(dir.path().join(MAIN_TEMPLATE), "<p>{{ title }}</p>").unwrap();

        let out = renderer.render(MAIN_TEMPLATE, context! { title => "a & b" }).await.unwrap();
        assert_eq!(out, "<p>a &amp; b</p>");

        std::fs::write(dir.path().join(MAIN_TEMPLATE), "<div>{{ content|safe }}</div>").unwrap();
        let out = renderer
            .render(MAIN_TEMPLATE, context! { content => "<b>x</b>" })
            .await
            .unwrap();
        assert_eq!(out, "<div><b>x</b></div>");
    }

    #[tokio::test]
    async fn test_missing_template_is_internal_error() {
        let dir = TempDir::new().unwrap();
        let renderer = TemplateRenderer::new(dir.path());
        let err = renderer.render(TREE_TEMPLATE, context! {}).await.unwrap_err();
        assert!(matches!(err, BrowserError::Internal(_)));
    }
}

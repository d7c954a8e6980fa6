use minijinja::{context, Environment};
use serde::Serialize;
use std::collections::HashMap;

use super::TreeOptions;
use crate::errors::BrowserResult;

const HREF_PLACEHOLDER: &str = "{curie}";

const TREE_TEMPLATE: &str = r#"<div class="tree">
{%- if title %}
  <h3>{{ title }}</h3>
{%- endif %}
{%- if include_search %}
  <form class="form-inline tree-search" onsubmit="return false;">
    <input type="text" class="form-control search typeahead" id="tree-search" placeholder="Search" autocomplete="off">
  </form>
{%- endif %}
{%- if not found %}
  <p class="text-muted">No statements for {{ term.id }}</p>
{%- endif %}
  <ul class="hierarchy">
  {%- for node in ancestors %}
    <li style="margin-left: {{ loop.index0 }}em"><a href="{{ node.href }}">{{ node.label }}</a></li>
  {%- endfor %}
  {%- if term %}
    <li style="margin-left: {{ ancestors|length }}em"><strong>{{ term.label }}</strong></li>
  {%- endif %}
  {%- for node in children %}
    <li style="margin-left: {{ depth }}em"><a href="{{ node.href }}">{{ node.label }}</a></li>
  {%- endfor %}
  </ul>
{%- if annotations %}
  <table class="table annotations">
  {%- for annotation in annotations %}
    <tr><th>{{ annotation.predicate }}</th><td>{{ annotation.value }}</td></tr>
  {%- endfor %}
  </table>
{%- endif %}
</div>
"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct TreeNode {
    pub id: String,
    /// Falls back to the id for unlabelled terms
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Annotation {
    predicate: String,
    value: String,
}

/// What the tree fragment shows: the path from the top down to `term`, then its children.
#[derive(Debug, Clone)]
pub(crate) struct TreeView {
    pub term: Option<TreeNode>,
    pub ancestors: Vec<TreeNode>,
    pub children: Vec<TreeNode>,
    pub annotations: Vec<(String, String)>,
    pub found: bool,
}

pub(crate) fn node(id: &str, labels: &HashMap<String, String>, href: &str) -> TreeNode {
    TreeNode {
        id: id.to_string(),
        label: labels.get(id).cloned().unwrap_or_else(|| id.to_string()),
        href: href.replace(HREF_PLACEHOLDER, id),
    }
}

pub(crate) fn render(
    env: &Environment<'static>,
    view: &TreeView,
    options: &TreeOptions,
) -> BrowserResult<String> {
    let annotations: Vec<Annotation> = view
        .annotations
        .iter()
        .map(|(predicate, value)| Annotation {
            predicate: predicate.clone(),
            value: value.clone(),
        })
        .collect();
    let depth = if view.term.is_some() {
        view.ancestors.len() + 1
    } else {
        0
    };

    Ok(env.render_named_str(
        "tree.html",
        TREE_TEMPLATE,
        context! {
            title => options.title,
            include_search => options.include_search,
            found => view.found,
            term => view.term,
            ancestors => view.ancestors,
            children => view.children,
            annotations => annotations,
            depth => depth,
        },
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> TreeOptions {
        TreeOptions {
            title: "ONTIE".to_string(),
            href: "?id={curie}".to_string(),
            include_search: true,
        }
    }

    fn labels() -> HashMap<String, String> {
        HashMap::from([
            ("ONTIE:0001".to_string(), "Disease".to_string()),
            ("ONTIE:0002".to_string(), "Infectious <disease>".to_string()),
        ])
    }

    #[test]
    fn test_node_substitutes_href_and_falls_back_to_id() {
        let n = node("ONTIE:0009", &labels(), "?id={curie}");
        assert_eq!(n.label, "ONTIE:0009");
        assert_eq!(n.href, "?id=ONTIE:0009");
    }

    #[test]
    fn test_render_term_view() {
        let labels = labels();
        let view = TreeView {
            term: Some(node("ONTIE:0002", &labels, "?id={curie}")),
            ancestors: vec![node("ONTIE:0001", &labels, "?id={curie}")],
            children: vec![node("ONTIE:0003", &labels, "?id={curie}")],
            annotations: vec![("rdfs:label".to_string(), "Infectious <disease>".to_string())],
            found: true,
        };
        let out = render(&Environment::new(), &view, &options()).unwrap();
        assert!(out.contains("<h3>ONTIE</h3>"));
        assert!(out.contains("id=\"tree-search\""));
        assert!(out.contains(">Disease</a>"));
        assert!(out.contains("<strong>Infectious &lt;disease&gt;</strong>"));
        assert!(out.contains("margin-left: 2em\"><a href=\"?id=ONTIE:0003\">ONTIE:0003</a>"));
        assert!(out.contains("<th>rdfs:label</th>"));
    }

    #[test]
    fn test_render_without_search_or_term() {
        let view = TreeView {
            term: None,
            ancestors: Vec::new(),
            children: vec![node("ONTIE:0001", &labels(), "?id={curie}")],
            annotations: Vec::new(),
            found: true,
        };
        let mut opts = options();
        opts.include_search = false;
        let out = render(&Environment::new(), &view, &opts).unwrap();
        assert!(!out.contains("tree-search"));
        assert!(!out.contains("<strong>"));
        assert!(out.contains("margin-left: 0em"));
    }
}

use minijinja::{context, Environment};
use ontobrowse_models::{Statement, TableFormat, ValueFormat};
use serde::Serialize;

use super::sqlite::TermData;
use super::{Column, ExportOptions};
use crate::errors::BrowserResult;
use crate::services::prefixes::PrefixResolver;

const MULTI_VALUE_SEPARATOR: &str = "|";

const TABLE_TEMPLATE: &str = r#"<table class="table table-striped">
{%- if headers %}
  <thead>
    <tr>{% for header in headers %}<th>{{ header }}</th>{% endfor %}</tr>
  </thead>
{%- endif %}
  <tbody>
  {%- for row in rows %}
    <tr>{% for cell in row %}<td>{% for value in cell %}{% if not loop.first %} | {% endif %}{% if value.href %}<a href="{{ value.href }}">{{ value.text }}</a>{% else %}{{ value.text }}{% endif %}{% endfor %}</td>{% endfor %}</tr>
  {%- endfor %}
  </tbody>
</table>
"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct CellValue {
    text: String,
    href: Option<String>,
}

pub(crate) fn render(
    env: &Environment<'static>,
    terms: &[TermData],
    columns: &[Column],
    format: TableFormat,
    options: &ExportOptions,
    resolver: &PrefixResolver,
) -> BrowserResult<String> {
    let rows: Vec<Vec<Vec<CellValue>>> = terms
        .iter()
        .map(|term| {
            columns
                .iter()
                .map(|column| cell(term, column, options.value_format, resolver))
                .collect()
        })
        .collect();

    match format {
        TableFormat::Html => {
            let headers: Vec<&str> = if options.no_headers {
                Vec::new()
            } else {
                columns.iter().map(Column::header).collect()
            };
            Ok(env.render_named_str(
                "table.html",
                TABLE_TEMPLATE,
                context! { headers => headers, rows => rows },
            )?)
        }
        TableFormat::Tsv | TableFormat::Csv => {
            let delimiter = format.delimiter().unwrap_or('\t').to_string();
            let delimiter = delimiter.as_str();
            let escape = |text: &str| match format {
                TableFormat::Csv => csv_escape(text),
                _ => tsv_escape(text),
            };

            let mut out = String::new();
            if !options.no_headers {
                let line: Vec<String> = columns.iter().map(|c| escape(c.header())).collect();
                out.push_str(&line.join(delimiter));
                out.push('\n');
            }
            for row in &rows {
                let line: Vec<String> = row
                    .iter()
                    .map(|values| {
                        let joined: Vec<&str> = values.iter().map(|v| v.text.as_str()).collect();
                        escape(&joined.join(MULTI_VALUE_SEPARATOR))
                    })
                    .collect();
                out.push_str(&line.join(delimiter));
                out.push('\n');
            }
            Ok(out)
        }
    }
}

fn cell(
    term: &TermData,
    column: &Column,
    value_format: ValueFormat,
    resolver: &PrefixResolver,
) -> Vec<CellValue> {
    match column {
        Column::Id { format, .. } => vec![identifier(&term.id, *format, resolver)],
        Column::Predicate { predicate, .. } => term
            .statements
            .iter()
            .filter(|s| &s.predicate == predicate)
            .map(|s| statement_value(s, value_format, resolver))
            .collect(),
    }
}

fn identifier(curie: &str, format: ValueFormat, resolver: &PrefixResolver) -> CellValue {
    let iri = resolver.to_iri(curie);
    let text = match format {
        ValueFormat::Curie => curie.to_string(),
        ValueFormat::Iri => iri.clone().unwrap_or_else(|| curie.to_string()),
    };
    CellValue { text, href: iri }
}

fn statement_value(
    statement: &Statement,
    value_format: ValueFormat,
    resolver: &PrefixResolver,
) -> CellValue {
    match &statement.object {
        Some(object) => identifier(object, value_format, resolver),
        None => CellValue {
            text: statement.value.clone().unwrap_or_default(),
            href: None,
        },
    }
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn tsv_escape(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

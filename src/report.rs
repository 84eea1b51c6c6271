//! Printable HTML report over a sequence of records.
//!
//! Produces a self-contained document (inline styles, no external assets)
//! with one table column per descriptor field, suitable for printing or
//! archiving.

use crate::entity::Entity;
use crate::error::AppError;

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

const STYLE: &str = "body { font-family: sans-serif; margin: 2rem; }\n\
h1 { font-size: 1.4rem; }\n\
p.meta { color: #555; }\n\
table { border-collapse: collapse; width: 100%; }\n\
th, td { border: 1px solid #999; padding: 0.3rem 0.6rem; text-align: left; }\n\
thead th { background: #eee; }";

/// Render records into a complete HTML document.
///
/// Columns follow descriptor order; every cell is escaped.
pub fn render<E: Entity>(records: &[E]) -> Result<String, AppError> {
    let title = html_escape(E::TABLE);
    let generated = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");

    let mut out = String::new();
    out.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", title));
    out.push_str(&format!("<style>\n{}\n</style>\n", STYLE));
    out.push_str("</head>\n<body>\n");
    out.push_str(&format!("<h1>{}</h1>\n", title));
    out.push_str(&format!(
        "<p class=\"meta\">Generated {} ({} records)</p>\n",
        generated,
        records.len()
    ));

    out.push_str("<table>\n<thead>\n<tr>");
    for f in E::FIELDS {
        out.push_str(&format!("<th>{}</th>", html_escape(f.name)));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");

    for record in records {
        let value =
            serde_json::to_value(record).map_err(|e| AppError::Internal(e.to_string()))?;
        let map = value.as_object().cloned().unwrap_or_default();
        out.push_str("<tr>");
        for f in E::FIELDS {
            let cell = map.get(f.name).map(cell_text).unwrap_or_default();
            out.push_str(&format!("<td>{}</td>", html_escape(&cell)));
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    Ok(out)
}

//! Result rendering for the command-line host
use crate::engine::SearchResult;
use crate::error::Result;
use colored::*;
use serde::Serialize;
use serde_json::json;

/// Render results as highlighted text, one line per matching cell.
pub fn format_text<K>(results: &[SearchResult<K>]) -> String {
    if results.is_empty() {
        return format!("{}", "No matches found".yellow());
    }

    let spans: usize = results.iter().map(|r| r.matches.len()).sum();
    let mut output = vec![format!(
        "{} {} match(es) in {} cell(s):",
        "Found".green(),
        spans,
        results.len()
    )];

    for r in results {
        output.push(format!(
            "→ {} │ {} │ {}",
            r.row.to_string().yellow().bold(),
            r.column.dimmed(),
            highlight(r)
        ));
    }
    output.join("\n")
}

fn highlight<K>(result: &SearchResult<K>) -> String {
    let mut out = String::with_capacity(result.text.len() + 16);
    let mut last = 0;
    for m in &result.matches {
        out.push_str(&result.text[last..m.start]);
        out.push_str(&result.text[m.range()].yellow().bold().to_string());
        last = m.end();
    }
    out.push_str(&result.text[last..]);
    out
}

/// Render results as a JSON document.
pub fn format_json<K: Serialize>(
    results: &[SearchResult<K>],
    query: &str,
    rows: usize,
) -> Result<String> {
    let doc = json!({
        "query": query,
        "rows_searched": rows,
        "total_results": results.len(),
        "results": results,
    });
    Ok(serde_json::to_string_pretty(&doc)?)
}

//! Delimited text tables for the command-line host
use crate::columns::Column;
use crate::error::{GridfindError, Result};
use crate::source::SearchRow;
use std::borrow::Cow;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// 1-based line number in the source file
    pub line: usize,
    pub cells: Vec<String>,
}

impl SearchRow for TableRow {
    type Key = usize;

    fn row_key(&self) -> usize {
        self.line
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn load(path: &Path, delimiter: char) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, delimiter).map_err(|reason| GridfindError::InvalidTable {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn parse(content: &str, delimiter: char) -> std::result::Result<Self, String> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
            .filter(|(_, l)| !l.is_empty());

        let Some((_, header)) = lines.next() else {
            return Err("missing header line".to_string());
        };
        let headers = split_record(header, delimiter);

        let rows = lines
            .map(|(line, text)| TableRow {
                line,
                cells: split_record(text, delimiter),
            })
            .collect();

        Ok(Self { headers, rows })
    }

    /// One column per header; columns named in `hidden` are marked
    /// invisible.
    pub fn columns(&self, hidden: &[String]) -> Vec<Column<TableRow>> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                Column::new(name.clone(), move |row: &TableRow| {
                    row.cells.get(i).map(|c| Cow::Borrowed(c.as_str()))
                })
                .visible(!hidden.contains(name))
            })
            .collect()
    }
}

/// Split one record, honoring double-quoted cells with `""` escapes.
fn split_record(line: &str, delimiter: char) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    cell.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                cell.push(c);
            }
        } else if c == '"' && cell.is_empty() {
            in_quotes = true;
        } else if c == delimiter {
            cells.push(std::mem::take(&mut cell));
        } else {
            cell.push(c);
        }
    }
    cells.push(cell);
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnSet;
    use crate::config::MissingAccessorPolicy;

    #[test]
    fn test_parse_with_quotes() {
        let table = Table::parse(
            "name,notes\nAda,\"likes, commas\"\n\nBob,\"say \"\"hi\"\"\"\r\n",
            ',',
        )
        .unwrap();
        assert_eq!(table.headers, vec!["name", "notes"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells, vec!["Ada", "likes, commas"]);
        assert_eq!(table.rows[1].line, 4);
        assert_eq!(table.rows[1].cells, vec!["Bob", "say \"hi\""]);
    }

    #[test]
    fn test_empty_table_is_invalid() {
        assert!(Table::parse("\n\n", ',').is_err());
    }

    #[test]
    fn test_columns_extract_cells() {
        let table = Table::parse("a\tb\n1\t2\n3\n", '\t').unwrap();
        let set = ColumnSet::bind(
            table.columns(&["b".to_string()]),
            MissingAccessorPolicy::Ignore,
            None,
        )
        .unwrap();
        let b = &set.columns()[1];
        assert!(!b.visible);
        assert_eq!(b.extract(&table.rows[0]).as_deref(), Some("2"));
        assert_eq!(b.extract(&table.rows[1]), None);
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();
        let err = Table::load(&path, ',').unwrap_err();
        assert!(err.to_string().contains("empty.csv"));
    }
}

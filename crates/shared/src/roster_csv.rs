//! Roster CSV codec.
//!
//! Import accepts any column order as long as the header names `name`, `club`
//! and `category` (case-insensitive); `routine` is optional. Export always
//! writes `name,club,category,routine` with CRLF line endings and RFC 4180
//! quoting.

use std::{borrow::Cow, mem};

use thiserror::Error;

use crate::domain::RosterRow;

pub const EXPORT_HEADER: [&str; 4] = ["name", "club", "category", "routine"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RosterCsvError {
    #[error("CSV file is empty")]
    Empty,
    #[error("CSV header is missing the '{0}' column")]
    MissingColumn(&'static str),
    #[error("unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },
}

/// Parses an uploaded roster. Rows missing a name, club or category are skipped.
pub fn parse_roster(input: &str) -> Result<Vec<RosterRow>, RosterCsvError> {
    let mut records = parse_records(input)?
        .into_iter()
        .filter(|record| !is_blank(record));

    let header = records.next().ok_or(RosterCsvError::Empty)?;
    let column = |wanted: &'static str| {
        header
            .iter()
            .position(|name| name.trim().eq_ignore_ascii_case(wanted))
    };
    let name_idx = column("name").ok_or(RosterCsvError::MissingColumn("name"))?;
    let club_idx = column("club").ok_or(RosterCsvError::MissingColumn("club"))?;
    let category_idx = column("category").ok_or(RosterCsvError::MissingColumn("category"))?;
    let routine_idx = column("routine");

    let cell = |record: &[String], idx: usize| -> String {
        record
            .get(idx)
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    };

    Ok(records
        .filter_map(|record| {
            let row = RosterRow {
                name: cell(&record, name_idx),
                club: cell(&record, club_idx),
                category_name: cell(&record, category_idx),
                routine: routine_idx
                    .map(|idx| cell(&record, idx))
                    .unwrap_or_default(),
            };
            let complete =
                !row.name.is_empty() && !row.club.is_empty() && !row.category_name.is_empty();
            complete.then_some(row)
        })
        .collect())
}

pub fn write_roster(rows: &[RosterRow]) -> String {
    let mut out = String::new();
    push_record(&mut out, EXPORT_HEADER);
    for row in rows {
        push_record(
            &mut out,
            [
                row.name.as_str(),
                row.club.as_str(),
                row.category_name.as_str(),
                row.routine.as_str(),
            ],
        );
    }
    out
}

fn push_record<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (idx, field) in fields.into_iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(field));
    }
    out.push_str("\r\n");
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains(&[',', '"', '\r', '\n'][..]) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn is_blank(record: &[String]) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

fn parse_records(input: &str) -> Result<Vec<Vec<String>>, RosterCsvError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);

    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut quote_line = 1;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(ch);
                }
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            // Padding before an opening quote is dropped.
            '"' if field.chars().all(|c| c == ' ' || c == '\t') => {
                field.clear();
                in_quotes = true;
                quote_line = line;
            }
            ',' => record.push(mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\r' | '\n' => {
                line += 1;
                record.push(mem::take(&mut field));
                records.push(mem::take(&mut record));
            }
            _ => field.push(ch),
        }
    }

    if in_quotes {
        return Err(RosterCsvError::UnterminatedQuote { line: quote_line });
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, club: &str, category: &str, routine: &str) -> RosterRow {
        RosterRow {
            name: name.into(),
            club: club.into(),
            category_name: category.into(),
            routine: routine.into(),
        }
    }

    #[test]
    fn header_match_is_case_insensitive_and_order_free() {
        let rows = parse_roster("Category, NAME ,Club\nJuniors,Ada,North\n").expect("parse");
        assert_eq!(rows, vec![row("Ada", "North", "Juniors", "")]);
    }

    #[test]
    fn rows_missing_required_values_are_skipped() {
        let input = "name,club,category,routine\r\nAda,North,Juniors,Hoop\r\n,South,Juniors,\r\nBea,,Seniors,\r\n\r\nCy,East,Seniors\r\n";
        let rows = parse_roster(input).expect("parse");
        assert_eq!(
            rows,
            vec![
                row("Ada", "North", "Juniors", "Hoop"),
                row("Cy", "East", "Seniors", "")
            ]
        );
    }

    #[test]
    fn missing_required_column_is_rejected() {
        assert_eq!(
            parse_roster("name,category\nAda,Juniors\n"),
            Err(RosterCsvError::MissingColumn("club"))
        );
        assert_eq!(parse_roster("\n\n"), Err(RosterCsvError::Empty));
    }

    #[test]
    fn unterminated_quote_reports_its_line() {
        assert_eq!(
            parse_roster("name,club,category\nAda,\"North,Juniors\n"),
            Err(RosterCsvError::UnterminatedQuote { line: 2 })
        );
    }

    #[test]
    fn quoted_fields_survive_export_and_import() {
        let rows = vec![
            row("Ada", "Smith, Jones", "Juniors", ""),
            row("Bea \"B\"", "North", "Seniors", "line one\nline two"),
        ];
        let csv = write_roster(&rows);
        assert!(csv.starts_with("name,club,category,routine\r\n"));
        assert!(csv.contains("\"Smith, Jones\""));
        assert!(csv.contains("\"Bea \"\"B\"\"\""));
        assert_eq!(parse_roster(&csv).expect("parse"), rows);
    }

    #[test]
    fn spaces_before_an_opening_quote_are_ignored() {
        let rows =
            parse_roster("name,club,category\nAda, \"Smith, Jones\",Juniors\nBea,\t\"North\" ,Minis\n")
                .expect("parse");
        assert_eq!(
            rows,
            vec![
                row("Ada", "Smith, Jones", "Juniors", ""),
                row("Bea", "North", "Minis", ""),
            ]
        );
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let rows = parse_roster("\u{feff}name,club,category\nAda,North,Juniors").expect("parse");
        assert_eq!(rows.len(), 1);
    }
}

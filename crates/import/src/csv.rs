/// Minimal quote-aware tokenizer for CSV/TSV statement exports.
///
/// Fields split on comma or tab; `"` opens a quoted field and a doubled
/// quote inside it is a literal quote; `\r\n`, `\r`, or `\n` outside quotes
/// ends the row. Rows whose every field is blank (including the trailing
/// row a final newline produces) are not emitted. Column counts are not
/// validated across rows.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' | '\t' => row.push(std::mem::take(&mut field)),
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                flush_row(&mut rows, &mut row, &mut field);
            }
            _ => field.push(c),
        }
    }
    flush_row(&mut rows, &mut row, &mut field);

    rows
}

fn flush_row(rows: &mut Vec<Vec<String>>, row: &mut Vec<String>, field: &mut String) {
    row.push(std::mem::take(field));
    if row.iter().any(|f| !f.trim().is_empty()) {
        rows.push(std::mem::take(row));
    } else {
        row.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|f| f.to_string()).collect())
            .collect()
    }

    #[test]
    fn splits_on_commas() {
        assert_eq!(
            parse_csv("a,b,c\n1,2,3"),
            owned(&[&["a", "b", "c"], &["1", "2", "3"]])
        );
    }

    #[test]
    fn splits_on_tabs() {
        assert_eq!(parse_csv("a\tb\n1\t2"), owned(&[&["a", "b"], &["1", "2"]]));
    }

    #[test]
    fn quoted_field_keeps_delimiters() {
        assert_eq!(
            parse_csv("date,\"Smith, John\",10"),
            owned(&[&["date", "Smith, John", "10"]])
        );
    }

    #[test]
    fn doubled_quote_is_literal() {
        assert_eq!(
            parse_csv("\"say \"\"hi\"\"\",x"),
            owned(&[&["say \"hi\"", "x"]])
        );
    }

    #[test]
    fn handles_crlf_and_bare_cr() {
        assert_eq!(parse_csv("a,b\r\nc,d\re,f"), owned(&[&["a", "b"], &["c", "d"], &["e", "f"]]));
    }

    #[test]
    fn drops_blank_rows() {
        assert_eq!(
            parse_csv("a,b\n\n ,\t\nc,d\n"),
            owned(&[&["a", "b"], &["c", "d"]])
        );
    }

    #[test]
    fn trailing_newline_emits_no_empty_row() {
        assert_eq!(parse_csv("a,b\n"), owned(&[&["a", "b"]]));
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(parse_csv("").is_empty());
        assert!(parse_csv("\n\n").is_empty());
    }

    #[test]
    fn preserves_empty_fields_inside_nonblank_rows() {
        assert_eq!(parse_csv("a,,c"), owned(&[&["a", "", "c"]]));
    }
}

use crate::node::Table;

/// Lay out a table as monospace text: cells padded to their column width and
/// joined with `" | "`, with a dashed rule after every header row.
///
/// The result is raw text; the caller escapes it.
pub fn format_table(table: &Table) -> String {
    let rows: Vec<_> = table.rows.iter().filter(|row| !row.cells.is_empty()).collect();
    let col_count = rows.iter().map(|row| row.cells.len()).max().unwrap_or(0);

    let mut widths = vec![0usize; col_count];
    for row in &rows {
        for (i, cell) in row.cells.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in rows {
        let line: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &width)| {
                let cell = row.cells.get(i).map(String::as_str).unwrap_or("");
                format!("{cell:<width$}")
            })
            .collect();
        out.push_str(&line.join(" | "));
        out.push('\n');

        if row.is_header {
            let rule: Vec<String> = widths.iter().map(|&width| "-".repeat(width)).collect();
            out.push_str(&rule.join("-+-"));
            out.push('\n');
        }
    }

    out
}

//! Fixed-width, left-aligned text tables.

pub const SEPARATOR: &str = "    ";

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub header: &'static str,
    /// Minimum width of the column's values; the header widens it further if longer.
    pub width: usize,
}

impl Column {
    pub const fn new(header: &'static str, width: usize) -> Self {
        Self { header, width }
    }

    fn effective_width(&self) -> usize {
        self.width.max(self.header.chars().count())
    }
}

/// Renders a header line followed by one line per row. Every column but the
/// last is padded to its width and followed by [`SEPARATOR`]; the last one is
/// written as-is. Each line ends with `\n`.
pub fn render<S: AsRef<str>>(columns: &[Column], rows: &[Vec<S>]) -> String {
    let mut out = String::new();
    let headers: Vec<&str> = columns.iter().map(|c| c.header).collect();
    push_line(&mut out, columns, &headers);
    for row in rows {
        let cells: Vec<&str> = row.iter().map(|cell| cell.as_ref()).collect();
        push_line(&mut out, columns, &cells);
    }
    out
}

fn push_line(out: &mut String, columns: &[Column], cells: &[&str]) {
    let last = columns.len().saturating_sub(1);
    for (i, column) in columns.iter().enumerate() {
        let cell = cells.get(i).copied().unwrap_or("");
        if i == last {
            out.push_str(cell);
        } else {
            out.push_str(&format!("{cell:<width$}", width = column.effective_width()));
            out.push_str(SEPARATOR);
        }
    }
    out.push('\n');
}

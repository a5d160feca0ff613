/// A simple text-based table generator for the shell's data preview
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

impl Table {
    /// Create a new table with the given headers
    pub fn new(headers: Vec<&str>) -> Self {
        let col_widths = headers.iter().map(|h| h.chars().count()).collect();
        let headers = headers.iter().map(|h| h.to_string()).collect();
        Table {
            headers,
            rows: Vec::new(),
            col_widths,
        }
    }

    /// Add a row to the table
    pub fn add_row(&mut self, row: Vec<String>) {
        for (i, col) in row.iter().enumerate() {
            if i < self.col_widths.len() {
                self.col_widths[i] = self.col_widths[i].max(col.chars().count());
            }
        }

        self.rows.push(row);
    }

    /// Render the table; the first column is left aligned, the rest right aligned
    pub fn render(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.render_row(&self.headers));
        output.push('\n');
        output.push_str(&self.render_separator());
        output.push('\n');

        for row in &self.rows {
            output.push_str(&self.render_row(row));
            output.push('\n');
        }

        output
    }

    fn render_row(&self, row: &[String]) -> String {
        let mut line = String::new();
        for (i, col) in row.iter().enumerate().take(self.col_widths.len()) {
            let width = self.col_widths[i];
            if i == 0 {
                line.push_str(&format!("{:<width$}", col, width = width));
            } else {
                line.push_str(&format!("{:>width$}", col, width = width));
            }
            if i < row.len() - 1 {
                line.push_str(" | ");
            }
        }
        line
    }

    fn render_separator(&self) -> String {
        self.col_widths
            .iter()
            .map(|&width| "-".repeat(width))
            .collect::<Vec<_>>()
            .join("-+-")
    }
}

/// Column-aligned plain-text table for chat replies.
///
/// Every column is padded to the width of its widest cell, columns are
/// separated by two spaces, and trailing whitespace is trimmed per row.
#[derive(Debug, Default)]
pub struct PrettyTable {
    rows: Vec<Vec<String>>,
}

const COLUMN_GAP: usize = 2;

impl PrettyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut out = String::new();
        for row in &self.rows {
            let mut line = String::new();
            for (i, cell) in row.iter().enumerate() {
                line.push_str(cell);
                if i + 1 < row.len() {
                    let pad = widths[i] - cell.chars().count() + COLUMN_GAP;
                    line.extend(std::iter::repeat_n(' ', pad));
                }
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

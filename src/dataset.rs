/// Ordered table of records; all cells are text. Created by the loader (or a
/// test) and handed to the browser, which only ever writes individual cells.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell text at (row, column). Rows shorter than the header read as empty
    /// cells; a missing row or unknown column is `None`.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        let cells = self.rows.get(row)?;
        Some(cells.get(col).map(String::as_str).unwrap_or(""))
    }

    /// Overwrite one cell in place. Returns false (and writes nothing) when
    /// the row or column does not exist.
    pub fn set_cell(&mut self, row: usize, column: &str, value: String) -> bool {
        let Some(col) = self.column_index(column) else {
            return false;
        };
        let Some(cells) = self.rows.get_mut(row) else {
            return false;
        };
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value;
        true
    }
}

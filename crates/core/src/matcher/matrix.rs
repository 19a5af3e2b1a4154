//! The boolean correspondence matrix.

/// `pattern-nodes x document-nodes` matrix; a set cell means the pattern
/// node may still map to the document node under all constraints
/// discovered so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl Matrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        self.cells[row * self.cols + col] = value;
    }

    /// True if the row has any set cell.
    pub fn row_any(&self, row: usize) -> bool {
        self.cells[row * self.cols..(row + 1) * self.cols]
            .iter()
            .any(|&c| c)
    }

    /// Commits the row to a single column, clearing the rest.
    pub fn clear_row_except(&mut self, row: usize, col: usize) {
        for j in 0..self.cols {
            self.set(row, j, j == col);
        }
    }

    /// The single set column of the row, if exactly one remains.
    pub fn single_col(&self, row: usize) -> Option<usize> {
        let mut found = None;
        for j in 0..self.cols {
            if self.get(row, j) {
                if found.is_some() {
                    return None;
                }
                found = Some(j);
            }
        }
        found
    }
}

/// Live/dead field with toroidal adjacency and a per-tick change mask.
///
/// Storage is row-major, `cols * rows` flags. The change mask has the same
/// shape and is only ever set through [`Grid::set`], so it always reflects
/// writes that actually flipped a cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Grid {
    cols: usize,
    rows: usize,
    cells: Vec<bool>,
    changed: Vec<bool>,
}

impl Grid {
    pub(crate) fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![false; cols * rows],
            changed: vec![false; cols * rows],
        }
    }

    pub(crate) fn cols(&self) -> usize {
        self.cols
    }

    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    pub(crate) fn idx(&self, col: usize, row: usize) -> usize {
        row * self.cols + col
    }

    pub(crate) fn get(&self, col: usize, row: usize) -> bool {
        self.cells[self.idx(col, row)]
    }

    pub(crate) fn is_changed(&self, col: usize, row: usize) -> bool {
        self.changed[self.idx(col, row)]
    }

    /// Writes `alive` and marks the cell changed. Returns whether the value
    /// flipped; a write of the current value is a no-op.
    pub(crate) fn set(&mut self, col: usize, row: usize, alive: bool) -> bool {
        let i = self.idx(col, row);
        if self.cells[i] == alive {
            return false;
        }
        self.cells[i] = alive;
        self.changed[i] = true;
        true
    }

    pub(crate) fn clear_changes(&mut self) {
        self.changed.fill(false);
    }

    pub(crate) fn live_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// The eight wrapped neighbours of `(col, row)`, never the cell itself.
    pub(crate) fn neighbours(&self, col: usize, row: usize) -> [(usize, usize); 8] {
        let left = if col == 0 { self.cols - 1 } else { col - 1 };
        let right = if col == self.cols - 1 { 0 } else { col + 1 };
        let up = if row == 0 { self.rows - 1 } else { row - 1 };
        let down = if row == self.rows - 1 { 0 } else { row + 1 };

        [
            (left, up),
            (col, up),
            (right, up),
            (left, row),
            (right, row),
            (left, down),
            (col, down),
            (right, down),
        ]
    }
}

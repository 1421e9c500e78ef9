use crate::grid::Grid;

const SURVIVE_1: u8 = 2; // B3/S23
const SURVIVE_2: u8 = 3;
const BIRTH: u8 = 3;

/// Rule parameters that stay fixed for a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rules {
    /// Width of the inert ring at the storage edge; never evaluated.
    pub(crate) margin: usize,
    /// Despawn fires on ticks where `tick % despawn_period == 0`.
    pub(crate) despawn_period: u64,
    /// Distance from the storage edge that despawn clears.
    pub(crate) despawn_band: usize,
}

/// Applies [`Rules`] to a [`Grid`], one tick at a time.
///
/// Owns the neighbour count table so no allocation happens per tick.
pub(crate) struct RuleEngine {
    rules: Rules,
    counts: Vec<u8>,
}

impl RuleEngine {
    pub(crate) fn new(rules: Rules, cols: usize, rows: usize) -> Self {
        Self {
            rules,
            counts: vec![0; cols * rows],
        }
    }

    /// Advances `grid` by one generation and bumps `tick`.
    ///
    /// The change mask is reset first, so afterwards it holds exactly the
    /// cells that flipped during this call. Returns the number of flips.
    pub(crate) fn advance(&mut self, grid: &mut Grid, tick: &mut u64) -> usize {
        grid.clear_changes();
        self.count_neighbours(grid);

        let (cols, rows) = (grid.cols(), grid.rows());
        let margin = self.rules.margin;
        let despawn = *tick % self.rules.despawn_period == 0;
        let mut flips = 0;

        for row in margin..rows - margin {
            for col in margin..cols - margin {
                if despawn && self.in_despawn_band(col, row, cols, rows) {
                    if grid.set(col, row, false) {
                        flips += 1;
                    }
                    continue;
                }

                let n = self.counts[grid.idx(col, row)];
                let next = match (grid.get(col, row), n) {
                    (true, SURVIVE_1 | SURVIVE_2) => true,
                    (false, BIRTH) => true,
                    _ => false,
                };
                if grid.set(col, row, next) {
                    flips += 1;
                }
            }
        }

        if despawn {
            log::trace!("despawn band cleared on tick {}", *tick);
        }
        *tick += 1;
        flips
    }

    fn count_neighbours(&mut self, grid: &Grid) {
        self.counts.fill(0);
        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                if !grid.get(col, row) {
                    continue;
                }
                for (nc, nr) in grid.neighbours(col, row) {
                    self.counts[grid.idx(nc, nr)] += 1;
                }
            }
        }
    }

    fn in_despawn_band(&self, col: usize, row: usize, cols: usize, rows: usize) -> bool {
        let band = self.rules.despawn_band;
        row < band || row + band >= rows || col < band || col + band >= cols
    }

    #[cfg(test)]
    fn count_at(&self, grid: &Grid, col: usize, row: usize) -> u8 {
        self.counts[grid.idx(col, row)]
    }
}

use crate::grid::Grid;
use clap::ValueEnum;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Deserialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Starting patterns selectable from the command line or settings file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum PatternName {
    Blinker,
    Glider,
    /// lightweight spaceship
    Lwss,
    /// Gosper glider gun
    Ggg,
    RPentomino,
    /// random soup over the visible area
    Random,
}

/// A fixed shape as `(col, row)` offsets from its top-left corner.
pub(crate) struct Pattern {
    pub(crate) name: &'static str,
    pub(crate) cells: &'static [(usize, usize)],
}

const BLINKER: Pattern = Pattern {
    name: "blinker",
    cells: &[(0, 0), (0, 1), (0, 2)],
};

const GLIDER: Pattern = Pattern {
    name: "glider",
    cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
};

const LWSS: Pattern = Pattern {
    name: "lwss",
    cells: &[
        (0, 2), (0, 3),
        (1, 0), (1, 1), (1, 3), (1, 4),
        (2, 0), (2, 1), (2, 2), (2, 3),
        (3, 1), (3, 2),
    ],
};

const GGG: Pattern = Pattern {
    name: "ggg",
    cells: &[
        // left block
        (1, 5), (1, 6), (2, 5), (2, 6),
        // right block
        (35, 3), (35, 4), (36, 3), (36, 4),
        // left half of the gun
        (11, 5), (11, 6), (11, 7),
        (12, 4), (12, 8),
        (13, 3), (13, 9),
        (14, 3), (14, 9),
        (15, 6),
        (16, 4), (16, 8),
        (17, 5), (17, 6), (17, 7),
        (18, 6),
        // right half
        (21, 3), (21, 4), (21, 5),
        (22, 3), (22, 4), (22, 5),
        (23, 2), (23, 6),
        (25, 1), (25, 2), (25, 6), (25, 7),
    ],
};

const R_PENTOMINO: Pattern = Pattern {
    name: "r-pentomino",
    cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
};

impl PatternName {
    /// The fixed shape for this name, `None` for the random soup.
    pub(crate) fn shape(self) -> Option<&'static Pattern> {
        match self {
            PatternName::Blinker => Some(&BLINKER),
            PatternName::Glider => Some(&GLIDER),
            PatternName::Lwss => Some(&LWSS),
            PatternName::Ggg => Some(&GGG),
            PatternName::RPentomino => Some(&R_PENTOMINO),
            PatternName::Random => None,
        }
    }
}

impl Pattern {
    /// Bounding box as `(width, height)`.
    pub(crate) fn extent(&self) -> (usize, usize) {
        self.cells.iter().fold((0, 0), |(w, h), &(c, r)| {
            (w.max(c + 1), h.max(r + 1))
        })
    }

    /// Sets every cell of the shape alive with its top-left at
    /// `(col, row)`. The caller guarantees the shape fits.
    pub(crate) fn stamp(&self, grid: &mut Grid, col: usize, row: usize) -> usize {
        let mut placed = 0;
        for &(dc, dr) in self.cells {
            if grid.set(col + dc, row + dr, true) {
                placed += 1;
            }
        }
        placed
    }
}

/// Rectangle of the grid in storage coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Area {
    pub(crate) col: usize,
    pub(crate) row: usize,
    pub(crate) cols: usize,
    pub(crate) rows: usize,
}

/// Fills `area` with live cells at the given density.
pub(crate) fn scatter(grid: &mut Grid, area: Area, density: f64, rng: &mut StdRng) -> usize {
    let mut placed = 0;
    for row in area.row..area.row + area.rows {
        for col in area.col..area.col + area.cols {
            if rng.gen_bool(density) && grid.set(col, row, true) {
                placed += 1;
            }
        }
    }
    placed
}

pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_secs()
    });
    log::debug!("random seed {}", seed);
    StdRng::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extents() {
        assert_eq!(BLINKER.extent(), (1, 3));
        assert_eq!(GLIDER.extent(), (3, 3));
        assert_eq!(LWSS.extent(), (4, 5));
        assert_eq!(GGG.extent(), (37, 10));
    }

    #[test]
    fn test_stamp_marks_changes() {
        let mut grid = Grid::new(10, 10);
        let placed = GLIDER.stamp(&mut grid, 4, 5);
        assert_eq!(placed, 5);
        assert!(grid.get(5, 5));
        assert!(grid.is_changed(6, 7));
        assert_eq!(grid.live_count(), 5);
    }

    #[test]
    fn test_only_random_has_no_shape() {
        for name in PatternName::value_variants() {
            assert_eq!(name.shape().is_none(), *name == PatternName::Random);
        }
        assert_eq!(PatternName::Ggg.shape().map(|p| p.name), Some("ggg"));
    }

    #[test]
    fn test_scatter_stays_in_area() {
        let mut grid = Grid::new(12, 12);
        let mut rng = make_rng(Some(7));
        let area = Area {
            col: 3,
            row: 4,
            cols: 5,
            rows: 2,
        };
        let placed = scatter(&mut grid, area, 1.0, &mut rng);
        assert_eq!(placed, 10);
        for row in 0..12 {
            for col in 0..12 {
                let inside = (3..8).contains(&col) && (4..6).contains(&row);
                assert_eq!(grid.get(col, row), inside);
            }
        }
    }

    #[test]
    fn test_scatter_is_seeded() {
        let area = Area {
            col: 0,
            row: 0,
            cols: 20,
            rows: 20,
        };
        let mut a = Grid::new(20, 20);
        let mut b = Grid::new(20, 20);
        scatter(&mut a, area, 0.3, &mut make_rng(Some(42)));
        scatter(&mut b, area, 0.3, &mut make_rng(Some(42)));
        assert_eq!(a, b);
    }
}

use crate::config::{Layout, Settings};
use crate::grid::Grid;
use crate::patterns::{make_rng, scatter, Area, PatternName};
use crate::rules::RuleEngine;

/// Everything the simulation loop owns: the grid, the rule engine with its
/// neighbour table, and the tick counter.
pub(crate) struct Simulation {
    grid: Grid,
    engine: RuleEngine,
    tick: u64,
    layout: Layout,
}

impl Simulation {
    pub(crate) fn new(settings: &Settings, layout: Layout) -> Self {
        Self {
            grid: Grid::new(layout.cols, layout.rows),
            engine: RuleEngine::new(settings.rules(), layout.cols, layout.rows),
            tick: 0,
            layout,
        }
    }

    /// Places the configured starting pattern. Seeded cells are marked
    /// changed so the first frame shows them.
    pub(crate) fn seed(&mut self, settings: &Settings) -> usize {
        let Some(name) = settings.pattern else {
            return 0;
        };

        let placed = match name.shape() {
            Some(shape) => shape.stamp(
                &mut self.grid,
                self.layout.border + settings.pattern_at.col,
                self.layout.border + settings.pattern_at.row,
            ),
            None => {
                debug_assert_eq!(name, PatternName::Random);
                let area = Area {
                    col: self.layout.border,
                    row: self.layout.border,
                    cols: self.layout.visible_cols,
                    rows: self.layout.visible_rows,
                };
                let mut rng = make_rng(settings.seed);
                scatter(&mut self.grid, area, settings.density, &mut rng)
            }
        };
        log::info!("seeded {:?}: {} live cells", name, placed);
        placed
    }

    /// One generation. Returns the number of cells that flipped.
    pub(crate) fn step(&mut self) -> usize {
        self.engine.advance(&mut self.grid, &mut self.tick)
    }

    pub(crate) fn grid(&self) -> &Grid {
        &self.grid
    }

    pub(crate) fn tick(&self) -> u64 {
        self.tick
    }
}

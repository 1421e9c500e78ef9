use crate::patterns::PatternName;
use crate::rules::Rules;
use anyhow::{bail, Context, Result};
use clap::Parser;
use log::LevelFilter;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Upper bound on grid cells and on frame characters.
const MAX_CELLS: usize = 1 << 24;

#[derive(Parser, Debug)]
#[command(name = "toruslife", about = "Game of Life on a torus, in your terminal")]
pub(crate) struct Args {
    /// JSON settings file; flags given here override it
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// visible rows
    #[arg(long)]
    pub(crate) rows: Option<usize>,

    /// visible columns
    #[arg(long)]
    pub(crate) cols: Option<usize>,

    /// display columns per cell (non-square character cells)
    #[arg(long)]
    pub(crate) aspect: Option<f32>,

    /// starting frames per second (+/- adjust while running)
    #[arg(long)]
    pub(crate) fps: Option<f32>,

    /// character drawn for live cells
    #[arg(long)]
    pub(crate) live: Option<char>,

    /// character drawn for dead cells
    #[arg(long)]
    pub(crate) dead: Option<char>,

    /// hidden cells kept around the visible area on every side
    #[arg(long)]
    pub(crate) border: Option<usize>,

    /// inert ring at the storage edge that the rule never touches
    #[arg(long)]
    pub(crate) margin: Option<usize>,

    /// clear the despawn band every N ticks
    #[arg(long)]
    pub(crate) despawn_period: Option<u64>,

    /// width of the band cleared by despawn, from the storage edge
    #[arg(long)]
    pub(crate) despawn_band: Option<usize>,

    /// starting pattern
    #[arg(long, value_enum)]
    pub(crate) pattern: Option<PatternName>,

    /// where the pattern's top-left lands, as COL,ROW in the visible area
    #[arg(long)]
    pub(crate) at: Option<Offset>,

    /// fill probability for --pattern random
    #[arg(long)]
    pub(crate) density: Option<f64>,

    /// rng seed for --pattern random
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// append log records to this file (stdout is the display)
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,

    #[arg(long, default_value_t = LevelFilter::Info)]
    pub(crate) log_level: LevelFilter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct Offset {
    pub(crate) col: usize,
    pub(crate) row: usize,
}

impl FromStr for Offset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (c, r) = s
            .split_once(',')
            .ok_or_else(|| format!("expected COL,ROW, got {s:?}"))?;
        let col = c.trim().parse().map_err(|e| format!("bad column {c:?}: {e}"))?;
        let row = r.trim().parse().map_err(|e| format!("bad row {r:?}: {e}"))?;
        Ok(Self { col, row })
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) aspect_ratio: f32,
    pub(crate) fps: f32,
    pub(crate) live_char: char,
    pub(crate) dead_char: char,
    pub(crate) border: usize,
    pub(crate) margin: usize,
    pub(crate) despawn_period: u64,
    pub(crate) despawn_band: usize,
    pub(crate) pattern: Option<PatternName>,
    pub(crate) pattern_at: Offset,
    pub(crate) density: f64,
    pub(crate) seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rows: 20,
            cols: 20,
            aspect_ratio: 2.35,
            fps: 2.0,
            live_char: '#',
            dead_char: ' ',
            border: 100,
            margin: 1,
            despawn_period: 20,
            despawn_band: 30,
            pattern: None,
            pattern_at: Offset { col: 10, row: 10 },
            density: 0.2,
            seed: None,
        }
    }
}

impl Settings {
    /// Defaults, then the settings file if one was given, then CLI flags.
    pub(crate) fn resolve(args: &Args) -> Result<Self> {
        let mut s = match &args.config {
            Some(path) => load_settings(path)?,
            None => Settings::default(),
        };

        if let Some(v) = args.rows {
            s.rows = v;
        }
        if let Some(v) = args.cols {
            s.cols = v;
        }
        if let Some(v) = args.aspect {
            s.aspect_ratio = v;
        }
        if let Some(v) = args.fps {
            s.fps = v;
        }
        if let Some(v) = args.live {
            s.live_char = v;
        }
        if let Some(v) = args.dead {
            s.dead_char = v;
        }
        if let Some(v) = args.border {
            s.border = v;
        }
        if let Some(v) = args.margin {
            s.margin = v;
        }
        if let Some(v) = args.despawn_period {
            s.despawn_period = v;
        }
        if let Some(v) = args.despawn_band {
            s.despawn_band = v;
        }
        if args.pattern.is_some() {
            s.pattern = args.pattern;
        }
        if let Some(v) = args.at {
            s.pattern_at = v;
        }
        if let Some(v) = args.density {
            s.density = v;
        }
        if args.seed.is_some() {
            s.seed = args.seed;
        }

        s.validate()?;
        Ok(s)
    }

    /// Checks everything the simulation relies on. All problems are
    /// reported together.
    pub(crate) fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.rows == 0 || self.cols == 0 {
            problems.push(format!(
                "visible area must be at least 1x1, got {}x{}",
                self.cols, self.rows
            ));
        }

        let dims = self.grid_dims();
        match dims {
            None => problems.push(format!("border {} overflows the grid size", self.border)),
            Some((cols, rows)) => {
                if rows <= self.margin.saturating_mul(2) || cols <= self.margin.saturating_mul(2) {
                    problems.push(format!(
                        "margin {} leaves no interior in a {}x{} grid",
                        self.margin, cols, rows
                    ));
                }
                if rows < 3 || cols < 3 {
                    problems.push(format!("grid {cols}x{rows} is too small to wrap"));
                }
                if cols.checked_mul(rows).map_or(true, |n| n > MAX_CELLS) {
                    problems.push(format!("grid {cols}x{rows} exceeds {MAX_CELLS} cells"));
                }
            }
        }
        if self.border < self.margin {
            problems.push(format!(
                "border {} is narrower than margin {}; inert cells would be visible",
                self.border, self.margin
            ));
        }
        if self.despawn_period == 0 {
            problems.push("despawn period must be at least 1".to_string());
        }
        if !self.aspect_ratio.is_finite() || self.aspect_ratio < 1.0 {
            problems.push(format!(
                "aspect ratio must be >= 1.0, got {}",
                self.aspect_ratio
            ));
        } else {
            // floor(cols * aspect) display columns plus the terminator, per row
            let width = (self.cols as f64 * self.aspect_ratio as f64).floor() + 1.0;
            if width * self.rows as f64 > MAX_CELLS as f64 {
                problems.push(format!(
                    "a {}x{} frame at aspect ratio {} exceeds {MAX_CELLS} characters",
                    self.cols, self.rows, self.aspect_ratio
                ));
            }
        }
        if !self.fps.is_finite() || self.fps < 1.0 {
            problems.push(format!("fps must be >= 1.0, got {}", self.fps));
        }
        if self.live_char == self.dead_char {
            problems.push(format!(
                "live and dead characters are both {:?}",
                self.live_char
            ));
        }
        for ch in [self.live_char, self.dead_char] {
            if ch.is_control() {
                problems.push(format!("{ch:?} is a control character"));
            }
        }

        match self.pattern {
            Some(PatternName::Random) => {
                if !(0.0..=1.0).contains(&self.density) {
                    problems.push(format!("density must be in 0..=1, got {}", self.density));
                }
            }
            Some(name) => {
                if let (Some(shape), Some((cols, rows))) = (name.shape(), dims) {
                    let (w, h) = shape.extent();
                    let inside = |start: usize, at: usize, len: usize, limit: usize| {
                        start
                            .checked_add(at)
                            .and_then(|first| first.checked_add(len)?.checked_add(self.margin))
                            .is_some_and(|end| end <= limit)
                    };
                    let fits = inside(self.border, self.pattern_at.col, w, cols)
                        && inside(self.border, self.pattern_at.row, h, rows);
                    if !fits {
                        problems.push(format!(
                            "pattern {} ({}x{}) at {},{} does not fit the grid",
                            shape.name, w, h, self.pattern_at.col, self.pattern_at.row
                        ));
                    }
                }
            }
            None => {}
        }

        if !problems.is_empty() {
            bail!("invalid configuration:\n  {}", problems.join("\n  "));
        }

        if self.despawn_band <= self.margin {
            log::warn!(
                "despawn band {} lies inside margin {}; despawn has no effect",
                self.despawn_band,
                self.margin
            );
        }
        Ok(())
    }

    /// Storage dimensions `(cols, rows)`, border included. `None` on
    /// overflow.
    pub(crate) fn grid_dims(&self) -> Option<(usize, usize)> {
        let pad = self.border.checked_mul(2)?;
        Some((self.cols.checked_add(pad)?, self.rows.checked_add(pad)?))
    }

    pub(crate) fn rules(&self) -> Rules {
        Rules {
            margin: self.margin,
            despawn_period: self.despawn_period,
            despawn_band: self.despawn_band,
        }
    }
}

/// Every size the simulation and frame buffer need, derived once.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Layout {
    pub(crate) cols: usize,
    pub(crate) rows: usize,
    pub(crate) border: usize,
    pub(crate) visible_cols: usize,
    pub(crate) visible_rows: usize,
    pub(crate) aspect_ratio: f32,
    pub(crate) buf_cols: usize,
    pub(crate) buf_rows: usize,
}

impl Layout {
    pub(crate) fn from_settings(s: &Settings) -> Result<Self> {
        let (cols, rows) = s.grid_dims().context("grid size overflows")?;
        // one extra column per row for the line terminator
        let buf_cols = ((s.cols as f32 * s.aspect_ratio) as usize)
            .checked_add(1)
            .context("frame width overflows")?;
        Ok(Self {
            cols,
            rows,
            border: s.border,
            visible_cols: s.cols,
            visible_rows: s.rows,
            aspect_ratio: s.aspect_ratio,
            buf_cols,
            buf_rows: s.rows,
        })
    }
}

pub(crate) fn load_settings(path: &Path) -> Result<Settings> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read settings file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("could not parse settings file {}", path.display()))
}

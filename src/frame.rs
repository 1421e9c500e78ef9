use crate::config::Layout;
use crate::grid::Grid;

/// One rendered frame: `buf_rows` lines of `buf_cols` characters, the last
/// of which is always `'\n'`.
///
/// Each visible grid column maps to a run of display columns. With a
/// fractional aspect ratio the runs have uneven widths, so the spans are
/// computed once up front and reused every frame.
pub(crate) struct FrameBuffer {
    buf_cols: usize,
    buf_rows: usize,
    border: usize,
    live: char,
    dead: char,
    spans: Vec<(usize, usize)>,
    chars: Vec<char>,
    text: String,
}

impl FrameBuffer {
    pub(crate) fn new(layout: &Layout, live: char, dead: char) -> Self {
        let terminator = layout.buf_cols - 1;
        let display_col = |c: usize| ((c as f32 * layout.aspect_ratio) as usize).min(terminator);
        let spans = (0..layout.visible_cols)
            .map(|c| (display_col(c), display_col(c + 1)))
            .collect();

        let mut chars = vec![dead; layout.buf_cols * layout.buf_rows];
        for row in 0..layout.buf_rows {
            chars[row * layout.buf_cols + terminator] = '\n';
        }

        Self {
            buf_cols: layout.buf_cols,
            buf_rows: layout.buf_rows,
            border: layout.border,
            live,
            dead,
            spans,
            chars,
            text: String::with_capacity(layout.buf_cols * layout.buf_rows),
        }
    }

    /// Redraws the visible cells whose change flag is set and leaves every
    /// other character alone. Returns the number of cells redrawn.
    pub(crate) fn update(&mut self, grid: &Grid) -> usize {
        let mut redrawn = 0;
        for row in 0..self.buf_rows {
            let grid_row = row + self.border;
            let line = row * self.buf_cols;
            for (col, &(start, end)) in self.spans.iter().enumerate() {
                let grid_col = col + self.border;
                if !grid.is_changed(grid_col, grid_row) {
                    continue;
                }
                let ch = if grid.get(grid_col, grid_row) {
                    self.live
                } else {
                    self.dead
                };
                self.chars[line + start..line + end].fill(ch);
                redrawn += 1;
            }
        }
        redrawn
    }

    #[cfg(test)]
    pub(crate) fn chars(&self) -> &[char] {
        &self.chars
    }

    /// The frame as a single string, built in a reused scratch buffer.
    pub(crate) fn as_text(&mut self) -> &str {
        self.text.clear();
        self.text.extend(self.chars.iter());
        &self.text
    }
}

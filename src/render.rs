use crate::control::Control;
use crate::frame::FrameBuffer;
use crate::grid::Grid;
use anyhow::Result;
use crossterm::{
    cursor, execute, queue,
    style::Print,
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

/// Where finished frames go.
pub(crate) trait Display {
    /// Clears the surface ahead of the next frame.
    fn clear(&mut self) -> Result<()>;
    /// Writes one whole frame, `'\n'`-separated lines, in one go.
    fn write_frame(&mut self, text: &str) -> Result<()>;
}

pub(crate) trait Clock {
    fn sleep_ms(&mut self, ms: u64);
}

pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn sleep_ms(&mut self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

/// Alternate screen with the cursor hidden and raw mode on.
pub(crate) struct TerminalDisplay {
    out: io::Stdout,
}

impl TerminalDisplay {
    pub(crate) fn begin() -> Result<Self> {
        let mut out = io::stdout();
        enter(
            &mut out,
            terminal::enable_raw_mode,
            terminal::disable_raw_mode,
        )?;
        Ok(Self { out })
    }

    pub(crate) fn end(&mut self) -> Result<()> {
        execute!(
            self.out,
            Clear(ClearType::All),
            cursor::Show,
            LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }
}

/// Raw mode first, then the screen. A failed screen switch rolls back
/// whatever did land, so an error never leaves the shell in raw mode.
fn enter<W: Write>(
    out: &mut W,
    enable_raw: impl FnOnce() -> io::Result<()>,
    disable_raw: impl FnOnce() -> io::Result<()>,
) -> Result<()> {
    enable_raw()?;
    if let Err(e) = execute!(out, EnterAlternateScreen, cursor::Hide, Clear(ClearType::All)) {
        let _ = execute!(out, cursor::Show, LeaveAlternateScreen);
        let _ = disable_raw();
        return Err(e.into());
    }
    Ok(())
}

impl Display for TerminalDisplay {
    fn clear(&mut self) -> Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        Ok(())
    }

    fn write_frame(&mut self, text: &str) -> Result<()> {
        // raw mode: '\n' alone would not return the carriage
        for line in text.split_terminator('\n') {
            queue!(self.out, Print(line), cursor::MoveToNextLine(1))?;
        }
        queue!(self.out, EndSynchronizedUpdate)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Pushes frames to a [`Display`] and paces them at the current rate.
pub(crate) struct Renderer<D, C> {
    frame: FrameBuffer,
    display: D,
    clock: C,
    control: Arc<Control>,
}

impl<D: Display, C: Clock> Renderer<D, C> {
    pub(crate) fn new(frame: FrameBuffer, display: D, clock: C, control: Arc<Control>) -> Self {
        Self {
            frame,
            display,
            clock,
            control,
        }
    }

    /// Redraws changed cells, emits the whole frame, then sleeps for one
    /// frame interval. The rate is read at sleep time, so a `+`/`-` press
    /// applies to the very next frame.
    pub(crate) fn render_frame(&mut self, grid: &Grid) -> Result<()> {
        let redrawn = self.frame.update(grid);
        log::trace!("redrew {} cells", redrawn);

        self.display.clear()?;
        self.display.write_frame(self.frame.as_text())?;
        self.clock.sleep_ms(self.control.frame_interval_ms());
        Ok(())
    }

    pub(crate) fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;

    #[derive(Default)]
    pub(crate) struct RecordingDisplay {
        pub(crate) clears: usize,
        pub(crate) frames: Vec<String>,
    }

    impl Display for RecordingDisplay {
        fn clear(&mut self) -> Result<()> {
            self.clears += 1;
            Ok(())
        }

        fn write_frame(&mut self, text: &str) -> Result<()> {
            self.frames.push(text.to_string());
            Ok(())
        }
    }

    /// Records sleeps instead of sleeping; stops playback after `limit`.
    pub(crate) struct FakeClock {
        pub(crate) sleeps: Vec<u64>,
        pub(crate) limit: usize,
        pub(crate) control: Arc<Control>,
    }

    impl Clock for FakeClock {
        fn sleep_ms(&mut self, ms: u64) {
            self.sleeps.push(ms);
            if self.sleeps.len() >= self.limit {
                self.control.stop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::{FakeClock, RecordingDisplay};
    use super::*;
    use crate::config::{Layout, Settings};
    use std::cell::Cell;

    fn renderer(fps: f32) -> (Renderer<RecordingDisplay, FakeClock>, Arc<Control>, Layout) {
        let settings = Settings {
            rows: 3,
            cols: 4,
            border: 1,
            aspect_ratio: 1.0,
            dead_char: '.',
            ..Settings::default()
        };
        let layout = Layout::from_settings(&settings).unwrap();
        let control = Arc::new(Control::new(fps));
        let clock = FakeClock {
            sleeps: Vec::new(),
            limit: usize::MAX,
            control: Arc::clone(&control),
        };
        let frame = FrameBuffer::new(&layout, '#', '.');
        let r = Renderer::new(frame, RecordingDisplay::default(), clock, Arc::clone(&control));
        (r, control, layout)
    }

    #[test]
    fn test_frame_is_cleared_written_and_paced() {
        let (mut r, _control, layout) = renderer(2.0);
        let mut grid = Grid::new(layout.cols, layout.rows);
        grid.set(1, 1, true);

        r.render_frame(&grid).unwrap();
        assert_eq!(r.display.clears, 1);
        assert_eq!(r.display.frames, vec!["#...\n....\n....\n".to_string()]);
        assert_eq!(r.clock.sleeps, vec![500]);
    }

    #[test]
    fn test_rate_change_applies_next_frame() {
        let (mut r, control, layout) = renderer(2.0);
        let grid = Grid::new(layout.cols, layout.rows);

        r.render_frame(&grid).unwrap();
        control.speed_up();
        control.speed_up();
        r.render_frame(&grid).unwrap();
        control.slow_down();
        r.render_frame(&grid).unwrap();
        assert_eq!(r.clock.sleeps, vec![500, 250, 333]);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn test_enter_writes_nothing_without_raw_mode() {
        let mut out = Vec::new();
        let disabled = Cell::new(false);
        let result = enter(
            &mut out,
            || Err(io::ErrorKind::Unsupported.into()),
            || {
                disabled.set(true);
                Ok(())
            },
        );
        assert!(result.is_err());
        assert!(out.is_empty());
        assert!(!disabled.get());
    }

    #[test]
    fn test_enter_undoes_raw_mode_when_screen_fails() {
        let disabled = Cell::new(false);
        let result = enter(
            &mut BrokenPipe,
            || Ok(()),
            || {
                disabled.set(true);
                Ok(())
            },
        );
        assert!(result.is_err());
        assert!(disabled.get());
    }

    #[test]
    fn test_enter_switches_screen() {
        let mut out = Vec::new();
        enter(&mut out, || Ok(()), || Ok(())).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[?1049h"), "{text:?}");
        assert!(text.contains("\x1b[?25l"), "{text:?}");
    }

    #[test]
    fn test_unchanged_cells_keep_previous_frame() {
        let (mut r, _control, layout) = renderer(2.0);
        let mut grid = Grid::new(layout.cols, layout.rows);
        grid.set(4, 3, true);
        r.render_frame(&grid).unwrap();

        grid.clear_changes();
        r.render_frame(&grid).unwrap();
        assert_eq!(r.display.frames[0], r.display.frames[1]);
        assert_eq!(r.display.frames[1], "....\n....\n...#\n");
    }
}

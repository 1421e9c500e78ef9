use crate::config::{Layout, Settings};
use crate::control::{spawn_listener, Control};
use crate::frame::FrameBuffer;
use crate::input::TerminalInput;
use crate::render::{Clock, Display, Renderer, SystemClock, TerminalDisplay};
use crate::sim::Simulation;
use anyhow::{anyhow, Result};
use std::sync::Arc;

pub(crate) fn run(settings: Settings) -> Result<()> {
    let layout = Layout::from_settings(&settings)?;
    log::info!(
        "grid {}x{} (visible {}x{}), frame {}x{}, {} fps",
        layout.cols,
        layout.rows,
        layout.visible_cols,
        layout.visible_rows,
        layout.buf_cols,
        layout.buf_rows,
        settings.fps
    );

    let mut sim = Simulation::new(&settings, layout);
    sim.seed(&settings);

    let control = Arc::new(Control::new(settings.fps));
    let frame = FrameBuffer::new(&layout, settings.live_char, settings.dead_char);
    let display = TerminalDisplay::begin()?;
    let mut renderer = Renderer::new(frame, display, SystemClock, Arc::clone(&control));

    control.start();
    let listener = match spawn_listener(TerminalInput, Arc::clone(&control)) {
        Ok(handle) => handle,
        Err(e) => {
            control.stop();
            renderer.display_mut().end()?;
            return Err(e);
        }
    };

    let result = run_loop(&mut sim, &mut renderer, &control);
    control.stop();
    renderer.display_mut().end()?;
    result?;

    log::info!(
        "stopped after {} ticks, {} live cells",
        sim.tick(),
        sim.grid().live_count()
    );
    // the loop only ends cleanly once the listener has seen `q` or failed
    listener
        .join()
        .map_err(|_| anyhow!("input listener panicked"))?
}

/// Draws the seeded state, then ticks and draws until playback stops.
pub(crate) fn run_loop<D: Display, C: Clock>(
    sim: &mut Simulation,
    renderer: &mut Renderer<D, C>,
    control: &Control,
) -> Result<()> {
    renderer.render_frame(sim.grid())?;
    while control.is_running() {
        sim.step();
        renderer.render_frame(sim.grid())?;
    }
    Ok(())
}

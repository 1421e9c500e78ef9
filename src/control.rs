use crate::input::InputSource;
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub(crate) const MIN_FPS: f32 = 1.0;
const FPS_STEP: f32 = 1.0;

/// Playback state shared between the render loop and the input listener.
///
/// The frame rate is stored as `f32` bits so both fields are plain atomics.
pub(crate) struct Control {
    running: AtomicBool,
    fps_bits: AtomicU32,
}

impl Control {
    pub(crate) fn new(fps: f32) -> Self {
        Self {
            running: AtomicBool::new(false),
            fps_bits: AtomicU32::new(fps.max(MIN_FPS).to_bits()),
        }
    }

    pub(crate) fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    pub(crate) fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn fps(&self) -> f32 {
        f32::from_bits(self.fps_bits.load(Ordering::SeqCst))
    }

    /// Milliseconds between frames at the current rate.
    pub(crate) fn frame_interval_ms(&self) -> u64 {
        (1000.0 / self.fps()) as u64
    }

    pub(crate) fn speed_up(&self) -> f32 {
        self.adjust_fps(FPS_STEP)
    }

    pub(crate) fn slow_down(&self) -> f32 {
        self.adjust_fps(-FPS_STEP)
    }

    fn adjust_fps(&self, delta: f32) -> f32 {
        let next = |bits: u32| (f32::from_bits(bits) + delta).max(MIN_FPS);
        let prev = match self
            .fps_bits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |bits| {
                Some(next(bits).to_bits())
            }) {
            Ok(bits) | Err(bits) => bits,
        };
        next(prev)
    }

    /// Applies one key press. Returns `false` once the listener should stop.
    pub(crate) fn handle_key(&self, key: char) -> bool {
        match key {
            'q' => {
                log::info!("quit requested");
                self.stop();
                false
            }
            '+' => {
                log::debug!("fps -> {}", self.speed_up());
                true
            }
            '-' => {
                log::debug!("fps -> {}", self.slow_down());
                true
            }
            _ => true,
        }
    }
}

/// Reads keys until `q` or until the render loop stops.
///
/// A failed read stops playback too, since nothing else could.
pub(crate) fn listen<S: InputSource>(source: &mut S, control: &Control) -> Result<()> {
    while control.is_running() {
        let key = match source.read_key() {
            Ok(Some(key)) => key,
            Ok(None) => continue,
            Err(e) => {
                control.stop();
                return Err(e);
            }
        };
        if !control.handle_key(key) {
            break;
        }
    }
    Ok(())
}

pub(crate) fn spawn_listener<S>(mut source: S, control: Arc<Control>) -> Result<JoinHandle<Result<()>>>
where
    S: InputSource + Send + 'static,
{
    thread::Builder::new()
        .name("input".to_string())
        .spawn(move || listen(&mut source, &control))
        .context("failed to start input listener")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ScriptedInput;

    #[test]
    fn test_fps_floor() {
        let control = Control::new(2.0);
        control.start();
        for _ in 0..3 {
            assert!(control.handle_key('-'));
        }
        assert_eq!(control.fps(), 1.0);
        assert!(control.is_running());
    }

    #[test]
    fn test_fps_steps() {
        let control = Control::new(2.0);
        assert_eq!(control.speed_up(), 3.0);
        assert_eq!(control.speed_up(), 4.0);
        assert_eq!(control.frame_interval_ms(), 250);
        assert_eq!(control.slow_down(), 3.0);
    }

    #[test]
    fn test_initial_fps_is_floored() {
        let control = Control::new(0.25);
        assert_eq!(control.fps(), MIN_FPS);
        assert_eq!(control.frame_interval_ms(), 1000);
    }

    #[test]
    fn test_other_keys_ignored() {
        let control = Control::new(5.0);
        control.start();
        for key in ['a', 'Q', ' ', '='] {
            assert!(control.handle_key(key));
        }
        assert_eq!(control.fps(), 5.0);
        assert!(control.is_running());
    }

    #[test]
    fn test_listener_stops_on_q() {
        let control = Control::new(2.0);
        control.start();
        let mut input = ScriptedInput::new([Some('+'), None, Some('+'), Some('q'), Some('+')]);
        listen(&mut input, &control).unwrap();
        assert!(!control.is_running());
        assert_eq!(control.fps(), 4.0);
        assert_eq!(input.remaining(), 1);
    }

    #[test]
    fn test_listener_exits_when_stopped() {
        let control = Control::new(2.0);
        let mut input = ScriptedInput::new([Some('+')]);
        listen(&mut input, &control).unwrap();
        assert_eq!(control.fps(), 2.0);
    }

    #[test]
    fn test_read_error_stops_playback() {
        let control = Control::new(2.0);
        control.start();
        let mut input = ScriptedInput::new([Some('-')]);
        let err = listen(&mut input, &control).unwrap_err();
        assert!(err.to_string().contains("script exhausted"));
        assert!(!control.is_running());
    }

    #[test]
    fn test_spawned_listener() {
        let control = Arc::new(Control::new(3.0));
        control.start();
        let handle = spawn_listener(ScriptedInput::new([Some('-'), Some('q')]), Arc::clone(&control))
            .unwrap();
        handle.join().unwrap().unwrap();
        assert!(!control.is_running());
        assert_eq!(control.fps(), 2.0);
    }
}

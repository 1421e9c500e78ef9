use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

/// Blocking source of decoded key presses.
pub(crate) trait InputSource {
    /// Waits for the next event. `None` means it was not a character.
    fn read_key(&mut self) -> Result<Option<char>>;
}

/// Keyboard via crossterm. Needs raw mode for unbuffered reads.
pub(crate) struct TerminalInput;

impl InputSource for TerminalInput {
    fn read_key(&mut self) -> Result<Option<char>> {
        match event::read()? {
            Event::Key(k) if k.kind == KeyEventKind::Press => match k.code {
                // raw mode swallows SIGINT
                KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => Ok(Some('q')),
                KeyCode::Char(ch) => Ok(Some(ch)),
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
pub(crate) struct ScriptedInput {
    keys: std::collections::VecDeque<Option<char>>,
}

#[cfg(test)]
impl ScriptedInput {
    pub(crate) fn new<I: IntoIterator<Item = Option<char>>>(keys: I) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
impl InputSource for ScriptedInput {
    fn read_key(&mut self) -> Result<Option<char>> {
        self.keys
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("script exhausted"))
    }
}

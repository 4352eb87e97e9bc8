//! Console keyboard trigger sources.

use std::io::{self, IsTerminal, Read};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use clap::ValueEnum;
use console::Term;
use log::{debug, warn};

use crate::error::ToneResult;
use crate::notes::note_for_key;
use crate::session::{Trigger, TriggerSource};

/// How keys are read and what they mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// SPACE toggles the tone; each key press renders one buffer.
    Toggle,
    /// Home-row keys play fixed-length notes.
    Notes,
    /// SPACE toggles the tone; buffers render continuously in real time.
    Polled,
}

/// Maps a key to its trigger in `mode`. Unbound keys return `None`.
pub fn trigger_for_key(mode: Mode, key: char) -> Option<Trigger> {
    match (mode, key) {
        (_, 'q' | 'Q') => Some(Trigger::Quit),
        (Mode::Toggle | Mode::Polled, ' ') => Some(Trigger::Toggle),
        (Mode::Notes, key) => note_for_key(key).map(|note| Trigger::Note(note.frequency)),
        _ => None,
    }
}

/// Where key presses come from.
///
/// A terminal is read one key at a time without echo. Anything else (a pipe
/// or a redirected file) is read byte by byte, and end of input ends the run.
pub enum KeyInput {
    Term(Term),
    Bytes(Box<dyn Read + Send>),
}

impl KeyInput {
    /// Uses the terminal when stdin is interactive, raw stdin bytes otherwise.
    pub fn stdin() -> Self {
        let term = Term::stdout();
        // read_char needs a terminal on both ends; otherwise it would bypass a piped stdin.
        if io::stdin().is_terminal() && term.is_term() {
            KeyInput::Term(term)
        } else {
            debug!("stdin is not a terminal; reading keys as bytes");
            KeyInput::Bytes(Box::new(io::stdin()))
        }
    }

    /// Next key, or `None` once the input is exhausted.
    pub fn read_key(&mut self) -> io::Result<Option<char>> {
        match self {
            KeyInput::Term(term) => term.read_char().map(Some),
            KeyInput::Bytes(reader) => {
                let mut byte = [0u8; 1];
                match reader.read(&mut byte)? {
                    0 => Ok(None),
                    _ => Ok(Some(byte[0] as char)),
                }
            }
        }
    }
}

/// Blocks on the keyboard for each key.
pub struct ConsoleKeys {
    input: KeyInput,
    mode: Mode,
}

impl ConsoleKeys {
    pub fn new(mode: Mode) -> Self {
        Self::with_input(KeyInput::stdin(), mode)
    }

    pub fn with_input(input: KeyInput, mode: Mode) -> Self {
        Self { input, mode }
    }
}

impl TriggerSource for ConsoleKeys {
    fn next_trigger(&mut self) -> ToneResult<Trigger> {
        loop {
            let Some(key) = self.input.read_key()? else {
                debug!("end of key input");
                return Ok(Trigger::Quit);
            };
            match trigger_for_key(self.mode, key) {
                Some(trigger) => return Ok(trigger),
                None => debug!("ignoring key {:?}", key),
            }
        }
    }
}

/// Reads keys on a background thread and ticks at buffer rate when idle.
pub struct PolledKeys {
    keys: Receiver<char>,
    tick: Duration,
}

impl PolledKeys {
    /// Spawns the keyboard thread. `tick` is the sleep between idle buffers.
    pub fn spawn(tick: Duration) -> Self {
        let (sender, keys) = channel();
        thread::spawn(move || forward_keys(KeyInput::stdin(), sender));
        Self::from_receiver(keys, tick)
    }

    pub fn from_receiver(keys: Receiver<char>, tick: Duration) -> Self {
        Self { keys, tick }
    }
}

fn forward_keys(mut input: KeyInput, sender: Sender<char>) {
    loop {
        match input.read_key() {
            Ok(Some(key)) => {
                if sender.send(key).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                warn!("keyboard thread stopped: {}", err);
                break;
            }
        }
    }
}

impl TriggerSource for PolledKeys {
    fn next_trigger(&mut self) -> ToneResult<Trigger> {
        loop {
            match self.keys.try_recv() {
                Ok(key) => {
                    if let Some(trigger) = trigger_for_key(Mode::Polled, key) {
                        return Ok(trigger);
                    }
                    debug!("ignoring key {:?}", key);
                }
                Err(TryRecvError::Empty) => {
                    thread::sleep(self.tick);
                    return Ok(Trigger::Tick);
                }
                // Keyboard gone (stdin closed); treat as a quit request.
                Err(TryRecvError::Disconnected) => return Ok(Trigger::Quit),
            }
        }
    }
}

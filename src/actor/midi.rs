//! MIDI input handling, independent of the keyboard chord matcher.
//!
//! Note-on messages act as buttons bound through the [`EventTap`]'s MIDI
//! bindings. One controller drives display brightness; its latest value is
//! kept in a single shared slot and applied with smoothing so a turning knob
//! does not flood the display with updates.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::actor::{self, event_tap::EventTap};
use crate::common::config::MidiSettings;
use crate::sys::midi::MidiMessage;

pub type Sender = actor::Sender<MidiMessage>;
pub type Receiver = actor::Receiver<MidiMessage>;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Larger than any percentage, so the first value is always applied.
const INITIAL_BRIGHTNESS: u8 = 120;

pub trait BrightnessControl: Send {
    fn set_brightness(&mut self, percent: u8) -> anyhow::Result<()>;
}

/// Brightness sink that only logs.
pub struct LogBrightness;

impl BrightnessControl for LogBrightness {
    fn set_brightness(&mut self, percent: u8) -> anyhow::Result<()> {
        debug!(percent, "brightness");
        Ok(())
    }
}

/// Maps a 7-bit controller value onto 0..=100, truncating.
pub fn controller_percent(value: u8) -> u8 { (f64::from(value.min(127)) / 127.0 * 100.0) as u8 }

/// Whether a new brightness is far enough from the last applied one to be
/// worth applying. The extremes always apply.
pub fn should_apply_brightness(last: u8, next: u8, threshold: u8) -> bool {
    next == 0 || next == 100 || last.abs_diff(next) >= threshold
}

pub struct MidiListener {
    event_tap: EventTap,
    settings: MidiSettings,
    brightness: Box<dyn BrightnessControl>,
    latest_brightness: Arc<Mutex<Option<u8>>>,
    last_applied: u8,
    listening: Arc<AtomicBool>,
}

impl MidiListener {
    pub fn new(
        event_tap: EventTap,
        settings: MidiSettings,
        brightness: Box<dyn BrightnessControl>,
    ) -> Self {
        MidiListener {
            event_tap,
            settings,
            brightness,
            latest_brightness: Arc::new(Mutex::new(None)),
            last_applied: INITIAL_BRIGHTNESS,
            listening: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Flag that keeps the listener thread alive; clear it to stop the thread
    /// within one poll interval.
    pub fn listening(&self) -> Arc<AtomicBool> { self.listening.clone() }

    pub fn spawn(self, messages: Receiver) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new().name("midi".into()).spawn(move || self.run(messages))
    }

    pub fn run(mut self, messages: Receiver) {
        while self.listening.load(Ordering::Relaxed) {
            match messages.recv_timeout(POLL_INTERVAL) {
                Ok((span, message)) => {
                    let _guard = span.enter();
                    self.handle_message(message);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            self.apply_pending_brightness();
        }
        debug!("midi listener stopped");
    }

    pub fn handle_message(&mut self, message: MidiMessage) {
        match message {
            MidiMessage::NoteOn { note, .. } => {
                let Some(button) = note.checked_sub(self.settings.note_offset) else {
                    trace!(note, "note below the button range");
                    return;
                };
                match self.event_tap.midi_action(button) {
                    Some(action) => {
                        debug!(button, "midi button");
                        if panic::catch_unwind(AssertUnwindSafe(|| action())).is_err() {
                            warn!(button, "midi binding panicked");
                        }
                    }
                    None => trace!(button, "no binding for midi button"),
                }
            }
            MidiMessage::ControlChange { controller, value, .. }
                if controller == self.settings.brightness_controller =>
            {
                *self.latest_brightness.lock() = Some(controller_percent(value));
            }
            other => trace!(?other, "ignoring midi message"),
        }
    }

    /// Applies the most recent brightness request, if any, subject to
    /// smoothing. Older unapplied requests are dropped.
    pub fn apply_pending_brightness(&mut self) {
        let Some(next) = self.latest_brightness.lock().take() else {
            return;
        };
        if !should_apply_brightness(self.last_applied, next, self.settings.brightness_threshold) {
            trace!(last = self.last_applied, next, "brightness change below threshold");
            return;
        }
        match self.brightness.set_brightness(next) {
            Ok(()) => self.last_applied = next,
            Err(err) => warn!(%err, percent = next, "failed to set brightness"),
        }
    }
}

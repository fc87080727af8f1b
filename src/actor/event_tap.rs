//! Matching of raw keyboard hook events against registered keybindings.
//!
//! The hook callback runs on the OS input thread and has to return quickly:
//! it reads key state, looks up candidates under a read lock, and runs the
//! bound action after the lock is released. Actions are expected to be cheap
//! (the WM controller's actions only send a message to the reactor).

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use static_assertions::assert_impl_all;
use tracing::{debug, trace, warn};

use crate::common::collections::HashMap;
use crate::sys::hotkey::{
    BindingSpec, Chord, KeyCode, KeyState, KeyStateCache, Modifiers, virtual_key_to_keycode,
};

pub type Action = Arc<dyn Fn() + Send + Sync>;

pub const WM_KEYDOWN: u32 = 0x0100;
pub const WM_KEYUP: u32 = 0x0101;
pub const WM_SYSKEYDOWN: u32 = 0x0104;
pub const WM_SYSKEYUP: u32 = 0x0105;

/// A keyboard event as delivered to a low-level keyboard hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub n_code: i32,
    pub message: u32,
    pub vk_code: u32,
}

impl RawKeyEvent {
    pub fn key_down(vk_code: u32) -> Self { RawKeyEvent { n_code: 0, message: WM_KEYDOWN, vk_code } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookResponse {
    /// Let the OS deliver the event to the focused application.
    PassThrough,
    /// Swallow the event.
    Consume,
}

struct Binding {
    chord: Chord,
    modifiers: Modifiers,
    action: Action,
}

#[derive(Default)]
struct Keybindings {
    /// Chords grouped by the key that triggers them, in registration order.
    by_trigger: HashMap<KeyCode, Vec<Binding>>,
    midi: HashMap<u8, Action>,
    count: usize,
}

#[derive(Clone, Default)]
pub struct EventTap {
    bindings: Arc<RwLock<Keybindings>>,
}

assert_impl_all!(EventTap: Send, Sync);

impl EventTap {
    pub fn new() -> Self { Self::default() }

    /// Registers `action` for a chord such as `"Alt+Shift+Q"` or a MIDI button
    /// such as `"midi 3"`.
    pub fn add_global_keybinding(
        &self,
        spec: &str,
        action: impl Fn() + Send + Sync + 'static,
    ) -> anyhow::Result<()> {
        let spec: BindingSpec = spec.parse()?;
        self.add_binding(spec, Arc::new(action));
        Ok(())
    }

    pub fn add_binding(&self, spec: BindingSpec, action: Action) {
        let mut bindings = self.bindings.write();
        bindings.count += 1;
        match spec {
            BindingSpec::Midi(button) => {
                if bindings.midi.insert(button, action).is_some() {
                    debug!(button, "replaced MIDI binding");
                }
            }
            BindingSpec::Chord(chord) => {
                let trigger = chord.trigger();
                // A generic trigger never arrives from the hook; only its sides do.
                let triggers = trigger.sides().map_or_else(|| vec![trigger], Vec::from);
                for key in triggers {
                    bindings.by_trigger.entry(key).or_default().push(Binding {
                        modifiers: chord.modifiers(),
                        chord: chord.clone(),
                        action: action.clone(),
                    });
                }
            }
        }
    }

    /// Drops every chord and MIDI binding.
    pub fn reset(&self) {
        let mut bindings = self.bindings.write();
        debug!(count = bindings.count, "clearing keybindings");
        *bindings = Keybindings::default();
    }

    pub fn len(&self) -> usize { self.bindings.read().count }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn midi_action(&self, button: u8) -> Option<Action> {
        self.bindings.read().midi.get(&button).cloned()
    }

    /// Entry point for the keyboard hook. Never panics and never propagates
    /// errors: anything unexpected lets the event through.
    pub fn on_key_event(&self, event: RawKeyEvent, keys: &dyn KeyState) -> HookResponse {
        if event.n_code < 0 || !matches!(event.message, WM_KEYDOWN | WM_SYSKEYDOWN) {
            return HookResponse::PassThrough;
        }
        let Some(key) = virtual_key_to_keycode(event.vk_code) else {
            trace!(vk_code = event.vk_code, "unknown virtual key");
            return HookResponse::PassThrough;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| self.on_key_down(key, keys))) {
            Ok(response) => response,
            Err(_) => {
                warn!(?key, "keybinding handler panicked; passing event through");
                HookResponse::PassThrough
            }
        }
    }

    fn on_key_down(&self, pressed: KeyCode, keys: &dyn KeyState) -> HookResponse {
        let (chord, action) = {
            let bindings = self.bindings.read();
            let Some(candidates) = bindings.by_trigger.get(&pressed) else {
                return HookResponse::PassThrough;
            };

            let mut cache = KeyStateCache::new(keys);
            let mut best: Option<&Binding> = None;
            for candidate in candidates {
                let trigger = candidate.chord.trigger();
                let held = candidate.chord.keys().iter().all(|&k| k == trigger || cache.is_down(k));
                if held && best.is_none_or(|b| candidate.chord.len() > b.chord.len()) {
                    best = Some(candidate);
                }
            }
            let Some(best) = best else {
                return HookResponse::PassThrough;
            };

            for (key, bit) in Modifiers::SPECIFIC_KEYS {
                if !best.modifiers.intersects(bit) && cache.is_down(key) {
                    trace!(chord = %best.chord, extra = %key, "extra modifier held");
                    return HookResponse::PassThrough;
                }
            }
            (best.chord.clone(), best.action.clone())
        };

        debug!(%chord, "keybinding matched");
        action();
        HookResponse::Consume
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use test_log::test;

    use super::*;

    struct Held(Vec<KeyCode>);

    impl KeyState for Held {
        fn is_key_down_raw(&self, key: KeyCode) -> bool { self.0.contains(&key) }
    }

    fn counter(tap: &EventTap, spec: &str) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        tap.add_global_keybinding(spec, move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        count
    }

    const VK_1: u32 = 0x31;
    const VK_Q: u32 = 0x51;

    #[test]
    fn longest_chord_wins_and_fires_once() {
        let tap = EventTap::new();
        let short = counter(&tap, "Alt+1");
        let long = counter(&tap, "Ctrl+Alt+1");
        let keys = Held(vec![KeyCode::AltLeft, KeyCode::ControlLeft, KeyCode::Digit1]);

        assert_eq!(HookResponse::Consume, tap.on_key_event(RawKeyEvent::key_down(VK_1), &keys));
        assert_eq!(0, short.load(Ordering::SeqCst));
        assert_eq!(1, long.load(Ordering::SeqCst));
    }

    #[test]
    fn shorter_chord_matches_when_only_its_keys_are_held() {
        let tap = EventTap::new();
        let short = counter(&tap, "Alt+1");
        let long = counter(&tap, "Ctrl+Alt+1");
        let keys = Held(vec![KeyCode::AltRight]);

        assert_eq!(HookResponse::Consume, tap.on_key_event(RawKeyEvent::key_down(VK_1), &keys));
        assert_eq!(1, short.load(Ordering::SeqCst));
        assert_eq!(0, long.load(Ordering::SeqCst));
    }

    #[test]
    fn extra_modifier_rejects_match() {
        let tap = EventTap::new();
        let fired = counter(&tap, "Alt+1");
        let keys = Held(vec![KeyCode::ControlLeft, KeyCode::AltLeft]);

        assert_eq!(HookResponse::PassThrough, tap.on_key_event(RawKeyEvent::key_down(VK_1), &keys));
        assert_eq!(0, fired.load(Ordering::SeqCst));
    }

    #[test]
    fn specific_modifier_only_matches_its_side() {
        let tap = EventTap::new();
        let fired = counter(&tap, "LAlt+Q");

        let right = Held(vec![KeyCode::AltRight]);
        assert_eq!(HookResponse::PassThrough, tap.on_key_event(RawKeyEvent::key_down(VK_Q), &right));
        let left = Held(vec![KeyCode::AltLeft]);
        assert_eq!(HookResponse::Consume, tap.on_key_event(RawKeyEvent::key_down(VK_Q), &left));
        assert_eq!(1, fired.load(Ordering::SeqCst));
    }

    #[test]
    fn equal_length_ties_keep_registration_order() {
        let tap = EventTap::new();
        let first = counter(&tap, "Alt+Q");
        let second = counter(&tap, "Alt+Q");
        let keys = Held(vec![KeyCode::AltLeft]);

        tap.on_key_event(RawKeyEvent::key_down(VK_Q), &keys);
        assert_eq!(1, first.load(Ordering::SeqCst));
        assert_eq!(0, second.load(Ordering::SeqCst));
    }

    #[test]
    fn generic_modifier_trigger_matches_either_side() {
        let tap = EventTap::new();
        let fired = counter(&tap, "Ctrl+Shift");
        let keys = Held(vec![KeyCode::ControlRight]);

        let shift_right = RawKeyEvent::key_down(0xA1);
        assert_eq!(HookResponse::Consume, tap.on_key_event(shift_right, &keys));
        assert_eq!(1, fired.load(Ordering::SeqCst));
    }

    #[test]
    fn non_key_down_and_negative_codes_pass_through() {
        let tap = EventTap::new();
        let fired = counter(&tap, "Q");
        let keys = Held(vec![]);

        let up = RawKeyEvent { n_code: 0, message: WM_KEYUP, vk_code: VK_Q };
        assert_eq!(HookResponse::PassThrough, tap.on_key_event(up, &keys));
        let negative = RawKeyEvent { n_code: -1, message: WM_KEYDOWN, vk_code: VK_Q };
        assert_eq!(HookResponse::PassThrough, tap.on_key_event(negative, &keys));
        let unknown = RawKeyEvent::key_down(0xFF);
        assert_eq!(HookResponse::PassThrough, tap.on_key_event(unknown, &keys));
        let sys = RawKeyEvent { n_code: 0, message: WM_SYSKEYDOWN, vk_code: VK_Q };
        assert_eq!(HookResponse::Consume, tap.on_key_event(sys, &keys));
        assert_eq!(1, fired.load(Ordering::SeqCst));
    }

    #[test]
    fn panicking_action_passes_through() {
        let tap = EventTap::new();
        tap.add_global_keybinding("Alt+Q", || panic!("boom")).unwrap();
        let keys = Held(vec![KeyCode::AltLeft]);
        assert_eq!(HookResponse::PassThrough, tap.on_key_event(RawKeyEvent::key_down(VK_Q), &keys));
    }

    #[test]
    fn reset_clears_chords_and_midi() {
        let tap = EventTap::new();
        let fired = counter(&tap, "Alt+Q");
        let _midi = counter(&tap, "midi 3");
        assert_eq!(2, tap.len());
        assert!(tap.midi_action(3).is_some());

        tap.reset();
        assert!(tap.is_empty());
        assert!(tap.midi_action(3).is_none());
        let keys = Held(vec![KeyCode::AltLeft]);
        assert_eq!(HookResponse::PassThrough, tap.on_key_event(RawKeyEvent::key_down(VK_Q), &keys));
        assert_eq!(0, fired.load(Ordering::SeqCst));
    }

    #[test]
    fn invalid_specs_are_rejected() {
        let tap = EventTap::new();
        assert!(tap.add_global_keybinding("Alt+Nope", || {}).is_err());
        assert!(tap.add_global_keybinding("midi many", || {}).is_err());
        assert!(tap.is_empty());
    }
}

//! The WM controller turns the user's keybinding configuration into hook
//! actions. Every action only forwards a [`WmCommand`] to the reactor thread,
//! so nothing slow ever runs inside the keyboard hook.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::VariantNames;
use tracing::{debug, info, warn};

use crate::actor::{self, event_tap::EventTap};
use crate::common::config::Config;
use crate::sys::hotkey::BindingSpec;

pub type Sender = actor::Sender<WmCommand>;

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    strum::VariantNames,
    strum::EnumString,
    strum::Display
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WmCommand {
    /// Toggle the focused window between tiling and floating.
    ToggleFloating,
    Redraw,
    /// Log the container tree.
    DumpTree,
    Exit,
}

impl WmCommand {
    pub fn builtin_candidates() -> &'static [&'static str] { WmCommand::VARIANTS }
}

pub struct WmController {
    event_tap: EventTap,
    commands: Sender,
}

impl WmController {
    pub fn new(event_tap: EventTap, commands: Sender) -> Self { WmController { event_tap, commands } }

    pub fn event_tap(&self) -> &EventTap { &self.event_tap }

    /// Replaces every registered keybinding with the ones in `config`.
    /// Returns how many were registered.
    pub fn register_keys(&self, config: &Config) -> usize {
        self.event_tap.reset();
        let mut registered = 0;
        for (spec, command) in &config.keys {
            if matches!(spec, BindingSpec::Midi(_)) && !config.midi.enabled {
                warn!(%spec, "MIDI is disabled; skipping binding");
                continue;
            }
            let tx = self.commands.clone();
            let command = *command;
            debug!(%spec, %command, "binding");
            self.event_tap.add_binding(spec.clone(), Arc::new(move || tx.send(command)));
            registered += 1;
        }
        info!(registered, "keybindings registered");
        registered
    }
}

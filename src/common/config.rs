use std::path::{Path, PathBuf};

use anyhow::bail;
use serde::{Deserialize, Serialize};

use super::collections::BTreeMap;
use crate::actor::wm_controller::WmCommand;
use crate::sys::hotkey::BindingSpec;

pub fn config_file() -> Option<PathBuf> {
    Some(dirs::home_dir()?.join(".config").join("arbor").join("config.toml"))
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    midi: MidiSettings,
    #[serde(default)]
    keys: BTreeMap<String, WmCommand>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    pub midi: MidiSettings,
    pub keys: Vec<(BindingSpec, WmCommand)>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Space between the workspace edge and its tiles, in pixels.
    #[serde(default)]
    pub outer_gap: i32,
    /// Space between adjacent tiles, in pixels.
    #[serde(default)]
    pub inner_gap: i32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct MidiSettings {
    #[serde(default = "yes")]
    pub enabled: bool,
    /// Subtracted from a note number to get the button number, so that a
    /// pad controller's notes 8..=23 become buttons 1..=16.
    #[serde(default = "default_note_offset")]
    pub note_offset: u8,
    /// Controller number whose value drives display brightness.
    #[serde(default = "default_brightness_controller")]
    pub brightness_controller: u8,
    /// Minimum change, in percent, before a new brightness is applied.
    #[serde(default = "default_brightness_threshold")]
    pub brightness_threshold: u8,
}

impl Default for MidiSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            note_offset: default_note_offset(),
            brightness_controller: default_brightness_controller(),
            brightness_threshold: default_brightness_threshold(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.outer_gap < 0 {
            issues.push(format!("outer_gap must be non-negative, got {}", self.outer_gap));
        }
        if self.inner_gap < 0 {
            issues.push(format!("inner_gap must be non-negative, got {}", self.inner_gap));
        }

        issues
    }
}

impl MidiSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.note_offset > 127 {
            issues.push(format!("midi.note_offset must be at most 127, got {}", self.note_offset));
        }
        if self.brightness_controller > 127 {
            issues.push(format!(
                "midi.brightness_controller must be at most 127, got {}",
                self.brightness_controller
            ));
        }
        if self.brightness_threshold > 100 {
            issues.push(format!(
                "midi.brightness_threshold is a percentage, got {}",
                self.brightness_threshold
            ));
        }

        issues
    }
}

fn yes() -> bool { true }

fn default_note_offset() -> u8 { 7 }

fn default_brightness_controller() -> u8 { 9 }

fn default_brightness_threshold() -> u8 { 10 }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    pub fn default() -> Config {
        Self::parse(include_str!("../../arbor.default.toml"))
            .expect("bundled default config parses")
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        issues.extend(self.settings.validate());
        issues.extend(self.midi.validate());

        let midi_keys = self.keys.iter().filter(|(spec, _)| matches!(spec, BindingSpec::Midi(_)));
        if !self.midi.enabled && midi_keys.clone().next().is_some() {
            issues.push("keys bind MIDI buttons but midi.enabled is false".to_string());
        }
        for (spec, _) in midi_keys {
            if let BindingSpec::Midi(button) = spec
                && button.checked_add(self.midi.note_offset).is_none_or(|note| note > 127)
            {
                issues.push(format!("{spec} can never fire: no MIDI note maps to it"));
            }
        }

        let mut seen = Vec::new();
        for (spec, _) in &self.keys {
            if seen.contains(&spec) {
                issues.push(format!("{spec} is bound more than once"));
            }
            seen.push(spec);
        }

        issues
    }

    /// no need to pull in a dep for just this
    fn levenshtein(a: &str, b: &str) -> usize {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let mut prev: Vec<usize> = (0..=b.len()).collect();
        for i in 1..=a.len() {
            let mut cur = vec![i; b.len() + 1];
            for j in 1..=b.len() {
                let cost = usize::from(a[i - 1] != b[j - 1]);
                cur[j] = (prev[j] + 1).min(cur[j - 1] + 1).min(prev[j - 1] + cost);
            }
            prev = cur;
        }
        prev[b.len()]
    }

    // Pulls the token out of serde's "unknown variant `...`" message.
    fn extract_unknown_variant(err: &str) -> Option<&str> {
        let needle = "unknown variant `";
        let rest = &err[err.find(needle)? + needle.len()..];
        Some(&rest[..rest.find('`')?])
    }

    fn suggest_similar_command(unknown: &str) -> Option<&'static str> {
        let unknown = unknown.to_lowercase();
        let (best, dist) = WmCommand::builtin_candidates()
            .iter()
            .map(|cand| (*cand, Self::levenshtein(&unknown, cand)))
            .min_by_key(|(_, dist)| *dist)?;
        let threshold = std::cmp::max(3usize, best.len() / 2);
        (dist <= threshold).then_some(best)
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        let file = match toml::from_str::<ConfigFile>(buf) {
            Ok(file) => file,
            Err(e) => {
                let msg = e.to_string();
                if let Some(suggestion) =
                    Self::extract_unknown_variant(&msg).and_then(Self::suggest_similar_command)
                {
                    bail!("{msg}\nDid you mean `{suggestion}`?");
                }
                bail!("{msg}");
            }
        };

        let mut keys = Vec::with_capacity(file.keys.len());
        for (key, cmd) in file.keys {
            match key.parse::<BindingSpec>() {
                Ok(spec) => keys.push((spec, cmd)),
                Err(e) => bail!("Could not parse keybinding {key:?}: {e}"),
            }
        }

        Ok(Config {
            settings: file.settings,
            midi: file.midi,
            keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sys::hotkey::{Chord, KeyCode};

    #[test]
    fn bundled_default_parses_and_validates() {
        let config = Config::default();
        assert!(!config.keys.is_empty());
        assert_eq!(Vec::<String>::new(), config.validate());
        assert_eq!(MidiSettings::default(), config.midi);
    }

    #[test]
    fn keys_parse_to_chords_and_midi_buttons() {
        let config = Config::parse(
            r#"
            [settings]
            inner_gap = 4

            [keys]
            "Alt + Shift + Space" = "toggle_floating"
            "midi 3" = "dump_tree"
            "#,
        )
        .unwrap();
        assert_eq!(4, config.settings.inner_gap);
        assert_eq!(
            vec![
                (
                    BindingSpec::Chord(
                        Chord::new(vec![KeyCode::Alt, KeyCode::Shift, KeyCode::Space]).unwrap()
                    ),
                    WmCommand::ToggleFloating
                ),
                (BindingSpec::Midi(3), WmCommand::DumpTree),
            ],
            config.keys
        );
    }

    #[test]
    fn invalid_chord_is_reported() {
        let err = Config::parse(
            r#"
            [keys]
            "Alt + Banana" = "redraw"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Alt + Banana"), "{err}");
    }

    #[test]
    fn unknown_command_gets_a_suggestion() {
        let err = Config::parse(
            r#"
            [keys]
            "Alt + Q" = "toggle_floatin"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Did you mean `toggle_floating`?"), "{err}");
    }

    #[test]
    fn validate_reports_out_of_range_settings() {
        let config = Config::parse(
            r#"
            [settings]
            outer_gap = -1

            [midi]
            enabled = false
            brightness_threshold = 120

            [keys]
            "midi 1" = "redraw"
            "#,
        )
        .unwrap();
        let issues = config.validate();
        assert_eq!(3, issues.len(), "{issues:?}");
    }

    #[test]
    fn read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[keys]\n\"Ctrl + 1\" = \"redraw\"").unwrap();
        let config = Config::read(file.path()).unwrap();
        assert_eq!(1, config.keys.len());
        assert!(Config::read(Path::new("/nonexistent/arbor.toml")).is_err());
    }
}

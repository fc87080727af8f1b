use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};
use strum::EnumCount;

/// Physical modifier keys held, left and right tracked separately.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const ALT: Modifiers = Modifiers(0b0011_0000);
    pub const ALT_LEFT: Modifiers = Modifiers(0b0001_0000);
    pub const ALT_RIGHT: Modifiers = Modifiers(0b0010_0000);
    pub const CONTROL: Modifiers = Modifiers(0b0000_1100);
    pub const CONTROL_LEFT: Modifiers = Modifiers(0b0000_0100);
    pub const CONTROL_RIGHT: Modifiers = Modifiers(0b0000_1000);
    pub const META: Modifiers = Modifiers(0b1100_0000);
    pub const META_LEFT: Modifiers = Modifiers(0b0100_0000);
    pub const META_RIGHT: Modifiers = Modifiers(0b1000_0000);
    // Generic modifiers (match either left or right)
    pub const SHIFT: Modifiers = Modifiers(0b0000_0011);
    // Specific left/right modifier bits
    pub const SHIFT_LEFT: Modifiers = Modifiers(0b0000_0001);
    pub const SHIFT_RIGHT: Modifiers = Modifiers(0b0000_0010);

    /// Every left/right modifier key, paired with its bit.
    pub const SPECIFIC_KEYS: [(KeyCode, Modifiers); 8] = [
        (KeyCode::ControlLeft, Modifiers::CONTROL_LEFT),
        (KeyCode::ControlRight, Modifiers::CONTROL_RIGHT),
        (KeyCode::AltLeft, Modifiers::ALT_LEFT),
        (KeyCode::AltRight, Modifiers::ALT_RIGHT),
        (KeyCode::ShiftLeft, Modifiers::SHIFT_LEFT),
        (KeyCode::ShiftRight, Modifiers::SHIFT_RIGHT),
        (KeyCode::MetaLeft, Modifiers::META_LEFT),
        (KeyCode::MetaRight, Modifiers::META_RIGHT),
    ];

    pub fn empty() -> Self {
        Modifiers(0)
    }

    pub fn contains(&self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn intersects(&self, other: Modifiers) -> bool {
        (self.0 & other.0) != 0
    }

    pub fn insert(&mut self, other: Modifiers) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Modifiers) {
        self.0 &= !other.0;
    }

    /// The modifier bits a key stands for. A generic key covers both sides.
    pub fn for_key(key: KeyCode) -> Modifiers {
        match key {
            KeyCode::Shift => Modifiers::SHIFT,
            KeyCode::ShiftLeft => Modifiers::SHIFT_LEFT,
            KeyCode::ShiftRight => Modifiers::SHIFT_RIGHT,
            KeyCode::Control => Modifiers::CONTROL,
            KeyCode::ControlLeft => Modifiers::CONTROL_LEFT,
            KeyCode::ControlRight => Modifiers::CONTROL_RIGHT,
            KeyCode::Alt => Modifiers::ALT,
            KeyCode::AltLeft => Modifiers::ALT_LEFT,
            KeyCode::AltRight => Modifiers::ALT_RIGHT,
            KeyCode::Meta => Modifiers::META,
            KeyCode::MetaLeft => Modifiers::META_LEFT,
            KeyCode::MetaRight => Modifiers::META_RIGHT,
            _ => Modifiers::empty(),
        }
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<&str> = Vec::new();

        let mut side = |left: Modifiers, right: Modifiers, both, l, r| {
            let has_left = self.contains(left);
            let has_right = self.contains(right);
            if has_left && has_right {
                parts.push(both);
            } else if has_left {
                parts.push(l);
            } else if has_right {
                parts.push(r);
            }
        };
        side(Modifiers::CONTROL_LEFT, Modifiers::CONTROL_RIGHT, "Ctrl", "CtrlLeft", "CtrlRight");
        side(Modifiers::ALT_LEFT, Modifiers::ALT_RIGHT, "Alt", "AltLeft", "AltRight");
        side(Modifiers::SHIFT_LEFT, Modifiers::SHIFT_RIGHT, "Shift", "ShiftLeft", "ShiftRight");
        side(Modifiers::META_LEFT, Modifiers::META_RIGHT, "Meta", "MetaLeft", "MetaRight");

        write!(f, "{}", parts.join(" + "))
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, EnumCount)]
#[repr(u8)]
pub enum KeyCode {
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF,
    KeyG,
    KeyH,
    KeyI,
    KeyJ,
    KeyK,
    KeyL,
    KeyM,
    KeyN,
    KeyO,
    KeyP,
    KeyQ,
    KeyR,
    KeyS,
    KeyT,
    KeyU,
    KeyV,
    KeyW,
    KeyX,
    KeyY,
    KeyZ,
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Enter,
    Escape,
    Backspace,
    Tab,
    Space,
    CapsLock,
    ArrowLeft,
    ArrowUp,
    ArrowRight,
    ArrowDown,
    PageUp,
    PageDown,
    End,
    Home,
    Insert,
    Delete,
    Minus,
    Equal,
    BracketLeft,
    BracketRight,
    Backslash,
    Semicolon,
    Quote,
    Backquote,
    Comma,
    Period,
    Slash,
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,
    MetaLeft,
    MetaRight,
    /// Either shift key.
    Shift,
    /// Either control key.
    Control,
    /// Either alt key.
    Alt,
    /// Either meta (Windows/Super) key.
    Meta,
}

impl KeyCode {
    /// The left and right keys a generic modifier stands for.
    pub fn sides(self) -> Option<[KeyCode; 2]> {
        use KeyCode::*;
        match self {
            Shift => Some([ShiftLeft, ShiftRight]),
            Control => Some([ControlLeft, ControlRight]),
            Alt => Some([AltLeft, AltRight]),
            Meta => Some([MetaLeft, MetaRight]),
            _ => None,
        }
    }

    pub fn is_modifier(self) -> bool { Modifiers::for_key(self) != Modifiers::empty() }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use KeyCode::*;
        let s = match self {
            KeyA => "A",
            KeyB => "B",
            KeyC => "C",
            KeyD => "D",
            KeyE => "E",
            KeyF => "F",
            KeyG => "G",
            KeyH => "H",
            KeyI => "I",
            KeyJ => "J",
            KeyK => "K",
            KeyL => "L",
            KeyM => "M",
            KeyN => "N",
            KeyO => "O",
            KeyP => "P",
            KeyQ => "Q",
            KeyR => "R",
            KeyS => "S",
            KeyT => "T",
            KeyU => "U",
            KeyV => "V",
            KeyW => "W",
            KeyX => "X",
            KeyY => "Y",
            KeyZ => "Z",
            Digit0 => "0",
            Digit1 => "1",
            Digit2 => "2",
            Digit3 => "3",
            Digit4 => "4",
            Digit5 => "5",
            Digit6 => "6",
            Digit7 => "7",
            Digit8 => "8",
            Digit9 => "9",
            ArrowLeft => "Left",
            ArrowRight => "Right",
            ArrowUp => "Up",
            ArrowDown => "Down",
            Tab => "Tab",
            Space => "Space",
            Enter => "Enter",
            Escape => "Escape",
            Shift => "Shift",
            ShiftLeft => "ShiftLeft",
            ShiftRight => "ShiftRight",
            Control => "Control",
            ControlLeft => "ControlLeft",
            ControlRight => "ControlRight",
            Alt => "Alt",
            AltLeft => "AltLeft",
            AltRight => "AltRight",
            Meta => "Meta",
            MetaLeft => "MetaLeft",
            MetaRight => "MetaRight",
            other => return write!(f, "{other:?}"),
        };
        write!(f, "{}", s)
    }
}

impl FromStr for KeyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use KeyCode::*;
        match s.to_uppercase().as_str() {
            "A" => Ok(KeyA),
            "B" => Ok(KeyB),
            "C" => Ok(KeyC),
            "D" => Ok(KeyD),
            "E" => Ok(KeyE),
            "F" => Ok(KeyF),
            "G" => Ok(KeyG),
            "H" => Ok(KeyH),
            "I" => Ok(KeyI),
            "J" => Ok(KeyJ),
            "K" => Ok(KeyK),
            "L" => Ok(KeyL),
            "M" => Ok(KeyM),
            "N" => Ok(KeyN),
            "O" => Ok(KeyO),
            "P" => Ok(KeyP),
            "Q" => Ok(KeyQ),
            "R" => Ok(KeyR),
            "S" => Ok(KeyS),
            "T" => Ok(KeyT),
            "U" => Ok(KeyU),
            "V" => Ok(KeyV),
            "W" => Ok(KeyW),
            "X" => Ok(KeyX),
            "Y" => Ok(KeyY),
            "Z" => Ok(KeyZ),
            "0" => Ok(Digit0),
            "1" => Ok(Digit1),
            "2" => Ok(Digit2),
            "3" => Ok(Digit3),
            "4" => Ok(Digit4),
            "5" => Ok(Digit5),
            "6" => Ok(Digit6),
            "7" => Ok(Digit7),
            "8" => Ok(Digit8),
            "9" => Ok(Digit9),
            "NUMPAD0" => Ok(Numpad0),
            "NUMPAD1" => Ok(Numpad1),
            "NUMPAD2" => Ok(Numpad2),
            "NUMPAD3" => Ok(Numpad3),
            "NUMPAD4" => Ok(Numpad4),
            "NUMPAD5" => Ok(Numpad5),
            "NUMPAD6" => Ok(Numpad6),
            "NUMPAD7" => Ok(Numpad7),
            "NUMPAD8" => Ok(Numpad8),
            "NUMPAD9" => Ok(Numpad9),
            "F1" => Ok(F1),
            "F2" => Ok(F2),
            "F3" => Ok(F3),
            "F4" => Ok(F4),
            "F5" => Ok(F5),
            "F6" => Ok(F6),
            "F7" => Ok(F7),
            "F8" => Ok(F8),
            "F9" => Ok(F9),
            "F10" => Ok(F10),
            "F11" => Ok(F11),
            "F12" => Ok(F12),
            "LEFT" | "ARROWLEFT" => Ok(ArrowLeft),
            "RIGHT" | "ARROWRIGHT" => Ok(ArrowRight),
            "UP" | "ARROWUP" => Ok(ArrowUp),
            "DOWN" | "ARROWDOWN" => Ok(ArrowDown),
            "TAB" => Ok(Tab),
            "SPACE" => Ok(Space),
            "ENTER" | "RETURN" => Ok(Enter),
            "ESC" | "ESCAPE" => Ok(Escape),
            "BACKSPACE" | "BACK" => Ok(Backspace),
            "CAPSLOCK" => Ok(CapsLock),
            "PAGEUP" => Ok(PageUp),
            "PAGEDOWN" => Ok(PageDown),
            "END" => Ok(End),
            "HOME" => Ok(Home),
            "INSERT" => Ok(Insert),
            "DELETE" | "DEL" => Ok(Delete),
            "-" | "MINUS" | "HYPHEN" => Ok(Minus),
            "=" | "EQUAL" | "EQUALS" => Ok(Equal),
            "," | "COMMA" => Ok(Comma),
            "." | "DOT" | "PERIOD" => Ok(Period),
            "/" | "SLASH" => Ok(Slash),
            ";" | "SEMICOLON" => Ok(Semicolon),
            "'" | "QUOTE" | "APOSTROPHE" => Ok(Quote),
            "`" | "BACKQUOTE" | "GRAVE" | "TILDE" => Ok(Backquote),
            "\\" | "BACKSLASH" => Ok(Backslash),
            "[" | "BRACKETLEFT" | "LEFTBRACKET" => Ok(BracketLeft),
            "]" | "BRACKETRIGHT" | "RIGHTBRACKET" => Ok(BracketRight),
            "SHIFT" => Ok(Shift),
            "LSHIFT" | "SHIFTLEFT" => Ok(ShiftLeft),
            "RSHIFT" | "SHIFTRIGHT" => Ok(ShiftRight),
            "CTRL" | "CONTROL" => Ok(Control),
            "LCTRL" | "CTRLLEFT" | "LCONTROL" | "CONTROLLEFT" => Ok(ControlLeft),
            "RCTRL" | "CTRLRIGHT" | "RCONTROL" | "CONTROLRIGHT" => Ok(ControlRight),
            "ALT" | "MENU" => Ok(Alt),
            "LALT" | "ALTLEFT" | "LMENU" => Ok(AltLeft),
            "RALT" | "ALTRIGHT" | "RMENU" => Ok(AltRight),
            "META" | "WIN" | "SUPER" => Ok(Meta),
            "LWIN" | "METALEFT" | "LMETA" => Ok(MetaLeft),
            "RWIN" | "METARIGHT" | "RMETA" => Ok(MetaRight),
            _ => Err(anyhow!("Unrecognized key token: {}", s)),
        }
    }
}

/// Maps a Windows virtual-key code, as delivered to a low-level keyboard
/// hook, to a [`KeyCode`].
pub fn virtual_key_to_keycode(vk: u32) -> Option<KeyCode> {
    use KeyCode::*;

    const LETTERS: [KeyCode; 26] = [
        KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO,
        KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
    ];
    const DIGITS: [KeyCode; 10] =
        [Digit0, Digit1, Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9];
    const NUMPAD: [KeyCode; 10] = [
        Numpad0, Numpad1, Numpad2, Numpad3, Numpad4, Numpad5, Numpad6, Numpad7, Numpad8, Numpad9,
    ];
    const FUNCTION: [KeyCode; 12] = [F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12];

    let key = match vk {
        0x41..=0x5A => LETTERS[(vk - 0x41) as usize],
        0x30..=0x39 => DIGITS[(vk - 0x30) as usize],
        0x60..=0x69 => NUMPAD[(vk - 0x60) as usize],
        0x70..=0x7B => FUNCTION[(vk - 0x70) as usize],
        0x08 => Backspace,
        0x09 => Tab,
        0x0D => Enter,
        0x10 => Shift,
        0x11 => Control,
        0x12 => Alt,
        0x14 => CapsLock,
        0x1B => Escape,
        0x20 => Space,
        0x21 => PageUp,
        0x22 => PageDown,
        0x23 => End,
        0x24 => Home,
        0x25 => ArrowLeft,
        0x26 => ArrowUp,
        0x27 => ArrowRight,
        0x28 => ArrowDown,
        0x2D => Insert,
        0x2E => Delete,
        0x5B => MetaLeft,
        0x5C => MetaRight,
        0xA0 => ShiftLeft,
        0xA1 => ShiftRight,
        0xA2 => ControlLeft,
        0xA3 => ControlRight,
        0xA4 => AltLeft,
        0xA5 => AltRight,
        0xBA => Semicolon,
        0xBB => Equal,
        0xBC => Comma,
        0xBD => Minus,
        0xBE => Period,
        0xBF => Slash,
        0xC0 => Backquote,
        0xDB => BracketLeft,
        0xDC => Backslash,
        0xDD => BracketRight,
        0xDE => Quote,
        _ => return None,
    };

    Some(key)
}

/// The virtual-key code a hook would report for `key`. Generic modifiers map
/// to their left side.
pub fn keycode_to_virtual_key(key: KeyCode) -> Option<u32> {
    let key = key.sides().map_or(key, |[left, _]| left);
    (0..=0xFF).find(|&vk| virtual_key_to_keycode(vk) == Some(key))
}

/// An ordered set of keys that must be held together. The last key is the
/// trigger key.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chord {
    keys: Vec<KeyCode>,
}

impl Chord {
    pub fn new(keys: Vec<KeyCode>) -> anyhow::Result<Self> {
        if keys.is_empty() {
            bail!("A chord needs at least one key");
        }
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[KeyCode] { &self.keys }

    pub fn len(&self) -> usize { self.keys.len() }

    pub fn is_empty(&self) -> bool { self.keys.is_empty() }

    pub fn trigger(&self) -> KeyCode { self.keys[self.keys.len() - 1] }

    pub fn contains(&self, key: KeyCode) -> bool { self.keys.contains(&key) }

    /// Union of the modifier bits of every key in the chord.
    pub fn modifiers(&self) -> Modifiers {
        let mut mods = Modifiers::empty();
        for &key in &self.keys {
            mods.insert(Modifiers::for_key(key));
        }
        mods
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                write!(f, "+")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

impl FromStr for Chord {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keys = s
            .split('+')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(KeyCode::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Chord::new(keys).map_err(|_| anyhow!("No key specified in chord: {}", s))
    }
}

impl<'de> Deserialize<'de> for Chord {
    fn deserialize<D>(deserializer: D) -> Result<Chord, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Chord::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// What a keybinding string binds to: a keyboard chord or a MIDI button.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingSpec {
    Chord(Chord),
    Midi(u8),
}

impl FromStr for BindingSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(button) = s.strip_prefix("midi ") {
            let button = button
                .trim()
                .parse::<u8>()
                .map_err(|e| anyhow!("Invalid MIDI button in {s:?}: {e}"))?;
            return Ok(BindingSpec::Midi(button));
        }
        Ok(BindingSpec::Chord(s.parse()?))
    }
}

impl fmt::Display for BindingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingSpec::Chord(chord) => write!(f, "{chord}"),
            BindingSpec::Midi(button) => write!(f, "midi {button}"),
        }
    }
}

/// Physical key state as reported by the OS.
pub trait KeyState {
    /// Whether this exact key is down. Only called with non-generic keys.
    fn is_key_down_raw(&self, key: KeyCode) -> bool;
}

/// Per-event memo of key states. Each key is queried from the OS at most
/// once; generic modifiers resolve to "left or right is down".
pub struct KeyStateCache<'a, S: KeyState + ?Sized> {
    source: &'a S,
    states: [Option<bool>; KeyCode::COUNT],
}

impl<'a, S: KeyState + ?Sized> KeyStateCache<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            states: [None; KeyCode::COUNT],
        }
    }

    pub fn is_down(&mut self, key: KeyCode) -> bool {
        if let Some(state) = self.states[key as usize] {
            return state;
        }
        let state = match key.sides() {
            Some([left, right]) => self.is_down(left) || self.is_down(right),
            None => self.source.is_key_down_raw(key),
        };
        self.states[key as usize] = Some(state);
        state
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::common::collections::HashMap;

    struct CountingKeys {
        down: Vec<KeyCode>,
        queries: RefCell<HashMap<KeyCode, usize>>,
    }

    impl KeyState for CountingKeys {
        fn is_key_down_raw(&self, key: KeyCode) -> bool {
            *self.queries.borrow_mut().entry(key).or_default() += 1;
            self.down.contains(&key)
        }
    }

    #[test]
    fn chord_parses_in_order_with_trigger_last() {
        let chord: Chord = "Alt+Shift+Q".parse().unwrap();
        assert_eq!([KeyCode::Alt, KeyCode::Shift, KeyCode::KeyQ], chord.keys());
        assert_eq!(KeyCode::KeyQ, chord.trigger());
        assert_eq!("Alt+Shift+Q", chord.to_string());
        assert_eq!(Modifiers::ALT.0 | Modifiers::SHIFT.0, chord.modifiers().0);
    }

    #[test]
    fn chord_rejects_garbage() {
        assert!("Alt+Nope".parse::<Chord>().is_err());
        assert!("".parse::<Chord>().is_err());
        assert!(" + ".parse::<Chord>().is_err());
    }

    #[test]
    fn binding_spec_parses_midi_and_chords() {
        assert_eq!(BindingSpec::Midi(3), "midi 3".parse().unwrap());
        assert!("midi x".parse::<BindingSpec>().is_err());
        assert!(matches!("Ctrl+1".parse::<BindingSpec>().unwrap(), BindingSpec::Chord(_)));
    }

    #[test]
    fn virtual_keys_map_to_codes() {
        assert_eq!(Some(KeyCode::KeyA), virtual_key_to_keycode(0x41));
        assert_eq!(Some(KeyCode::KeyZ), virtual_key_to_keycode(0x5A));
        assert_eq!(Some(KeyCode::Digit1), virtual_key_to_keycode(0x31));
        assert_eq!(Some(KeyCode::F12), virtual_key_to_keycode(0x7B));
        assert_eq!(Some(KeyCode::AltRight), virtual_key_to_keycode(0xA5));
        assert_eq!(None, virtual_key_to_keycode(0xFF));

        assert_eq!(Some(0x51), keycode_to_virtual_key(KeyCode::KeyQ));
        assert_eq!(Some(0xA0), keycode_to_virtual_key(KeyCode::Shift));
        assert_eq!(Some(0xA5), keycode_to_virtual_key(KeyCode::AltRight));
    }

    #[test]
    fn cache_queries_each_key_once_and_resolves_aliases() {
        let keys = CountingKeys {
            down: vec![KeyCode::ControlRight],
            queries: RefCell::new(HashMap::default()),
        };
        let mut cache = KeyStateCache::new(&keys);
        assert!(cache.is_down(KeyCode::Control));
        assert!(cache.is_down(KeyCode::Control));
        assert!(cache.is_down(KeyCode::ControlRight));
        assert!(!cache.is_down(KeyCode::ControlLeft));
        assert!(!cache.is_down(KeyCode::Alt));

        let queries = keys.queries.borrow();
        assert_eq!(Some(&1), queries.get(&KeyCode::ControlLeft));
        assert_eq!(Some(&1), queries.get(&KeyCode::ControlRight));
        assert_eq!(None, queries.get(&KeyCode::Control));
    }

    #[test]
    fn modifiers_display() {
        let mut mods = Modifiers::for_key(KeyCode::Control);
        mods.insert(Modifiers::ALT_RIGHT);
        assert_eq!("Ctrl + AltRight", mods.to_string());
        assert!(KeyCode::MetaLeft.is_modifier());
        assert!(!KeyCode::KeyQ.is_modifier());
    }
}

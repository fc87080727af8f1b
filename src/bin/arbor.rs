use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, bail};
use arbor_wm::actor::event_tap::{EventTap, RawKeyEvent};
use arbor_wm::actor::midi::{self, LogBrightness, MidiListener};
use arbor_wm::actor::reactor::{Command, Reactor};
use arbor_wm::actor::wm_controller::{self, WmCommand, WmController};
use arbor_wm::common::config::{Config, config_file};
use arbor_wm::common::log;
use arbor_wm::layout_engine::LayoutApplier;
use arbor_wm::sys::hotkey::{Chord, KeyCode, KeyState, keycode_to_virtual_key};
use arbor_wm::sys::midi::MidiMessage;
use arbor_wm::sys::window_server::{HeadlessWindowServer, Snapshot};
use clap::Parser;
use tracing::{error, info, warn};

#[derive(Parser)]
struct Cli {
    /// Path to configuration file to use (overrides default).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// JSON file describing the monitors and windows to manage.
    #[arg(long, value_name = "PATH")]
    snapshot: Option<PathBuf>,

    /// Check whether the configuration is valid without starting the window
    /// manager.
    #[arg(long)]
    validate: bool,
}

fn main() {
    sigpipe::reset();
    let opt = Cli::parse();
    log::init_logging();

    let config_path = opt.config.clone().or_else(config_file);
    let config = match config_path.as_deref().filter(|path| path.exists()) {
        Some(path) => match Config::read(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{}: {err:#}", path.display());
                process::exit(1);
            }
        },
        None => Config::default(),
    };

    if opt.validate {
        let issues = config.validate();
        if issues.is_empty() {
            println!("Config validation passed");
        } else {
            for issue in issues {
                eprintln!("{}", issue);
            }
            process::exit(1);
        }
        return;
    }

    let snapshot = match opt.snapshot.as_deref().map(read_snapshot).transpose() {
        Ok(snapshot) => snapshot.unwrap_or_default(),
        Err(err) => {
            eprintln!("{err:#}");
            process::exit(1);
        }
    };

    let server = Arc::new(HeadlessWindowServer::from_snapshot(&snapshot));
    let mut reactor = Reactor::new(server.clone());
    reactor.subscribe(Box::new(LayoutApplier::new(server, config.settings.clone())));
    if let Err(err) = reactor.dispatch(Command::ManageWindows {
        monitors: snapshot.monitors,
        windows: snapshot.windows,
    }) {
        error!(%err, "could not manage windows");
        process::exit(1);
    }

    let (wm_tx, wm_rx) = arbor_wm::actor::channel();
    let event_tap = EventTap::new();
    WmController::new(event_tap.clone(), wm_tx.clone()).register_keys(&config);

    let midi_tx = if config.midi.enabled {
        let (tx, rx) = arbor_wm::actor::channel();
        let listener =
            MidiListener::new(event_tap.clone(), config.midi.clone(), Box::new(LogBrightness));
        match listener.spawn(rx) {
            Ok(_) => Some(tx),
            Err(err) => {
                warn!(%err, "could not start the midi listener");
                None
            }
        }
    } else {
        None
    };

    let exit_tx = wm_tx.clone();
    if let Err(err) = ctrlc::set_handler(move || exit_tx.send(WmCommand::Exit)) {
        warn!(%err, "could not install the interrupt handler");
    }

    let input = thread::Builder::new()
        .name("input".into())
        .spawn(move || read_input(&event_tap, &wm_tx, midi_tx.as_ref()));
    if let Err(err) = input {
        error!(%err, "could not start the input thread");
        process::exit(1);
    }

    info!("arbor started");
    reactor.run(wm_rx);
}

fn read_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let buf = std::fs::read_to_string(path)
        .with_context(|| format!("could not read snapshot {}", path.display()))?;
    serde_json::from_str(&buf).with_context(|| format!("invalid snapshot {}", path.display()))
}

/// Feeds stdin lines to the input handlers until EOF, then asks the reactor
/// to exit.
///
/// ```text
/// press Alt+Shift+Space   simulate a key press through the keyboard hook
/// midi 90 0a 7f           raw MIDI bytes, in hex
/// dump_tree               any WM command by name
/// ```
fn read_input(
    event_tap: &EventTap,
    commands: &wm_controller::Sender,
    midi: Option<&midi::Sender>,
) {
    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Err(err) = handle_line(line, event_tap, commands, midi) {
            warn!("{err:#}");
        }
    }
    commands.send(WmCommand::Exit);
}

fn handle_line(
    line: &str,
    event_tap: &EventTap,
    commands: &wm_controller::Sender,
    midi: Option<&midi::Sender>,
) -> anyhow::Result<()> {
    if let Some(chord) = line.strip_prefix("press ") {
        let chord: Chord = chord.parse()?;
        let trigger = chord.trigger();
        let vk = keycode_to_virtual_key(trigger)
            .with_context(|| format!("{trigger} has no virtual key"))?;
        let response = event_tap.on_key_event(RawKeyEvent::key_down(vk), &Held(&chord));
        info!(%chord, ?response, "key press");
    } else if let Some(bytes) = line.strip_prefix("midi ") {
        let Some(midi) = midi else {
            bail!("midi is disabled");
        };
        let bytes = bytes
            .split_whitespace()
            .map(|b| u8::from_str_radix(b, 16))
            .collect::<Result<Vec<_>, _>>()
            .context("midi bytes must be hex")?;
        let message = MidiMessage::decode(&bytes)
            .with_context(|| format!("incomplete midi message {bytes:02x?}"))?;
        midi.send(message);
    } else {
        commands.send(line.parse::<WmCommand>().with_context(|| format!("unknown input {line:?}"))?);
    }
    Ok(())
}

/// Keys held down while a simulated chord is pressed.
struct Held<'a>(&'a Chord);

impl KeyState for Held<'_> {
    fn is_key_down_raw(&self, key: KeyCode) -> bool {
        self.0.keys().iter().any(|&k| k == key || k.sides().is_some_and(|[left, _]| left == key))
    }
}

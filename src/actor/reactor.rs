//! The reactor owns the container tree and is the only place it is mutated.
//!
//! Commands are dispatched synchronously to exactly one handler. Handlers may
//! dispatch further commands; a nested command runs to completion before the
//! outer handler continues. Events are published to subscribers, which only
//! get a shared borrow of the tree.

pub mod error;
mod events {
    pub mod command;
    pub mod floating;
    pub mod window_discovery;
}

use std::ops::ControlFlow;
use std::sync::Arc;

pub use error::ReactorError;
use events::command::CommandEventHandler;
use events::floating::FloatingEventHandler;
use events::window_discovery::WindowDiscoveryHandler;
use tracing::{debug, debug_span, info, trace, warn};

use crate::actor;
use crate::actor::wm_controller::WmCommand;
use crate::model::{ContainerId, ContainerTree, query};
use crate::sys::window_server::{MonitorInfo, WindowHandle, WindowInfo, WindowServer};

#[derive(Debug, Clone)]
pub enum Command {
    Attach {
        parent: ContainerId,
        child: ContainerId,
        index: Option<usize>,
        focused: bool,
    },
    Detach {
        child: ContainerId,
    },
    Replace {
        old: ContainerId,
        new: ContainerId,
    },
    /// Relocates `container` to layout position `index` under `target`'s
    /// parent, keeping focus order consistent.
    Move {
        container: ContainerId,
        target: ContainerId,
        index: usize,
    },
    Focus {
        container: ContainerId,
    },
    ToggleFloating {
        window: ContainerId,
    },
    EnableFloating {
        window: ContainerId,
    },
    DisableFloating {
        window: ContainerId,
    },
    Redraw,
    ManageWindows {
        monitors: Vec<MonitorInfo>,
        windows: Vec<WindowInfo>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Attach { .. } => "attach",
            Command::Detach { .. } => "detach",
            Command::Replace { .. } => "replace",
            Command::Move { .. } => "move",
            Command::Focus { .. } => "focus",
            Command::ToggleFloating { .. } => "toggle_floating",
            Command::EnableFloating { .. } => "enable_floating",
            Command::DisableFloating { .. } => "disable_floating",
            Command::Redraw => "redraw",
            Command::ManageWindows { .. } => "manage_windows",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The tree changed in a way that affects window frames.
    RedrawContainers,
    ContainerAttached {
        parent: ContainerId,
        child: ContainerId,
    },
    ContainerDetached {
        parent: ContainerId,
        child: ContainerId,
    },
    FocusChanged {
        container: ContainerId,
    },
    FloatingChanged {
        handle: WindowHandle,
        floating: bool,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandResponse {
    /// The container the command produced or acted on, if any.
    pub container: Option<ContainerId>,
}

impl CommandResponse {
    pub fn none() -> Self { Self::default() }

    pub fn container(container: ContainerId) -> Self { Self { container: Some(container) } }
}

pub trait Subscriber {
    fn on_event(&mut self, tree: &ContainerTree, event: &Event);
}

pub struct Reactor {
    tree: ContainerTree,
    window_server: Arc<dyn WindowServer>,
    subscribers: Vec<Box<dyn Subscriber>>,
    in_flight: Vec<&'static str>,
}

impl Reactor {
    pub fn new(window_server: Arc<dyn WindowServer>) -> Reactor {
        Reactor {
            tree: ContainerTree::new(),
            window_server,
            subscribers: Vec::new(),
            in_flight: Vec::new(),
        }
    }

    pub fn tree(&self) -> &ContainerTree { &self.tree }

    pub fn tree_mut(&mut self) -> &mut ContainerTree { &mut self.tree }

    pub fn window_server(&self) -> &dyn WindowServer { &*self.window_server }

    pub fn subscribe(&mut self, subscriber: Box<dyn Subscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Names of the commands currently executing, outermost first.
    pub fn in_flight(&self) -> &[&'static str] { &self.in_flight }

    pub fn dispatch(&mut self, command: Command) -> Result<CommandResponse, ReactorError> {
        let name = command.name();
        self.in_flight.push(name);
        let span = debug_span!("dispatch", command = name, depth = self.in_flight.len());
        let result = span.in_scope(|| {
            trace!(?command);
            let result = self.handle_command(command);
            if let Err(err) = &result {
                debug!(%err, "command failed");
            }
            result
        });
        self.in_flight.pop();

        debug_assert!(
            self.tree.validate().is_ok(),
            "tree invariants violated after {name}: {:?}\n{}",
            self.tree.validate(),
            self.tree.render()
        );
        result
    }

    fn handle_command(&mut self, command: Command) -> Result<CommandResponse, ReactorError> {
        match command {
            Command::Attach { parent, child, index, focused } => {
                CommandEventHandler::handle_attach(self, parent, child, index, focused)
            }
            Command::Detach { child } => CommandEventHandler::handle_detach(self, child),
            Command::Replace { old, new } => CommandEventHandler::handle_replace(self, old, new),
            Command::Move { container, target, index } => {
                CommandEventHandler::handle_move(self, container, target, index)
            }
            Command::Focus { container } => CommandEventHandler::handle_focus(self, container),
            Command::Redraw => CommandEventHandler::handle_redraw(self),
            Command::ToggleFloating { window } => FloatingEventHandler::handle_toggle(self, window),
            Command::EnableFloating { window } => FloatingEventHandler::handle_enable(self, window),
            Command::DisableFloating { window } => {
                FloatingEventHandler::handle_disable(self, window)
            }
            Command::ManageWindows { monitors, windows } => {
                WindowDiscoveryHandler::handle_manage_windows(self, monitors, windows)
            }
        }
    }

    pub fn publish(&mut self, event: Event) {
        trace!(?event, subscribers = self.subscribers.len(), "publish");
        for subscriber in &mut self.subscribers {
            subscriber.on_event(&self.tree, &event);
        }
    }

    /// Consumes commands until [`WmCommand::Exit`] arrives or every sender is
    /// gone.
    pub fn run(mut self, commands: actor::Receiver<WmCommand>) {
        while let Ok((span, command)) = commands.recv() {
            let _guard = span.enter();
            if self.handle_wm_command(command).is_break() {
                break;
            }
        }
        info!("reactor stopped");
    }

    pub fn handle_wm_command(&mut self, command: WmCommand) -> ControlFlow<()> {
        debug!(?command);
        let result = match command {
            WmCommand::ToggleFloating => {
                match query::focused_window(&self.tree, self.tree.root()) {
                    Some(window) => self.dispatch(Command::ToggleFloating { window }).map(|_| ()),
                    None => {
                        debug!("no focused window to toggle");
                        Ok(())
                    }
                }
            }
            WmCommand::Redraw => self.dispatch(Command::Redraw).map(|_| ()),
            WmCommand::DumpTree => {
                info!("\n{}", self.tree.render());
                Ok(())
            }
            WmCommand::Exit => return ControlFlow::Break(()),
        };
        if let Err(err) = result {
            warn!(%err, "command failed");
        }
        ControlFlow::Continue(())
    }
}

use tracing::{debug, info, warn};

use crate::actor::reactor::{Command, CommandResponse, Event, Reactor, ReactorError};
use crate::model::{Container, ContainerId};
use crate::sys::window_server::{MonitorInfo, WindowCapabilities, WindowInfo};

/// Seeds the tree from a snapshot of the OS: one workspace per monitor, and
/// every window not already managed placed on the monitor it sits on.
pub struct WindowDiscoveryHandler;

impl WindowDiscoveryHandler {
    pub fn handle_manage_windows(
        reactor: &mut Reactor,
        monitors: Vec<MonitorInfo>,
        windows: Vec<WindowInfo>,
    ) -> Result<CommandResponse, ReactorError> {
        if monitors.is_empty() {
            warn!(windows = windows.len(), "no monitors reported; not managing any windows");
            return Ok(CommandResponse::none());
        }

        let mut workspaces = Vec::with_capacity(monitors.len());
        for (index, monitor) in monitors.iter().enumerate() {
            workspaces.push(Self::workspace_for_monitor(reactor, index, monitor)?);
        }

        let mut managed = 0;
        for window in windows {
            if reactor.tree.find_window(window.handle).is_some() {
                debug!(handle = ?window.handle, "already managed");
                continue;
            }
            let center = window.frame.mid();
            let monitor = monitors.iter().position(|m| m.frame.contains(center)).unwrap_or(0);
            let container = if window.capabilities.contains(WindowCapabilities::RESIZABLE) {
                Container::tiling_window(window.handle, window.frame.size())
            } else {
                Container::floating_window(window.handle, window.frame)
            };
            debug!(
                handle = ?window.handle,
                process = %window.process,
                title = %window.title,
                monitor,
                kind = container.kind_name(),
                "managing window"
            );
            let child = reactor.tree.insert(container);
            reactor.dispatch(Command::Attach {
                parent: workspaces[monitor],
                child,
                index: None,
                focused: false,
            })?;
            managed += 1;
        }

        info!(monitors = monitors.len(), managed, "windows managed");
        reactor.publish(Event::RedrawContainers);
        Ok(CommandResponse::none())
    }

    /// Returns the workspace of the monitor called `info.name`, creating the
    /// monitor and its workspace when they do not exist yet.
    fn workspace_for_monitor(
        reactor: &mut Reactor,
        index: usize,
        info: &MonitorInfo,
    ) -> Result<ContainerId, ReactorError> {
        let root = reactor.tree.root();
        let existing = root.children(&reactor.tree).find(
            |&m| matches!(&reactor.tree[m], Container::Monitor { name, .. } if *name == info.name),
        );
        if let Some(monitor) = existing
            && let Some(workspace) =
                monitor.children(&reactor.tree).find(|&c| reactor.tree[c].is_workspace())
        {
            return Ok(workspace);
        }

        let monitor = match existing {
            Some(monitor) => monitor,
            None => {
                let monitor = reactor.tree.insert(Container::Monitor {
                    name: info.name.clone(),
                    frame: info.frame,
                    primary: info.primary,
                });
                reactor.dispatch(Command::Attach {
                    parent: root,
                    child: monitor,
                    index: None,
                    focused: info.primary,
                })?;
                monitor
            }
        };
        let workspace = reactor.tree.insert(Container::Workspace {
            name: (index + 1).to_string(),
            frame: info.frame,
        });
        reactor.dispatch(Command::Attach {
            parent: monitor,
            child: workspace,
            index: None,
            focused: true,
        })?;
        Ok(workspace)
    }
}

use tracing::debug;

use crate::actor::reactor::{Command, CommandResponse, Event, Reactor, ReactorError};
use crate::model::query::{last_focused_descendant_of_capability, workspace_ancestor};
use crate::model::{Capabilities, Container, ContainerId, TreeError};

/// Moves windows between the tiling layout and the floating layer.
///
/// A window is either tiling or floating; toggling is the only transition.
/// Both directions replace the window's container with a fresh one of the
/// other kind, so the container id changes while the window handle does not.
pub struct FloatingEventHandler;

impl FloatingEventHandler {
    pub fn handle_toggle(
        reactor: &mut Reactor,
        window: ContainerId,
    ) -> Result<CommandResponse, ReactorError> {
        let command = match reactor.tree.get(window) {
            None => return Err(TreeError::missing(window).into()),
            Some(Container::TilingWindow { .. }) => Command::EnableFloating { window },
            Some(Container::FloatingWindow { .. }) => Command::DisableFloating { window },
            Some(_) => {
                return Err(ReactorError::NotAWindow { container: window, expected: "window" });
            }
        };
        reactor.dispatch(command)
    }

    /// Tiling to floating. The new floating window keeps the tiled size and is
    /// centered on the workspace.
    ///
    /// Order:
    /// 1. resolve the workspace and the window's focus rank in its parent,
    /// 2. detach and free the tiling window,
    /// 3. attach the floating window under the workspace,
    /// 4. restore the focus rank within the workspace,
    /// 5. publish.
    pub fn handle_enable(
        reactor: &mut Reactor,
        window: ContainerId,
    ) -> Result<CommandResponse, ReactorError> {
        let tree = &reactor.tree;
        let Some(&Container::TilingWindow { handle, tiled_size }) = tree.get(window) else {
            return Err(not_a(reactor, window, "tiling window"));
        };
        let workspace = workspace_ancestor(tree, window)?;
        let focus_order_index = window.focus_index(tree);
        let workspace_frame = tree[workspace].frame().unwrap_or_default();
        let frame = workspace_frame.centered(tiled_size);

        let floating = reactor.tree.insert(Container::floating_window(handle, frame));
        reactor.dispatch(Command::Detach { child: window })?;
        reactor.tree.remove(window)?;
        reactor.dispatch(Command::Attach {
            parent: workspace,
            child: floating,
            index: None,
            focused: false,
        })?;
        if let Some(index) = focus_order_index {
            reactor.tree.shift_focus_to_index(workspace, floating, index)?;
        }
        debug!(?handle, ?frame, "window now floating");

        reactor.publish(Event::FloatingChanged { handle, floating: true });
        reactor.publish(Event::RedrawContainers);
        Ok(CommandResponse::container(floating))
    }

    /// Floating to tiling. The window's live size becomes its tiled size and it
    /// is placed next to the workspace's most recently focused tiling
    /// container.
    ///
    /// Order:
    /// 1. resolve the workspace, the live frame, and the insertion target,
    /// 2. replace the floating window in place (focus rank is kept exactly),
    /// 3. move the tiling window after the insertion target, if there is one,
    /// 4. publish.
    pub fn handle_disable(
        reactor: &mut Reactor,
        window: ContainerId,
    ) -> Result<CommandResponse, ReactorError> {
        let tree = &reactor.tree;
        let Some(&Container::FloatingWindow { handle, .. }) = tree.get(window) else {
            return Err(not_a(reactor, window, "floating window"));
        };
        let workspace = workspace_ancestor(tree, window)?;
        let live_frame = reactor.window_server.frame(handle).map_err(ReactorError::WindowServer)?;
        let insertion_target = last_focused_descendant_of_capability(
            tree,
            workspace,
            Capabilities::RESIZABLE,
            Some(window),
        );

        let tiling = reactor.tree.insert(Container::tiling_window(handle, live_frame.size()));
        reactor.dispatch(Command::Replace { old: window, new: tiling })?;
        reactor.tree.remove(window)?;

        if let Some(target) = insertion_target {
            let index = target.index(&reactor.tree).map_or(0, |i| i + 1);
            reactor.dispatch(Command::Move { container: tiling, target, index })?;
        }
        debug!(?handle, ?insertion_target, "window now tiling");

        reactor.publish(Event::FloatingChanged { handle, floating: false });
        reactor.publish(Event::RedrawContainers);
        Ok(CommandResponse::container(tiling))
    }
}

fn not_a(reactor: &Reactor, container: ContainerId, expected: &'static str) -> ReactorError {
    if reactor.tree.contains(container) {
        ReactorError::NotAWindow { container, expected }
    } else {
        TreeError::missing(container).into()
    }
}

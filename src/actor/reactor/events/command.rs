use tracing::{debug, trace};

use crate::actor::reactor::{Command, CommandResponse, Event, Reactor, ReactorError};
use crate::model::query::{child_toward_descendant, last_focused_descendant, lowest_common_ancestor};
use crate::model::{Capabilities, ContainerId, TreeError};

/// Handlers for the primitive tree mutations. Everything else that changes
/// the tree is built out of these.
pub struct CommandEventHandler;

impl CommandEventHandler {
    pub fn handle_attach(
        reactor: &mut Reactor,
        parent: ContainerId,
        child: ContainerId,
        index: Option<usize>,
        focused: bool,
    ) -> Result<CommandResponse, ReactorError> {
        reactor.tree.attach_child(parent, child, index, focused)?;
        reactor.publish(Event::ContainerAttached { parent, child });
        Ok(CommandResponse::container(child))
    }

    pub fn handle_detach(
        reactor: &mut Reactor,
        child: ContainerId,
    ) -> Result<CommandResponse, ReactorError> {
        if !reactor.tree.contains(child) {
            return Err(TreeError::missing(child).into());
        }
        let parent = child.parent(&reactor.tree).ok_or(TreeError::Detached(child))?;
        reactor.tree.detach_child(parent, child)?;
        reactor.publish(Event::ContainerDetached { parent, child });
        Ok(CommandResponse::container(child))
    }

    pub fn handle_replace(
        reactor: &mut Reactor,
        old: ContainerId,
        new: ContainerId,
    ) -> Result<CommandResponse, ReactorError> {
        if !reactor.tree.contains(old) {
            return Err(TreeError::missing(old).into());
        }
        let parent = old.parent(&reactor.tree).ok_or(TreeError::Detached(old))?;
        reactor.tree.replace_child(parent, old, new)?;
        reactor.publish(Event::ContainerDetached { parent, child: old });
        reactor.publish(Event::ContainerAttached { parent, child: new });
        Ok(CommandResponse::container(new))
    }

    /// Moves `container` under `target`'s parent at layout position `index`.
    ///
    /// Focus order is kept coherent: when the moved container was the focused
    /// branch of the common ancestor and came before the target's branch in
    /// its focus order, it stays ahead of the target after the move.
    ///
    /// All validation happens before the first mutation.
    pub fn handle_move(
        reactor: &mut Reactor,
        container: ContainerId,
        target: ContainerId,
        index: usize,
    ) -> Result<CommandResponse, ReactorError> {
        if container == target {
            return Ok(CommandResponse::container(container));
        }

        let tree = &reactor.tree;
        for id in [container, target] {
            if !tree.contains(id) {
                return Err(TreeError::missing(id).into());
            }
        }
        let old_parent = container.parent(tree).ok_or(TreeError::Detached(container))?;
        let Some(target_parent) = target.parent(tree) else {
            return Err(invalid(target, "target has no parent"));
        };
        if !tree[target_parent].has(Capabilities::LAYOUT) {
            return Err(invalid(target, "target's parent cannot hold children"));
        }
        if target_parent.ancestors(tree).any(|a| a == container) {
            return Err(invalid(target, "cannot move a container into its own subtree"));
        }
        tree.check_placement(target_parent, container)?;

        let lca = lowest_common_ancestor(tree, container, target)?;
        if lca == target {
            return Err(invalid(target, "target contains the container"));
        }
        let container_ancestor = child_toward_descendant(tree, lca, container)?;
        let target_ancestor = child_toward_descendant(tree, lca, target)?;

        let is_focused_branch = container_ancestor == container
            || last_focused_descendant(tree, container_ancestor) == Some(container);
        let container_focus_index = container_ancestor.focus_index(tree);
        let should_focus_before = if container_ancestor == target_ancestor {
            is_focused_branch
        } else {
            container_focus_index < target_ancestor.focus_index(tree)
        };
        let old_index = container.index(tree);
        trace!(
            ?lca,
            ?container_ancestor,
            ?target_ancestor,
            is_focused_branch,
            should_focus_before
        );

        if is_focused_branch
            && should_focus_before
            && let Some(focus_index) = container_focus_index
        {
            reactor.tree.shift_focus_to_index(lca, target_ancestor, focus_index)?;
        }

        let mut index = index;
        if old_parent == target_parent && old_index.is_some_and(|old| old < index) {
            index -= 1;
        }
        reactor.dispatch(Command::Detach { child: container })?;
        reactor.dispatch(Command::Attach {
            parent: target_parent,
            child: container,
            index: Some(index),
            focused: false,
        })?;

        if target_parent == lca {
            let target_index = target.focus_index(&reactor.tree).unwrap_or_default();
            let focus_index = if should_focus_before { target_index } else { target_index + 1 };
            reactor.tree.shift_focus_to_index(lca, container, focus_index)?;
        } else if should_focus_before {
            reactor.tree.move_to_front_of_focus(target_parent, container)?;
        }

        Ok(CommandResponse::container(container))
    }

    /// Brings every edge from `container` up to the root to the front of its
    /// parent's focus order.
    pub fn handle_focus(
        reactor: &mut Reactor,
        container: ContainerId,
    ) -> Result<CommandResponse, ReactorError> {
        if !reactor.tree.contains(container) {
            return Err(TreeError::missing(container).into());
        }
        let path: Vec<_> = container.ancestors(&reactor.tree).collect();
        for edge in path.windows(2) {
            reactor.tree.move_to_front_of_focus(edge[1], edge[0])?;
        }
        debug!(?container, "focused");
        reactor.publish(Event::FocusChanged { container });
        Ok(CommandResponse::container(container))
    }

    pub fn handle_redraw(reactor: &mut Reactor) -> Result<CommandResponse, ReactorError> {
        reactor.publish(Event::RedrawContainers);
        Ok(CommandResponse::none())
    }
}

fn invalid(target: ContainerId, reason: &'static str) -> ReactorError {
    TreeError::InvalidTarget { target, reason }.into()
}

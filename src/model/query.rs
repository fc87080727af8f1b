//! Read-only questions about the container tree.

use super::container::Capabilities;
use super::error::TreeError;
use super::tree::{ContainerId, ContainerTree};

/// The deepest container that is an ancestor of both `a` and `b`. A container
/// counts as its own ancestor.
pub fn lowest_common_ancestor(
    tree: &ContainerTree,
    a: ContainerId,
    b: ContainerId,
) -> Result<ContainerId, TreeError> {
    if !tree.contains(a) {
        return Err(TreeError::missing(a));
    }
    if !tree.contains(b) {
        return Err(TreeError::missing(b));
    }
    let a_chain: Vec<_> = a.ancestors(tree).collect();
    b.ancestors(tree)
        .find(|candidate| a_chain.contains(candidate))
        .ok_or(TreeError::NoRelation(a, b))
}

/// The immediate child of `ancestor` on the path down to `descendant`.
pub fn child_toward_descendant(
    tree: &ContainerTree,
    ancestor: ContainerId,
    descendant: ContainerId,
) -> Result<ContainerId, TreeError> {
    let mut child = descendant;
    loop {
        match child.parent(tree) {
            Some(parent) if parent == ancestor => return Ok(child),
            Some(parent) => child = parent,
            None => {
                return Err(TreeError::NotFound {
                    parent: Some(ancestor),
                    child: descendant,
                });
            }
        }
    }
}

/// Follows the head of each focus order down from `node`. `None` when `node`
/// has no children.
pub fn last_focused_descendant(tree: &ContainerTree, node: ContainerId) -> Option<ContainerId> {
    let mut current = node.focus_order(tree).next()?;
    while let Some(next) = current.focus_order(tree).next() {
        current = next;
    }
    Some(current)
}

/// The most recently focused window below `root` that has `capability`.
///
/// Children are visited in focus order; a child without the capability is
/// skipped together with its whole subtree. `exclude` is never returned.
pub fn last_focused_descendant_of_capability(
    tree: &ContainerTree,
    root: ContainerId,
    capability: Capabilities,
    exclude: Option<ContainerId>,
) -> Option<ContainerId> {
    let mut stack: Vec<ContainerId> = root.focus_order(tree).collect();
    stack.reverse();
    while let Some(node) = stack.pop() {
        if Some(node) == exclude || !node.has(tree, capability) {
            continue;
        }
        if tree[node].is_window() {
            return Some(node);
        }
        let depth = stack.len();
        stack.extend(node.focus_order(tree));
        stack[depth..].reverse();
    }
    None
}

pub fn workspace_ancestor(
    tree: &ContainerTree,
    container: ContainerId,
) -> Result<ContainerId, TreeError> {
    if !tree.contains(container) {
        return Err(TreeError::missing(container));
    }
    container
        .ancestors(tree)
        .skip(1)
        .find(|&id| tree[id].is_workspace())
        .ok_or(TreeError::Detached(container))
}

/// The window that currently has focus, following focus order from `root`.
pub fn focused_window(tree: &ContainerTree, root: ContainerId) -> Option<ContainerId> {
    last_focused_descendant(tree, root).filter(|&id| tree[id].is_window())
}

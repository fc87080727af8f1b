use std::fmt::Write as _;
use std::ops::{Index, IndexMut};

use slotmap::SlotMap;

use super::container::{Capabilities, Container};
use super::error::TreeError;
use crate::common::collections::HashSet;
use crate::sys::window_server::WindowHandle;

slotmap::new_key_type! {
    /// Stable address of a container in the tree's arena.
    pub struct ContainerId;
}

/// Arena-backed container tree.
///
/// Parent links and focus-order entries are ids into the arena rather than
/// owning references. Nodes that have been detached stay in the arena as the
/// roots of their own (unattached) trees until they are reattached or
/// [`ContainerTree::remove`]d.
pub struct ContainerTree {
    map: SlotMap<ContainerId, Node>,
    root: ContainerId,
}

#[derive(Debug)]
struct Node {
    parent: Option<ContainerId>,
    /// Layout order.
    children: Vec<ContainerId>,
    /// Most recently focused first. Always a permutation of `children`.
    focus_order: Vec<ContainerId>,
    container: Container,
}

impl Node {
    fn new(container: Container) -> Self {
        Node {
            parent: None,
            children: Vec::new(),
            focus_order: Vec::new(),
            container,
        }
    }
}

impl Default for ContainerTree {
    fn default() -> Self { Self::new() }
}

impl ContainerTree {
    pub fn new() -> Self {
        let mut map = SlotMap::with_key();
        let root = map.insert(Node::new(Container::Root));
        ContainerTree { map, root }
    }

    pub fn root(&self) -> ContainerId { self.root }

    /// Adds a container to the arena without attaching it anywhere.
    pub fn insert(&mut self, container: Container) -> ContainerId {
        self.map.insert(Node::new(container))
    }

    pub fn contains(&self, id: ContainerId) -> bool { self.map.contains_key(id) }

    pub fn get(&self, id: ContainerId) -> Option<&Container> {
        self.map.get(id).map(|n| &n.container)
    }

    pub fn get_mut(&mut self, id: ContainerId) -> Option<&mut Container> {
        self.map.get_mut(id).map(|n| &mut n.container)
    }

    pub fn len(&self) -> usize { self.map.len() }

    pub fn is_empty(&self) -> bool { self.map.len() <= 1 }

    fn node(&self, id: ContainerId) -> Result<&Node, TreeError> {
        self.map.get(id).ok_or(TreeError::missing(id))
    }

    fn node_mut(&mut self, id: ContainerId) -> Result<&mut Node, TreeError> {
        self.map.get_mut(id).ok_or(TreeError::missing(id))
    }

    /// Inserts `child` under `parent` at layout position `index` (end when
    /// `None`, clamped to the child count). In the focus order the child goes
    /// first when `focused`, last otherwise.
    pub fn attach_child(
        &mut self,
        parent: ContainerId,
        child: ContainerId,
        index: Option<usize>,
        focused: bool,
    ) -> Result<(), TreeError> {
        self.node(parent)?;
        if let Some(existing) = self.node(child)?.parent {
            return Err(TreeError::AlreadyAttached { child, parent: existing });
        }
        self.check_placement(parent, child)?;

        let parent_node = self.node_mut(parent)?;
        let index = index.unwrap_or(parent_node.children.len()).min(parent_node.children.len());
        parent_node.children.insert(index, child);
        if focused {
            parent_node.focus_order.insert(0, child);
        } else {
            parent_node.focus_order.push(child);
        }
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Whether `child` may become a child of `parent`. Both must exist.
    pub fn check_placement(&self, parent: ContainerId, child: ContainerId) -> Result<(), TreeError> {
        if child == self.root || parent.ancestors(self).any(|a| a == child) {
            return Err(TreeError::InvalidTarget {
                target: parent,
                reason: "container cannot be attached inside itself",
            });
        }
        if self.node(child)?.container.is_floating()
            && matches!(self.node(parent)?.container, Container::Split { .. })
        {
            return Err(TreeError::InvalidTarget {
                target: parent,
                reason: "floating windows live directly under a workspace",
            });
        }
        Ok(())
    }

    /// Removes `child` from both the layout and focus order of `parent`.
    pub fn detach_child(&mut self, parent: ContainerId, child: ContainerId) -> Result<(), TreeError> {
        let not_found = TreeError::NotFound { parent: Some(parent), child };
        if self.node(child)?.parent != Some(parent) {
            return Err(not_found);
        }
        let parent_node = self.node_mut(parent)?;
        let (Some(layout_idx), Some(focus_idx)) = (
            parent_node.children.iter().position(|&c| c == child),
            parent_node.focus_order.iter().position(|&c| c == child),
        ) else {
            return Err(not_found);
        };
        parent_node.children.remove(layout_idx);
        parent_node.focus_order.remove(focus_idx);
        self.node_mut(child)?.parent = None;
        Ok(())
    }

    /// Puts `new` in `old`'s place, keeping both its layout index and its exact
    /// focus rank. `old` is left unattached.
    pub fn replace_child(
        &mut self,
        parent: ContainerId,
        old: ContainerId,
        new: ContainerId,
    ) -> Result<(), TreeError> {
        if self.node(old)?.parent != Some(parent) {
            return Err(TreeError::NotFound { parent: Some(parent), child: old });
        }
        if let Some(existing) = self.node(new)?.parent {
            return Err(TreeError::AlreadyAttached { child: new, parent: existing });
        }
        self.check_placement(parent, new)?;
        let parent_node = self.node_mut(parent)?;
        for slot in parent_node.children.iter_mut().chain(parent_node.focus_order.iter_mut()) {
            if *slot == old {
                *slot = new;
            }
        }
        self.node_mut(old)?.parent = None;
        self.node_mut(new)?.parent = Some(parent);
        Ok(())
    }

    /// Moves `child` to `index` in `parent`'s focus order. Entries in between
    /// shift by one.
    pub fn shift_focus_to_index(
        &mut self,
        parent: ContainerId,
        child: ContainerId,
        index: usize,
    ) -> Result<(), TreeError> {
        let focus_order = &mut self.node_mut(parent)?.focus_order;
        let Some(current) = focus_order.iter().position(|&c| c == child) else {
            return Err(TreeError::NotFound { parent: Some(parent), child });
        };
        focus_order.remove(current);
        let index = index.min(focus_order.len());
        focus_order.insert(index, child);
        Ok(())
    }

    pub fn move_to_front_of_focus(
        &mut self,
        parent: ContainerId,
        child: ContainerId,
    ) -> Result<(), TreeError> {
        self.shift_focus_to_index(parent, child, 0)
    }

    /// Frees an unattached container and everything below it.
    pub fn remove(&mut self, id: ContainerId) -> Result<Container, TreeError> {
        if let Some(parent) = self.node(id)?.parent {
            return Err(TreeError::AlreadyAttached { child: id, parent });
        }
        if id == self.root {
            return Err(TreeError::InvalidTarget { target: id, reason: "cannot remove the root" });
        }
        let subtree: Vec<_> = id.traverse_preorder(self).collect();
        let mut removed = None;
        for node in subtree {
            if let Some(n) = self.map.remove(node) {
                if node == id {
                    removed = Some(n.container);
                }
            }
        }
        removed.ok_or(TreeError::missing(id))
    }

    pub fn find_window(&self, handle: WindowHandle) -> Option<ContainerId> {
        self.root
            .traverse_preorder(self)
            .find(|&id| self[id].window_handle() == Some(handle))
    }

    pub fn windows(&self, root: ContainerId) -> impl Iterator<Item = ContainerId> + '_ {
        root.traverse_preorder(self).filter(|&id| self[id].is_window())
    }

    /// Checks the structural invariants of every node in the arena and returns
    /// each violation found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();
        if self.map.get(self.root).and_then(|n| n.parent).is_some() {
            issues.push("root has a parent".to_string());
        }
        for (id, node) in &self.map {
            let children: HashSet<_> = node.children.iter().copied().collect();
            let focus: HashSet<_> = node.focus_order.iter().copied().collect();
            if children.len() != node.children.len() {
                issues.push(format!("{id:?} lists a child more than once"));
            }
            if focus.len() != node.focus_order.len() {
                issues.push(format!("{id:?} lists a child more than once in its focus order"));
            }
            if children != focus {
                issues.push(format!(
                    "{id:?} children {:?} and focus order {:?} differ",
                    node.children, node.focus_order
                ));
            }
            for &child in &node.children {
                match self.map.get(child) {
                    None => issues.push(format!("{id:?} has dangling child {child:?}")),
                    Some(c) if c.parent != Some(id) => issues.push(format!(
                        "{child:?} is a child of {id:?} but points at {:?}",
                        c.parent
                    )),
                    Some(c) => {
                        if c.container.is_floating() && matches!(node.container, Container::Split { .. })
                        {
                            issues.push(format!("floating {child:?} is inside split {id:?}"));
                        }
                    }
                }
            }
            if let Some(parent) = node.parent {
                let listed = self
                    .map
                    .get(parent)
                    .map(|p| p.children.iter().filter(|&&c| c == id).count())
                    .unwrap_or(0);
                if listed != 1 {
                    issues.push(format!("{id:?} appears {listed} times under its parent {parent:?}"));
                }
            }
        }
        if issues.is_empty() { Ok(()) } else { Err(issues) }
    }

    /// Renders the attached tree, focus order included, for diagnostics.
    pub fn render(&self) -> String {
        fn build(tree: &ContainerTree, id: ContainerId) -> ascii_tree::Tree {
            let node = &tree.map[id];
            let mut label = format!("{} [{id:?}]", node.container);
            if node.focus_order.len() > 1 {
                let ranks: Vec<_> = node
                    .focus_order
                    .iter()
                    .map(|f| node.children.iter().position(|c| c == f).unwrap_or(usize::MAX))
                    .collect();
                let _ = write!(label, " focus={ranks:?}");
            }
            if node.children.is_empty() {
                ascii_tree::Tree::Leaf(vec![label])
            } else {
                ascii_tree::Tree::Node(label, node.children.iter().map(|&c| build(tree, c)).collect())
            }
        }
        let mut out = String::new();
        let _ = ascii_tree::write_tree(&mut out, &build(self, self.root));
        out
    }
}

impl Index<ContainerId> for ContainerTree {
    type Output = Container;

    #[track_caller]
    fn index(&self, index: ContainerId) -> &Self::Output { &self.map[index].container }
}

impl IndexMut<ContainerId> for ContainerTree {
    #[track_caller]
    fn index_mut(&mut self, index: ContainerId) -> &mut Self::Output {
        &mut self.map[index].container
    }
}

impl ContainerId {
    pub fn parent(self, tree: &ContainerTree) -> Option<ContainerId> {
        tree.map.get(self).and_then(|n| n.parent)
    }

    pub fn children(self, tree: &ContainerTree) -> impl DoubleEndedIterator<Item = ContainerId> + '_ {
        tree.map.get(self).map(|n| n.children.as_slice()).unwrap_or(&[]).iter().copied()
    }

    pub fn focus_order(self, tree: &ContainerTree) -> impl Iterator<Item = ContainerId> + '_ {
        tree.map.get(self).map(|n| n.focus_order.as_slice()).unwrap_or(&[]).iter().copied()
    }

    pub fn is_empty(self, tree: &ContainerTree) -> bool {
        tree.map.get(self).map(|n| n.children.is_empty()).unwrap_or(true)
    }

    /// Position within the parent's children.
    pub fn index(self, tree: &ContainerTree) -> Option<usize> {
        let parent = self.parent(tree)?;
        parent.children(tree).position(|c| c == self)
    }

    /// Position within the parent's focus order.
    pub fn focus_index(self, tree: &ContainerTree) -> Option<usize> {
        let parent = self.parent(tree)?;
        parent.focus_order(tree).position(|c| c == self)
    }

    /// Returns an iterator over all ancestors of the current node, including itself.
    pub fn ancestors(self, tree: &ContainerTree) -> impl Iterator<Item = ContainerId> + '_ {
        let mut next = Some(self).filter(|&id| tree.contains(id));
        std::iter::from_fn(move || {
            let node = next;
            next = node.and_then(|n| n.parent(tree));
            node
        })
    }

    pub fn traverse_preorder(self, tree: &ContainerTree) -> impl Iterator<Item = ContainerId> + '_ {
        PreorderTraversal {
            stack: if tree.contains(self) { vec![self] } else { vec![] },
            tree,
        }
    }

    pub fn has(self, tree: &ContainerTree, capability: Capabilities) -> bool {
        tree.get(self).is_some_and(|c| c.has(capability))
    }
}

struct PreorderTraversal<'a> {
    stack: Vec<ContainerId>,
    tree: &'a ContainerTree,
}

impl<'a> Iterator for PreorderTraversal<'a> {
    type Item = ContainerId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children(self.tree).rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::container::Orientation;
    use crate::sys::geometry::{Rect, Size};

    /// A tree with the following structure:
    /// ```text
    ///            root
    ///             |
    ///            ws
    ///          /    \
    ///      split     w3
    ///      /   \
    ///     w1   w2
    /// ```
    struct TestTree {
        tree: ContainerTree,
        ws: ContainerId,
        split: ContainerId,
        w1: ContainerId,
        w2: ContainerId,
        w3: ContainerId,
    }

    fn window(n: u64) -> Container { Container::tiling_window(WindowHandle(n), Size::new(100, 100)) }

    impl TestTree {
        fn new() -> Self {
            let mut tree = ContainerTree::new();
            let root = tree.root();
            let ws = tree.insert(Container::Workspace {
                name: "1".into(),
                frame: Rect::new(0, 0, 1000, 1000),
            });
            tree.attach_child(root, ws, None, false).unwrap();
            let split = tree.insert(Container::Split { orientation: Orientation::Horizontal });
            tree.attach_child(ws, split, None, false).unwrap();
            let w3 = tree.insert(window(3));
            tree.attach_child(ws, w3, None, false).unwrap();
            let w1 = tree.insert(window(1));
            tree.attach_child(split, w1, None, false).unwrap();
            let w2 = tree.insert(window(2));
            tree.attach_child(split, w2, None, false).unwrap();
            TestTree { tree, ws, split, w1, w2, w3 }
        }

        fn children(&self, id: ContainerId) -> Vec<ContainerId> { id.children(&self.tree).collect() }

        fn focus(&self, id: ContainerId) -> Vec<ContainerId> { id.focus_order(&self.tree).collect() }

        #[track_caller]
        fn assert_valid(&self) {
            if let Err(issues) = self.tree.validate() {
                panic!("tree invariants violated:\n{}", issues.join("\n"));
            }
        }
    }

    #[test]
    fn attach_appends_by_default() {
        let t = TestTree::new();
        assert_eq!([t.split, t.w3], *t.children(t.ws));
        assert_eq!([t.split, t.w3], *t.focus(t.ws));
        assert_eq!(Some(t.ws), t.split.parent(&t.tree));
        t.assert_valid();
    }

    #[test]
    fn attach_focused_goes_to_front_of_focus_only() {
        let mut t = TestTree::new();
        let w4 = t.tree.insert(window(4));
        t.tree.attach_child(t.split, w4, Some(1), true).unwrap();
        assert_eq!([t.w1, w4, t.w2], *t.children(t.split));
        assert_eq!([w4, t.w1, t.w2], *t.focus(t.split));
        t.assert_valid();
    }

    #[test]
    fn attach_clamps_index() {
        let mut t = TestTree::new();
        let w4 = t.tree.insert(window(4));
        t.tree.attach_child(t.split, w4, Some(99), false).unwrap();
        assert_eq!([t.w1, t.w2, w4], *t.children(t.split));
    }

    #[test]
    fn attach_rejects_attached_and_cyclic() {
        let mut t = TestTree::new();
        assert_eq!(
            Err(TreeError::AlreadyAttached { child: t.w1, parent: t.split }),
            t.tree.attach_child(t.ws, t.w1, None, false)
        );
        t.tree.detach_child(t.ws, t.split).unwrap();
        assert!(matches!(
            t.tree.attach_child(t.w1, t.split, None, false),
            Err(TreeError::InvalidTarget { .. })
        ));
        let root = t.tree.root();
        assert!(matches!(
            t.tree.attach_child(t.ws, root, None, false),
            Err(TreeError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn detach_removes_from_both_lists() {
        let mut t = TestTree::new();
        t.tree.detach_child(t.split, t.w1).unwrap();
        assert_eq!([t.w2], *t.children(t.split));
        assert_eq!([t.w2], *t.focus(t.split));
        assert_eq!(None, t.w1.parent(&t.tree));
        t.assert_valid();
    }

    #[test]
    fn detach_from_wrong_parent_is_not_found() {
        let mut t = TestTree::new();
        assert_eq!(
            Err(TreeError::NotFound { parent: Some(t.ws), child: t.w1 }),
            t.tree.detach_child(t.ws, t.w1)
        );
        assert_eq!([t.w1, t.w2], *t.children(t.split));
    }

    #[test]
    fn replace_keeps_layout_index_and_focus_rank() {
        let mut t = TestTree::new();
        t.tree.move_to_front_of_focus(t.split, t.w2).unwrap();
        let w4 = t.tree.insert(window(4));
        t.tree.replace_child(t.split, t.w1, w4).unwrap();
        assert_eq!([w4, t.w2], *t.children(t.split));
        assert_eq!([t.w2, w4], *t.focus(t.split));
        assert_eq!(None, t.w1.parent(&t.tree));
        t.assert_valid();
    }

    #[test]
    fn shift_focus_is_a_shift_not_a_swap() {
        let mut t = TestTree::new();
        let w4 = t.tree.insert(window(4));
        t.tree.attach_child(t.split, w4, None, false).unwrap();
        assert_eq!([t.w1, t.w2, w4], *t.focus(t.split));
        t.tree.shift_focus_to_index(t.split, w4, 0).unwrap();
        assert_eq!([w4, t.w1, t.w2], *t.focus(t.split));
        t.tree.shift_focus_to_index(t.split, w4, 5).unwrap();
        assert_eq!([t.w1, t.w2, w4], *t.focus(t.split));
        assert_eq!([t.w1, t.w2, w4], *t.children(t.split));
    }

    #[test]
    fn index_and_focus_index() {
        let mut t = TestTree::new();
        t.tree.move_to_front_of_focus(t.split, t.w2).unwrap();
        assert_eq!(Some(0), t.w1.index(&t.tree));
        assert_eq!(Some(1), t.w1.focus_index(&t.tree));
        assert_eq!(None, t.tree.root().index(&t.tree));
    }

    #[test]
    fn ancestors_include_self() {
        let t = TestTree::new();
        let ancestors: Vec<_> = t.w1.ancestors(&t.tree).collect();
        assert_eq!([t.w1, t.split, t.ws, t.tree.root()], *ancestors);
    }

    #[test]
    fn traverse_preorder_follows_layout_order() {
        let t = TestTree::new();
        let order: Vec<_> = t.ws.traverse_preorder(&t.tree).collect();
        assert_eq!([t.ws, t.split, t.w1, t.w2, t.w3], *order);
    }

    #[test]
    fn remove_frees_detached_subtree() {
        let mut t = TestTree::new();
        assert!(matches!(t.tree.remove(t.split), Err(TreeError::AlreadyAttached { .. })));
        t.tree.detach_child(t.ws, t.split).unwrap();
        let before = t.tree.len();
        assert!(matches!(t.tree.remove(t.split), Ok(Container::Split { .. })));
        assert_eq!(before - 3, t.tree.len());
        assert!(!t.tree.contains(t.w1));
        assert!(!t.tree.contains(t.w2));
        t.assert_valid();
    }

    #[test]
    fn find_window_by_handle() {
        let t = TestTree::new();
        assert_eq!(Some(t.w2), t.tree.find_window(WindowHandle(2)));
        assert_eq!(None, t.tree.find_window(WindowHandle(42)));
    }

    #[test]
    fn floating_windows_cannot_join_a_split() {
        let mut t = TestTree::new();
        let f = t.tree.insert(Container::floating_window(WindowHandle(9), Rect::default()));
        assert!(matches!(
            t.tree.attach_child(t.split, f, None, false),
            Err(TreeError::InvalidTarget { .. })
        ));
        assert!(matches!(
            t.tree.replace_child(t.split, t.w1, f),
            Err(TreeError::InvalidTarget { .. })
        ));
        assert_eq!([t.w1, t.w2], *t.children(t.split));
        assert_eq!(None, f.parent(&t.tree));

        t.tree.replace_child(t.ws, t.w3, f).unwrap();
        assert_eq!([t.split, f], *t.children(t.ws));
        t.assert_valid();
    }

    #[test]
    fn validate_reports_floating_inside_split() {
        let mut t = TestTree::new();
        let f = t.tree.insert(Container::floating_window(WindowHandle(9), Rect::default()));
        // Link it by hand; attach_child refuses this placement.
        let split = &mut t.tree.map[t.split];
        split.children.push(f);
        split.focus_order.push(f);
        t.tree.map[f].parent = Some(t.split);
        let issues = t.tree.validate().unwrap_err();
        assert_eq!(1, issues.len(), "{issues:?}");
    }

    #[test]
    fn render_lists_every_container() {
        let t = TestTree::new();
        let rendered = t.tree.render();
        for needle in ["root", "workspace 1", "split Horizontal", "tiling 0x1", "tiling 0x3"] {
            assert!(rendered.contains(needle), "{needle} missing from\n{rendered}");
        }
    }
}

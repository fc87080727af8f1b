//! Turns the container tree into window frames and pushes them to the OS.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::actor::reactor::{Event, Subscriber};
use crate::common::config::Settings;
use crate::model::{Container, ContainerId, ContainerTree, Orientation};
use crate::sys::geometry::Rect;
use crate::sys::window_server::{WindowHandle, WindowServer};

/// The workspace frame minus the outer gap on every side.
pub fn compute_tiling_area(screen: Rect, settings: &Settings) -> Rect {
    let gap = settings.outer_gap.max(0);
    let inset = gap.saturating_mul(2);
    Rect::new(
        screen.x.saturating_add(gap),
        screen.y.saturating_add(gap),
        screen.width.saturating_sub(inset).max(0),
        screen.height.saturating_sub(inset).max(0),
    )
}

/// Frames for every window under `workspace`.
///
/// Tiling children of a workspace or split share its area equally along its
/// orientation (workspaces lay out horizontally), separated by the inner gap.
/// Any rounding remainder goes to the last child. Floating windows keep their
/// own frame.
pub fn calculate_layout(
    tree: &ContainerTree,
    workspace: ContainerId,
    settings: &Settings,
) -> Vec<(WindowHandle, Rect)> {
    let mut frames = Vec::with_capacity(16);
    let Some(screen) = tree.get(workspace).and_then(Container::frame) else {
        return frames;
    };
    apply(
        tree,
        workspace,
        compute_tiling_area(screen, settings),
        settings.inner_gap.max(0),
        &mut frames,
    );
    frames
}

fn apply(
    tree: &ContainerTree,
    node: ContainerId,
    area: Rect,
    inner_gap: i32,
    frames: &mut Vec<(WindowHandle, Rect)>,
) {
    match &tree[node] {
        Container::TilingWindow { handle, .. } => {
            frames.push((*handle, area));
            return;
        }
        Container::FloatingWindow { handle, frame } => {
            frames.push((*handle, *frame));
            return;
        }
        _ => {}
    }

    let orientation = match &tree[node] {
        Container::Split { orientation } => *orientation,
        _ => Orientation::Horizontal,
    };
    let (floating, tiled): (Vec<_>, Vec<_>) =
        node.children(tree).partition(|&c| tree[c].is_floating());

    let n = tiled.len() as i32;
    if n > 0 {
        let extent = match orientation {
            Orientation::Horizontal => area.width,
            Orientation::Vertical => area.height,
        };
        let available = extent.saturating_sub(inner_gap.saturating_mul(n - 1)).max(0);
        let share = available / n;
        let mut offset = 0;
        for (i, &child) in tiled.iter().enumerate() {
            let length = if i as i32 == n - 1 { available - share * (n - 1) } else { share };
            let child_area = match orientation {
                Orientation::Horizontal => {
                    Rect::new(area.x.saturating_add(offset), area.y, length, area.height)
                }
                Orientation::Vertical => {
                    Rect::new(area.x, area.y.saturating_add(offset), area.width, length)
                }
            };
            apply(tree, child, child_area, inner_gap, frames);
            offset = offset.saturating_add(length).saturating_add(inner_gap);
        }
    }

    for child in floating {
        apply(tree, child, area, inner_gap, frames);
    }
}

/// Applies frames to every workspace when the tree asks for a redraw.
pub struct LayoutApplier {
    window_server: Arc<dyn WindowServer>,
    settings: Settings,
}

impl LayoutApplier {
    pub fn new(window_server: Arc<dyn WindowServer>, settings: Settings) -> Self {
        LayoutApplier { window_server, settings }
    }

    pub fn apply_all(&self, tree: &ContainerTree) {
        let workspaces =
            tree.root().traverse_preorder(tree).filter(|&id| tree[id].is_workspace());
        for workspace in workspaces {
            let frames = calculate_layout(tree, workspace, &self.settings);
            trace!(?workspace, windows = frames.len(), "applying layout");
            for (handle, frame) in frames {
                if let Err(err) = self.window_server.set_frame(handle, frame) {
                    warn!(?handle, %err, "failed to set window frame");
                }
            }
        }
    }
}

impl Subscriber for LayoutApplier {
    fn on_event(&mut self, tree: &ContainerTree, event: &Event) {
        if let Event::RedrawContainers = event {
            debug!("redraw");
            self.apply_all(tree);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sys::geometry::Size;
    use crate::sys::window_server::HeadlessWindowServer;

    fn tiling(n: u64) -> Container { Container::tiling_window(WindowHandle(n), Size::new(1, 1)) }

    /// ws(0,0 1000x600) -> [w1, split(vertical) -> [w2, w3], float f4]
    fn tree() -> (ContainerTree, ContainerId) {
        let mut tree = ContainerTree::new();
        let root = tree.root();
        let ws = tree.insert(Container::Workspace {
            name: "1".into(),
            frame: Rect::new(0, 0, 1000, 600),
        });
        tree.attach_child(root, ws, None, true).unwrap();
        let w1 = tree.insert(tiling(1));
        let split = tree.insert(Container::Split { orientation: Orientation::Vertical });
        let f4 = tree.insert(Container::floating_window(WindowHandle(4), Rect::new(5, 5, 50, 50)));
        for c in [w1, split, f4] {
            tree.attach_child(ws, c, None, false).unwrap();
        }
        for n in [2, 3] {
            let w = tree.insert(tiling(n));
            tree.attach_child(split, w, None, false).unwrap();
        }
        (tree, ws)
    }

    #[test]
    fn splits_share_space_and_floats_keep_frames() {
        let (tree, ws) = tree();
        let frames = calculate_layout(&tree, ws, &Settings::default());
        assert_eq!(
            vec![
                (WindowHandle(1), Rect::new(0, 0, 500, 600)),
                (WindowHandle(2), Rect::new(500, 0, 500, 300)),
                (WindowHandle(3), Rect::new(500, 300, 500, 300)),
                (WindowHandle(4), Rect::new(5, 5, 50, 50)),
            ],
            frames
        );
    }

    #[test]
    fn gaps_are_subtracted() {
        let (tree, ws) = tree();
        let settings = Settings { outer_gap: 10, inner_gap: 5 };
        let frames = calculate_layout(&tree, ws, &settings);
        // Tiling area is 980x580; two columns with a 5px gap: 487 + 5 + 488.
        assert_eq!(Rect::new(10, 10, 487, 580), frames[0].1);
        assert_eq!(Rect::new(502, 10, 488, 287), frames[1].1);
        assert_eq!(Rect::new(502, 302, 488, 288), frames[2].1);
    }

    #[test]
    fn oversized_gaps_collapse_tiles_instead_of_overflowing() {
        let (tree, ws) = tree();
        let settings = Settings { outer_gap: i32::MAX, inner_gap: i32::MAX };
        let frames = calculate_layout(&tree, ws, &settings);
        assert_eq!(4, frames.len());
        for (handle, frame) in &frames[..3] {
            assert_eq!(0, frame.width.min(frame.height), "{handle:?} {frame:?}");
        }

        let area = compute_tiling_area(Rect::new(i32::MAX - 10, 0, 100, 100), &settings);
        assert_eq!(Rect::new(i32::MAX, i32::MAX, 0, 0), area);
    }

    #[test]
    fn applier_pushes_frames_on_redraw_only() {
        let (tree, _) = tree();
        let server = Arc::new(HeadlessWindowServer::new());
        for n in 1..=4 {
            server.insert(WindowHandle(n), Rect::default());
        }
        let mut applier = LayoutApplier::new(server.clone(), Settings::default());

        applier.on_event(&tree, &Event::FocusChanged { container: tree.root() });
        assert_eq!(Rect::default(), server.frame(WindowHandle(1)).unwrap());

        applier.on_event(&tree, &Event::RedrawContainers);
        assert_eq!(Rect::new(0, 0, 500, 600), server.frame(WindowHandle(1)).unwrap());
        assert_eq!(Rect::new(5, 5, 50, 50), server.frame(WindowHandle(4)).unwrap());
    }
}

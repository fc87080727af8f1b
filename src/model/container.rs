use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::sys::geometry::{Rect, Size};
use crate::sys::window_server::WindowHandle;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Participates in tiling and can be resized by the layout.
        const RESIZABLE = 0b001;
        /// Can hold tiling children.
        const LAYOUT = 0b010;
        const FLOATING = 0b100;
    }
}

/// The payload of a node in the container tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Container {
    Root,
    Monitor {
        name: String,
        frame: Rect,
        primary: bool,
    },
    Workspace {
        name: String,
        frame: Rect,
    },
    Split {
        orientation: Orientation,
    },
    TilingWindow {
        handle: WindowHandle,
        /// Size the window had when it was last tiled; reused when it floats.
        tiled_size: Size,
    },
    FloatingWindow {
        handle: WindowHandle,
        frame: Rect,
    },
}

impl Container {
    pub fn tiling_window(handle: WindowHandle, tiled_size: Size) -> Self {
        Container::TilingWindow { handle, tiled_size }
    }

    pub fn floating_window(handle: WindowHandle, frame: Rect) -> Self {
        Container::FloatingWindow { handle, frame }
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            Container::Root | Container::Monitor { .. } => Capabilities::empty(),
            Container::Workspace { .. } => Capabilities::LAYOUT,
            Container::Split { .. } => Capabilities::LAYOUT | Capabilities::RESIZABLE,
            Container::TilingWindow { .. } => Capabilities::RESIZABLE,
            Container::FloatingWindow { .. } => Capabilities::FLOATING,
        }
    }

    pub fn has(&self, capability: Capabilities) -> bool { self.capabilities().contains(capability) }

    pub fn is_workspace(&self) -> bool { matches!(self, Container::Workspace { .. }) }

    pub fn is_window(&self) -> bool { self.window_handle().is_some() }

    pub fn is_floating(&self) -> bool { matches!(self, Container::FloatingWindow { .. }) }

    pub fn window_handle(&self) -> Option<WindowHandle> {
        match self {
            Container::TilingWindow { handle, .. } | Container::FloatingWindow { handle, .. } => {
                Some(*handle)
            }
            _ => None,
        }
    }

    /// Screen frame for containers that carry one directly.
    pub fn frame(&self) -> Option<Rect> {
        match self {
            Container::Monitor { frame, .. }
            | Container::Workspace { frame, .. }
            | Container::FloatingWindow { frame, .. } => Some(*frame),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Container::Root => "root",
            Container::Monitor { .. } => "monitor",
            Container::Workspace { .. } => "workspace",
            Container::Split { .. } => "split",
            Container::TilingWindow { .. } => "tiling_window",
            Container::FloatingWindow { .. } => "floating_window",
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Container::Root => write!(f, "root"),
            Container::Monitor { name, primary, .. } => {
                write!(f, "monitor {name}{}", if *primary { " (primary)" } else { "" })
            }
            Container::Workspace { name, .. } => write!(f, "workspace {name}"),
            Container::Split { orientation } => write!(f, "split {orientation:?}"),
            Container::TilingWindow { handle, tiled_size } => {
                write!(f, "tiling {handle} {}x{}", tiled_size.width, tiled_size.height)
            }
            Container::FloatingWindow { handle, frame } => write!(
                f,
                "floating {handle} {}x{} @ {},{}",
                frame.width, frame.height, frame.x, frame.y
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_by_variant() {
        let split = Container::Split { orientation: Orientation::Horizontal };
        assert!(split.has(Capabilities::RESIZABLE | Capabilities::LAYOUT));

        let tiling = Container::tiling_window(WindowHandle(1), Size::new(10, 10));
        assert!(tiling.has(Capabilities::RESIZABLE));
        assert!(!tiling.has(Capabilities::LAYOUT));

        let floating = Container::floating_window(WindowHandle(1), Rect::default());
        assert!(!floating.has(Capabilities::RESIZABLE));
        assert!(floating.is_floating());

        let ws = Container::Workspace { name: "1".into(), frame: Rect::default() };
        assert!(ws.has(Capabilities::LAYOUT));
        assert!(!ws.has(Capabilities::RESIZABLE));
        assert!(Container::Root.capabilities().is_empty());
    }

    #[test]
    fn window_handle_only_on_windows() {
        assert_eq!(
            Some(WindowHandle(7)),
            Container::tiling_window(WindowHandle(7), Size::default()).window_handle()
        );
        assert_eq!(None, Container::Split { orientation: Orientation::Vertical }.window_handle());
    }
}

//! The boundary to the OS window system.
//!
//! The window manager core never enumerates or positions windows itself. It
//! receives a snapshot of [`MonitorInfo`] and [`WindowInfo`] to seed its tree,
//! and talks to live windows only through the [`WindowServer`] trait.

use std::fmt;

use anyhow::anyhow;
use bitflags::bitflags;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::geometry::Rect;
use crate::common::collections::HashMap;

/// Opaque OS handle of a top-level window.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(pub u64);

impl WindowHandle {
    #[inline]
    pub fn new(raw: u64) -> Self { Self(raw) }
}

impl fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "hwnd:{:#x}", self.0) }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:#x}", self.0) }
}

bitflags! {
    /// What the OS reports a window can do.
    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowCapabilities: u8 {
        const RESIZABLE = 0b01;
        const MOVABLE = 0b10;
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WindowInfo {
    pub handle: WindowHandle,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub process: String,
    pub frame: Rect,
    #[serde(default = "default_capabilities")]
    pub capabilities: WindowCapabilities,
}

fn default_capabilities() -> WindowCapabilities { WindowCapabilities::all() }

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MonitorInfo {
    pub name: String,
    pub frame: Rect,
    #[serde(default)]
    pub primary: bool,
}

/// A point-in-time view of the OS: monitors and managed top-level windows.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub monitors: Vec<MonitorInfo>,
    #[serde(default)]
    pub windows: Vec<WindowInfo>,
}

pub trait WindowServer {
    /// Current restored ("normal") frame of the window.
    fn frame(&self, handle: WindowHandle) -> anyhow::Result<Rect>;

    fn set_frame(&self, handle: WindowHandle, frame: Rect) -> anyhow::Result<()>;
}

/// In-memory window server. Frames written with `set_frame` are what later
/// calls to `frame` return.
#[derive(Default)]
pub struct HeadlessWindowServer {
    frames: Mutex<HashMap<WindowHandle, Rect>>,
}

impl HeadlessWindowServer {
    pub fn new() -> Self { Self::default() }

    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let this = Self::new();
        {
            let mut frames = this.frames.lock();
            for window in &snapshot.windows {
                frames.insert(window.handle, window.frame);
            }
        }
        this
    }

    pub fn insert(&self, handle: WindowHandle, frame: Rect) { self.frames.lock().insert(handle, frame); }

    pub fn frames(&self) -> Vec<(WindowHandle, Rect)> {
        let mut frames: Vec<_> = self.frames.lock().iter().map(|(h, r)| (*h, *r)).collect();
        frames.sort_by_key(|(h, _)| *h);
        frames
    }
}

impl WindowServer for HeadlessWindowServer {
    fn frame(&self, handle: WindowHandle) -> anyhow::Result<Rect> {
        self.frames
            .lock()
            .get(&handle)
            .copied()
            .ok_or_else(|| anyhow!("no such window: {handle:?}"))
    }

    fn set_frame(&self, handle: WindowHandle, frame: Rect) -> anyhow::Result<()> {
        trace!(?handle, ?frame, "set_frame");
        let mut frames = self.frames.lock();
        let Some(slot) = frames.get_mut(&handle) else {
            return Err(anyhow!("no such window: {handle:?}"));
        };
        *slot = frame;
        Ok(())
    }
}

impl<T: WindowServer + ?Sized> WindowServer for std::sync::Arc<T> {
    fn frame(&self, handle: WindowHandle) -> anyhow::Result<Rect> { (**self).frame(handle) }

    fn set_frame(&self, handle: WindowHandle, frame: Rect) -> anyhow::Result<()> {
        (**self).set_frame(handle, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_deserializes_with_defaults() {
        let snapshot: Snapshot = serde_json::from_str(
            r#"{
                "monitors": [{"name": "DISPLAY1", "frame": {"x": 0, "y": 0, "width": 1920, "height": 1080}}],
                "windows": [{"handle": 17, "frame": {"x": 0, "y": 0, "width": 800, "height": 600}}]
            }"#,
        )
        .unwrap();
        assert_eq!(1, snapshot.monitors.len());
        assert!(!snapshot.monitors[0].primary);
        assert_eq!(WindowHandle(17), snapshot.windows[0].handle);
        assert_eq!(WindowCapabilities::all(), snapshot.windows[0].capabilities);
    }

    #[test]
    fn headless_server_round_trips_frames() {
        let server = HeadlessWindowServer::new();
        let h = WindowHandle(1);
        assert!(server.frame(h).is_err());
        assert!(server.set_frame(h, Rect::new(0, 0, 1, 1)).is_err());

        server.insert(h, Rect::new(0, 0, 10, 10));
        server.set_frame(h, Rect::new(5, 5, 20, 20)).unwrap();
        assert_eq!(Rect::new(5, 5, 20, 20), server.frame(h).unwrap());
    }
}

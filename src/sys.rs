pub mod geometry;
pub mod hotkey;
pub mod midi;
pub mod window_server;

pub mod container;
pub mod error;
pub mod query;
pub mod tree;

pub use container::{Capabilities, Container, Orientation};
pub use error::TreeError;
pub use tree::{ContainerId, ContainerTree};

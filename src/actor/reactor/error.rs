use thiserror::Error;

use crate::model::{ContainerId, TreeError};

#[derive(Debug, Error)]
pub enum ReactorError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("Window server request failed: {0}")]
    WindowServer(anyhow::Error),
    #[error("Container {container:?} is not a {expected}")]
    NotAWindow {
        container: ContainerId,
        expected: &'static str,
    },
}

use thiserror::Error;

use super::tree::ContainerId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Container {child:?} not found under {parent:?}")]
    NotFound {
        parent: Option<ContainerId>,
        child: ContainerId,
    },
    #[error("Container {0:?} is not attached to a workspace")]
    Detached(ContainerId),
    #[error("Invalid relocation target {target:?}: {reason}")]
    InvalidTarget {
        target: ContainerId,
        reason: &'static str,
    },
    #[error("Containers {0:?} and {1:?} are not in the same tree")]
    NoRelation(ContainerId, ContainerId),
    #[error("Container {child:?} is already attached to {parent:?}")]
    AlreadyAttached {
        child: ContainerId,
        parent: ContainerId,
    },
}

impl TreeError {
    pub(crate) fn missing(child: ContainerId) -> Self { TreeError::NotFound { parent: None, child } }
}

//! Core shared errors (renderer-agnostic).

use thiserror::Error;

use crate::skeleton::BoneId;

/// Problems found while building a bone hierarchy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SkeletonError {
    #[error("bone {bone} ('{name}') references unknown parent {parent}")]
    UnknownParent {
        bone: BoneId,
        name: String,
        parent: BoneId,
    },

    #[error("bone {bone} ('{name}') is its own ancestor")]
    Cycle { bone: BoneId, name: String },
}

pub type SkeletonResult<T> = Result<T, SkeletonError>;

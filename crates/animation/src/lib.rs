//! Skeletal animation baking.
//!
//! [`bake`] turns a model's bone hierarchy and an [`Animation`] into a
//! [`BoneMatrixTable`]: one skinning matrix per (frame, bone). Baking is pure
//! and never touches the filesystem.

pub mod bake;
pub mod compositor;
pub mod pose;
pub mod skinning;

pub use bake::{BoneMatrixTable, BoneUniform, bake, bake_skeleton};
pub use compositor::{DegenerateTransform, combine, compose, compose_recovering};
pub use pose::{Animation, FramePose};
pub use skinning::{skin_model, skin_vertices};

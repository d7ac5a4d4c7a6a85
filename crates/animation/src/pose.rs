//! Frame poses and animations.

use std::collections::BTreeMap;

use corelib::{BoneId, Skeleton, Transform};

/// Target transforms for the bones keyed in one animation frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FramePose {
    transforms: BTreeMap<BoneId, Transform>,
}

impl FramePose {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pose keyed by position: `transforms[i]` targets bone `i`.
    pub fn from_dense(transforms: impl IntoIterator<Item = Transform>) -> Self {
        Self {
            transforms: transforms.into_iter().enumerate().collect(),
        }
    }

    pub fn with(mut self, bone: BoneId, transform: Transform) -> Self {
        self.insert(bone, transform);
        self
    }

    pub fn insert(&mut self, bone: BoneId, transform: Transform) -> Option<Transform> {
        self.transforms.insert(bone, transform)
    }

    pub fn get(&self, bone: BoneId) -> Option<&Transform> {
        self.transforms.get(&bone)
    }

    pub fn bones(&self) -> impl Iterator<Item = BoneId> + '_ {
        self.transforms.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

/// Ordered sequence of frame poses.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Animation {
    pub name: String,
    frames: Vec<FramePose>,
}

impl Animation {
    pub fn new(name: impl Into<String>, frames: Vec<FramePose>) -> Self {
        Self {
            name: name.into(),
            frames,
        }
    }

    /// Builds an animation from per-frame, bone-ordered transforms.
    pub fn from_dense(name: impl Into<String>, frames: Vec<Vec<Transform>>) -> Self {
        Self::new(name, frames.into_iter().map(FramePose::from_dense).collect())
    }

    pub fn push_frame(&mut self, pose: FramePose) {
        self.frames.push(pose);
    }

    pub fn frames(&self) -> &[FramePose] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&FramePose> {
        self.frames.get(index)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// `true` when every keyed bone exists in `skeleton`.
    pub fn is_compatible(&self, skeleton: &Skeleton) -> bool {
        self.frames
            .iter()
            .flat_map(|pose| pose.bones())
            .all(|bone| bone < skeleton.len())
    }
}

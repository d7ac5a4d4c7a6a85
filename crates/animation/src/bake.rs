//! Per-frame bone matrix baking.

use asset::Model;
use bytemuck::{Pod, Zeroable};
use corelib::{BoneId, Mat4, Skeleton};

use crate::compositor::{combine, compose_recovering};
use crate::pose::Animation;

/// Skinning matrix laid out for a uniform or storage buffer (16-byte aligned).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct BoneUniform {
    pub matrix: [[f32; 4]; 4],
}

impl From<Mat4> for BoneUniform {
    fn from(matrix: Mat4) -> Self {
        Self {
            matrix: matrix.to_cols_array_2d(),
        }
    }
}

/// World-space skinning matrix for every (frame, bone) pair of one bake.
/// Rebuilt by [`bake`], never edited in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoneMatrixTable {
    bone_count: usize,
    frame_count: usize,
    /// Frame-major: all bones of frame 0, then frame 1, ...
    matrices: Vec<Mat4>,
}

impl BoneMatrixTable {
    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count == 0
    }

    pub fn get(&self, frame: usize, bone: BoneId) -> Option<Mat4> {
        if bone >= self.bone_count {
            return None;
        }
        self.frame(frame).map(|m| m[bone])
    }

    /// All bone matrices of one frame, indexed by bone id.
    pub fn frame(&self, frame: usize) -> Option<&[Mat4]> {
        if frame >= self.frame_count {
            return None;
        }
        let start = frame * self.bone_count;
        Some(&self.matrices[start..start + self.bone_count])
    }

    /// Like [`frame`](Self::frame), wrapping past the last frame to loop.
    pub fn frame_wrapped(&self, frame: usize) -> Option<&[Mat4]> {
        if self.frame_count == 0 {
            return None;
        }
        self.frame(frame % self.frame_count)
    }

    /// One frame as GPU-ready values; `bytemuck::cast_slice` gives the bytes.
    pub fn frame_uniforms(&self, frame: usize) -> Option<Vec<BoneUniform>> {
        self.frame(frame)
            .map(|m| m.iter().copied().map(BoneUniform::from).collect())
    }
}

/// Bake `animation` against the model's bone hierarchy.
pub fn bake(model: &Model, animation: &Animation) -> BoneMatrixTable {
    bake_skeleton(model.skeleton(), animation)
}

/// Bake `animation` against `skeleton`.
///
/// Each bone's local matrix is its target pose relative to its bind pose; a
/// bone missing from a frame keeps its bind pose (identity local matrix).
/// World matrices are accumulated parent-first: `world = parent_world * local`.
pub fn bake_skeleton(skeleton: &Skeleton, animation: &Animation) -> BoneMatrixTable {
    bake_observed(skeleton, animation, &mut ())
}

/// Hook for watching slot access order during a bake.
pub(crate) trait SlotObserver {
    fn read(&mut self, _frame: usize, _bone: BoneId) {}
    fn write(&mut self, _frame: usize, _bone: BoneId) {}
}

impl SlotObserver for () {}

pub(crate) fn bake_observed(
    skeleton: &Skeleton,
    animation: &Animation,
    observer: &mut impl SlotObserver,
) -> BoneMatrixTable {
    let bone_count = skeleton.len();
    let frame_count = animation.frame_count();

    if !animation.is_compatible(skeleton) {
        log::debug!(
            "Animation '{}' keys bones outside the {}-bone skeleton; ignoring them",
            animation.name,
            bone_count
        );
    }

    let bind: Vec<Mat4> = skeleton
        .bones()
        .iter()
        .enumerate()
        .map(|(id, bone)| compose_recovering(id, &bone.name, &bone.bind))
        .collect();

    let mut matrices = Vec::with_capacity(bone_count * frame_count);
    let mut world = vec![Mat4::IDENTITY; bone_count];

    for (frame, pose) in animation.frames().iter().enumerate() {
        for &id in skeleton.order() {
            let bone = &skeleton.bones()[id];
            let local = match pose.get(id) {
                Some(target) => {
                    let target = compose_recovering(id, &bone.name, target);
                    combine(bind[id], target)
                }
                None => Mat4::IDENTITY,
            };

            let world_matrix = match bone.parent {
                Some(parent) => {
                    observer.read(frame, parent);
                    let parent_world = world[parent];
                    parent_world * local
                }
                None => local,
            };
            observer.write(frame, id);
            world[id] = world_matrix;
        }
        matrices.extend_from_slice(&world);
    }

    log::debug!(
        "Baked '{}': {} frames x {} bones",
        animation.name,
        frame_count,
        bone_count
    );

    BoneMatrixTable {
        bone_count,
        frame_count,
        matrices,
    }
}

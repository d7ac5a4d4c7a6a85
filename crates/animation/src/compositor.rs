//! Bone transform composition.
//!
//! Matrices follow glam's column-vector convention: `A * B` applies `B`
//! first. A local bone matrix is `T * R * S`, i.e. a point is scaled, then
//! rotated, then translated.

use corelib::{BoneId, Mat4, Quat, Transform};
use thiserror::Error;

/// Determinant magnitude below which a bind matrix is treated as singular.
const MIN_BIND_DETERMINANT: f32 = 1e-12;

/// A transform whose rotation cannot be normalized (zero-length or not
/// finite). `recovered` is the same transform with the identity rotation.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
#[error("degenerate rotation {rotation:?}, substituting identity rotation")]
pub struct DegenerateTransform {
    pub rotation: Quat,
    pub recovered: Mat4,
}

/// Compose `T * R * S` from a pose triplet. Non-unit rotations are
/// normalized first.
pub fn compose(transform: &Transform) -> Result<Mat4, DegenerateTransform> {
    let scale = transform.scale_matrix();
    let translation = transform.translation_matrix();

    match transform.unit_rotation() {
        Some(unit) => {
            let rotation = Mat4::from_quat(unit);
            Ok(scale_rotate_translate(scale, rotation, translation))
        }
        None => {
            let rotation = Mat4::IDENTITY;
            Err(DegenerateTransform {
                rotation: transform.rotation,
                recovered: scale_rotate_translate(scale, rotation, translation),
            })
        }
    }
}

fn scale_rotate_translate(scale: Mat4, rotation: Mat4, translation: Mat4) -> Mat4 {
    let rotated = rotation * scale;
    translation * rotated
}

/// [`compose`], logging a degenerate transform and using its recovered matrix.
pub fn compose_recovering(bone: BoneId, name: &str, transform: &Transform) -> Mat4 {
    compose(transform).unwrap_or_else(|e| {
        log::warn!("Bone {bone} ('{name}'): {e}");
        e.recovered
    })
}

/// Bind-relative skinning matrix: undo the bind pose, then apply the target.
/// A singular bind matrix is treated as identity.
pub fn combine(bind: Mat4, target: Mat4) -> Mat4 {
    let determinant = bind.determinant();
    if !determinant.is_finite() || determinant.abs() < MIN_BIND_DETERMINANT {
        log::warn!("Singular bind matrix (det={determinant}); skipping bind inverse");
        return target;
    }
    let inverse_bind = bind.inverse();
    target * inverse_bind
}

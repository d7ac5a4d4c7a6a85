//! Core types: math re-exports, bone transforms, skeleton hierarchy.

pub use glam::{Mat4, Quat, Vec3, Vec4, vec3};

pub mod error;
pub mod skeleton;
pub mod transform;

pub use error::{SkeletonError, SkeletonResult};
pub use skeleton::{Bone, BoneId, Skeleton};
pub use transform::Transform;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_transform_parts_are_identity() {
        let t = transform::Transform::identity();
        assert_eq!(t.scale_matrix(), Mat4::IDENTITY);
        assert_eq!(t.translation_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translate_and_scale_parts() {
        let t = transform::Transform::from_srt(
            vec3(2.0, 2.0, 2.0),
            Quat::IDENTITY,
            vec3(1.0, 2.0, 3.0),
        );
        // Last column = translation, diagonal = scale.
        let tm = t.translation_matrix().to_cols_array();
        assert!((tm[12] - 1.0).abs() < 1e-6);
        assert!((tm[13] - 2.0).abs() < 1e-6);
        assert!((tm[14] - 3.0).abs() < 1e-6);
        let sm = t.scale_matrix().to_cols_array();
        assert!((sm[0] - 2.0).abs() < 1e-6);
        assert!((sm[5] - 2.0).abs() < 1e-6);
        assert!((sm[10] - 2.0).abs() < 1e-6);
    }
}

use crate::{Mat4, Quat, Vec3};

/// Squared quaternion length below which a rotation cannot be normalized.
const MIN_ROTATION_LENGTH_SQUARED: f32 = 1e-12;

/// Bone pose triplet: non-uniform scale, quaternion rotation, translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub scale: Vec3,
    /// Not required to be unit length; see [`Transform::unit_rotation`].
    pub rotation: Quat,
    pub translation: Vec3,
}

impl Transform {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            scale: Vec3::ONE,
            rotation: Quat::IDENTITY,
            translation: Vec3::ZERO,
        }
    }

    #[inline]
    pub fn from_srt(scale: Vec3, rotation: Quat, translation: Vec3) -> Self {
        Self {
            scale,
            rotation,
            translation,
        }
    }

    #[inline]
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::identity()
        }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    #[inline]
    pub fn scale_matrix(&self) -> Mat4 {
        Mat4::from_scale(self.scale)
    }

    #[inline]
    pub fn translation_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation)
    }

    /// Rotation normalized to unit length, or `None` when the quaternion is
    /// zero-length or not finite.
    pub fn unit_rotation(&self) -> Option<Quat> {
        let q = self.rotation;
        if !q.is_finite() {
            return None;
        }
        let len_sq = q.length_squared();
        if len_sq < MIN_ROTATION_LENGTH_SQUARED {
            return None;
        }
        Some(q / len_sq.sqrt())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_rotation_normalizes() {
        let t = Transform::from_rotation(Quat::from_xyzw(0.0, 2.0, 0.0, 0.0));
        let q = t.unit_rotation().expect("non-zero quaternion");
        assert!(q.is_normalized());
        assert!(q.abs_diff_eq(Quat::from_xyzw(0.0, 1.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn nearly_unit_rotation_is_still_normalized() {
        // Squared length 1.0001 passes glam's `is_normalized` tolerance.
        let q = Quat::from_xyzw(0.0, 0.0, 0.0, 1.0001_f32.sqrt());
        assert!(q.is_normalized());
        let unit = Transform::from_rotation(q).unit_rotation().unwrap();
        assert!((unit.length() - 1.0).abs() < 1e-6, "{unit:?}");
        assert!(unit.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn unit_rotation_rejects_zero_and_nan() {
        let zero = Transform::from_rotation(Quat::from_xyzw(0.0, 0.0, 0.0, 0.0));
        assert_eq!(zero.unit_rotation(), None);
        let nan = Transform::from_rotation(Quat::from_xyzw(f32::NAN, 0.0, 0.0, 1.0));
        assert_eq!(nan.unit_rotation(), None);
    }
}

//! Voxel-space to scanner-space transform.

use nalgebra::{Matrix3, Point3, Vector3};

/// Affine map from voxel space (index × voxel size, in mm) to scanner space.
///
/// The rotation part holds the direction cosines of the volume axes and may
/// embed axis flips, so it is kept as a general 3×3 matrix rather than a
/// unit quaternion. The translation is the scanner-space position of the
/// voxel at index `(0, 0, 0)`.
///
/// # Example
///
/// ```
/// use volume_grid::VolumeTransform;
/// use nalgebra::{Matrix3, Point3, Vector3};
///
/// let transform = VolumeTransform::new(
///     Matrix3::identity(),
///     Vector3::new(-90.0, -126.0, -72.0),
/// );
/// let p = transform.apply(&Point3::new(1.0, 2.0, 3.0));
/// assert_eq!(p, Point3::new(-89.0, -124.0, -69.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VolumeTransform {
    /// Direction cosines of the volume axes.
    pub rotation: Matrix3<f64>,
    /// Scanner-space position of the first voxel.
    pub translation: Vector3<f64>,
}

impl Default for VolumeTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl VolumeTransform {
    /// Creates a transform from direction cosines and a translation.
    #[must_use]
    pub const fn new(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Creates the identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Creates a transform with only a translation.
    #[must_use]
    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation,
        }
    }

    /// Maps a voxel-space position (mm) to scanner space.
    #[must_use]
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * point.coords + self.translation)
    }

    /// Re-expresses a direction vector in scanner space.
    ///
    /// Directions rotate but do not translate, so this is the right map for
    /// gradients and other per-voxel vectors.
    #[must_use]
    pub fn rotate(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * vector
    }

    /// Returns true if this transform is approximately the identity.
    #[must_use]
    pub fn is_identity(&self, epsilon: f64) -> bool {
        (self.rotation - Matrix3::identity()).norm() < epsilon
            && self.translation.norm() < epsilon
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_apply() {
        let transform = VolumeTransform::identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_relative_eq!(transform.apply(&p), p, epsilon = 1e-12);
        assert!(transform.is_identity(1e-12));
    }

    #[test]
    fn test_translation_moves_points_not_vectors() {
        let transform = VolumeTransform::from_translation(Vector3::new(5.0, -3.0, 1.0));
        let p = transform.apply(&Point3::origin());
        assert_relative_eq!(p, Point3::new(5.0, -3.0, 1.0), epsilon = 1e-12);

        let v = transform.rotate(&Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(v, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_with_flip() {
        // Radiological-style flip of the first axis.
        let rotation = Matrix3::new(
            -1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0,
        );
        let transform = VolumeTransform::new(rotation, Vector3::zeros());
        let v = transform.rotate(&Vector3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(v, Vector3::new(-2.0, 0.0, 0.0), epsilon = 1e-12);
        assert!(!transform.is_identity(1e-6));
    }

    #[test]
    fn test_quarter_turn() {
        let angle = std::f64::consts::FRAC_PI_2;
        let rotation = Matrix3::new(
            angle.cos(),
            -angle.sin(),
            0.0,
            angle.sin(),
            angle.cos(),
            0.0,
            0.0,
            0.0,
            1.0,
        );
        let transform = VolumeTransform::new(rotation, Vector3::zeros());
        let v = transform.rotate(&Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(v, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }
}

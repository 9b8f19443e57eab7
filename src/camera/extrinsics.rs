use nalgebra::{Isometry3, Matrix3, Rotation3, Translation3, UnitQuaternion, Vector3};

/// Rigid transform between two camera frames.
///
/// Stored under `(from, to)`, it maps a point expressed in the `from` camera's frame
/// into the `to` camera's frame.
pub type Extrinsics = Isometry3<f32>;

/// Builds a transform from a row-major rotation and a translation in meters.
pub fn extrinsics_from_rows(rotation: &[[f32; 3]; 3], translation: &[f32; 3]) -> Extrinsics {
    let matrix = Matrix3::from_fn(|row, col| rotation[row][col]);
    from_parts(matrix, translation)
}

/// Builds a transform from a column-major rotation, the layout vendor SDKs report.
pub fn extrinsics_from_column_major(rotation: &[f32; 9], translation: &[f32; 3]) -> Extrinsics {
    let matrix = Matrix3::from_column_slice(rotation);
    from_parts(matrix, translation)
}

/// Splits a transform into a column-major rotation and a translation.
pub fn extrinsics_to_column_major(extrinsics: &Extrinsics) -> ([f32; 9], [f32; 3]) {
    let matrix = extrinsics.rotation.to_rotation_matrix().into_inner();
    let mut rotation = [0.0; 9];
    rotation.copy_from_slice(matrix.as_slice());
    let t = extrinsics.translation.vector;
    (rotation, [t.x, t.y, t.z])
}

fn from_parts(matrix: Matrix3<f32>, translation: &[f32; 3]) -> Extrinsics {
    let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(matrix));
    Isometry3::from_parts(
        Translation3::from(Vector3::from_column_slice(translation)),
        rotation,
    )
}

use std::fmt;

use nalgebra::{Matrix3, Point2, Point3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Lens distortion applied around the ideal pinhole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistortionModel {
    #[default]
    None,
    /// Forward radial-tangential distortion; applied on projection only.
    ModifiedBrownConrady,
    /// Radial-tangential undistortion in closed form; applied on back-projection only.
    InverseBrownConrady,
    /// Fisheye, F-theta; applied on projection only.
    FTheta,
    /// Unparameterized placeholder; treated as an ideal pinhole.
    BrownConrady,
}

impl DistortionModel {
    pub fn name(self) -> &'static str {
        match self {
            DistortionModel::None => "NONE",
            DistortionModel::ModifiedBrownConrady => "MODIFIED_BROWN_CONRADY",
            DistortionModel::InverseBrownConrady => "INVERSE_BROWN_CONRADY",
            DistortionModel::FTheta => "FTHETA",
            DistortionModel::BrownConrady => "BROWN_CONRADY",
        }
    }
}

impl fmt::Display for DistortionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pinhole intrinsics of one stream with an optional distortion model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraModel {
    width: u32,
    height: u32,
    fx: f32,
    fy: f32,
    ppx: f32,
    ppy: f32,
    #[serde(default)]
    model: DistortionModel,
    #[serde(default)]
    coeffs: [f32; 5],
}

impl CameraModel {
    /// Ideal pinhole, no distortion.
    pub fn new(width: u32, height: u32, fx: f32, fy: f32, ppx: f32, ppy: f32) -> Self {
        Self::with_distortion(width, height, fx, fy, ppx, ppy, DistortionModel::None, [0.0; 5])
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_distortion(
        width: u32,
        height: u32,
        fx: f32,
        fy: f32,
        ppx: f32,
        ppy: f32,
        model: DistortionModel,
        coeffs: [f32; 5],
    ) -> Self {
        Self {
            width,
            height,
            fx,
            fy,
            ppx,
            ppy,
            model,
            coeffs,
        }
    }

    /// Takes fx = K(0,0), fy = K(1,1), ppx = K(0,2), ppy = K(1,2).
    pub fn from_matrix(width: u32, height: u32, k: &Matrix3<f32>) -> Self {
        Self::new(width, height, k[(0, 0)], k[(1, 1)], k[(0, 2)], k[(1, 2)])
    }

    /// The 3x3 camera matrix K.
    pub fn matrix(&self) -> Matrix3<f32> {
        Matrix3::new(
            self.fx, 0.0, self.ppx, //
            0.0, self.fy, self.ppy, //
            0.0, 0.0, 1.0,
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fx(&self) -> f32 {
        self.fx
    }

    pub fn fy(&self) -> f32 {
        self.fy
    }

    pub fn ppx(&self) -> f32 {
        self.ppx
    }

    pub fn ppy(&self) -> f32 {
        self.ppy
    }

    pub fn distortion_model(&self) -> DistortionModel {
        self.model
    }

    pub fn distortion_coeffs(&self) -> &[f32; 5] {
        &self.coeffs
    }

    /// Whether [`back_project`](Self::back_project) is defined for this model.
    pub fn is_back_projectable(&self) -> bool {
        !matches!(
            self.model,
            DistortionModel::ModifiedBrownConrady | DistortionModel::FTheta
        )
    }

    // Radial factor from k0, k1, k4 plus tangential terms from k2, k3.
    fn radial_tangential(&self, x: f32, y: f32) -> (f32, f32) {
        let c = &self.coeffs;
        let r2 = x * x + y * y;
        let f = 1.0 + c[0] * r2 + c[1] * r2 * r2 + c[4] * r2 * r2 * r2;
        (
            x * f + 2.0 * c[2] * x * y + c[3] * (r2 + 2.0 * x * x),
            y * f + 2.0 * c[3] * x * y + c[2] * (r2 + 2.0 * y * y),
        )
    }

    /// Projects a point in this camera's frame onto its image plane.
    pub fn project(&self, point: &Point3<f32>) -> Point2<f32> {
        let mut x = point.x / point.z;
        let mut y = point.y / point.z;

        match self.model {
            DistortionModel::ModifiedBrownConrady => {
                let c = &self.coeffs;
                let r2 = x * x + y * y;
                let f = 1.0 + c[0] * r2 + c[1] * r2 * r2 + c[4] * r2 * r2 * r2;
                x *= f;
                y *= f;
                let dx = x + 2.0 * c[2] * x * y + c[3] * (r2 + 2.0 * x * x);
                let dy = y + 2.0 * c[3] * x * y + c[2] * (r2 + 2.0 * y * y);
                x = dx;
                y = dy;
            }
            DistortionModel::FTheta => {
                let r = (x * x + y * y).sqrt();
                if r > 0.0 {
                    let k = self.coeffs[0];
                    let rd = (1.0 / k) * (2.0 * r * (k / 2.0).tan()).atan();
                    x *= rd / r;
                    y *= rd / r;
                }
            }
            DistortionModel::None
            | DistortionModel::InverseBrownConrady
            | DistortionModel::BrownConrady => {}
        }

        Point2::new(x * self.fx + self.ppx, y * self.fy + self.ppy)
    }

    /// Reconstructs the 3D point seen at `pixel` with depth `depth` along the optical axis.
    pub fn back_project(&self, pixel: &Point2<f32>, depth: f32) -> Result<Point3<f32>> {
        if !self.is_back_projectable() {
            return Err(Error::UnsupportedOperation(format!(
                "cannot back project with {}",
                self.model
            )));
        }

        let mut x = (pixel.x - self.ppx) / self.fx;
        let mut y = (pixel.y - self.ppy) / self.fy;
        if self.model == DistortionModel::InverseBrownConrady {
            (x, y) = self.radial_tangential(x, y);
        }
        Ok(Point3::new(depth * x, depth * y, depth))
    }
}

impl fmt::Display for CameraModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "w: {}, h: {}, fx: {}, fy: {}, ppx: {}, ppy: {}, distortion model: {}, coeffs: ",
            self.width, self.height, self.fx, self.fy, self.ppx, self.ppy, self.model
        )?;
        for (i, coeff) in self.coeffs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{coeff}")?;
        }
        Ok(())
    }
}

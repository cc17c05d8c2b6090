// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Read-only views of a hydrodynamic grid snapshot.

The grid loader lives elsewhere in the simulator; this module only borrows
its per-cell arrays. For the supported FLASH-style snapshots the grid is 2D
axisymmetric: each cell has a position `(x, y)` in the simulation plane, a
size, spherical radius and polar angle, a temperature, a mass density, and
two velocity components.

*/

use EmissionError;
use SPEED_LIGHT;


/// Which hydrodynamic code produced the snapshot.
///
/// Only [`HydroModel::Flash2d`] supports synchrotron emission; selecting any
/// other model is a configuration error.
#[derive(Copy,Clone,Debug,Eq,Hash,PartialEq)]
pub enum HydroModel {
    /// A 2D axisymmetric FLASH simulation.
    Flash2d,

    /// A 3D special-relativistic hydro simulation; not supported here.
    Riken3d,
}


/// A read-only snapshot of the hydrodynamic grid: borrowed per-cell arrays,
/// never mutated by this crate.
#[derive(Clone, Copy, Debug)]
pub struct GridSnapshot<'a> {
    model: HydroModel,

    /// Cell-center x coordinate (cylindrical radius), in cm.
    pub x: &'a [f64],

    /// Cell-center y coordinate (height above the equator), in cm.
    pub y: &'a [f64],

    /// Cell edge length, in cm.
    pub sz: &'a [f64],

    /// Spherical radius of the cell center, in cm.
    pub r: &'a [f64],

    /// Polar angle of the cell center, in radians.
    pub theta: &'a [f64],

    /// Cell temperature, in kelvin.
    pub temp: &'a [f64],

    /// Cell mass density, in g cm^-3.
    pub dens: &'a [f64],

    /// Velocity component along x, as a fraction of c.
    pub vx: &'a [f64],

    /// Velocity component along y, as a fraction of c.
    pub vy: &'a [f64],
}

impl<'a> GridSnapshot<'a> {
    /// Assemble a snapshot from borrowed per-cell arrays.
    ///
    /// All arrays must have the same length; disagreement is an
    /// [`EmissionError::InconsistentGrid`].
    pub fn new(model: HydroModel, x: &'a [f64], y: &'a [f64], sz: &'a [f64], r: &'a [f64],
               theta: &'a [f64], temp: &'a [f64], dens: &'a [f64], vx: &'a [f64],
               vy: &'a [f64]) -> Result<Self, EmissionError> {
        let n = x.len();

        if [y.len(), sz.len(), r.len(), theta.len(), temp.len(), dens.len(), vx.len(), vy.len()]
            .iter().any(|&l| l != n) {
            return Err(EmissionError::InconsistentGrid);
        }

        Ok(GridSnapshot {
            model: model,
            x: x,
            y: y,
            sz: sz,
            r: r,
            theta: theta,
            temp: temp,
            dens: dens,
            vx: vx,
            vy: vy,
        })
    }

    /// Which hydro code produced this snapshot.
    pub fn model(&self) -> HydroModel {
        self.model
    }

    /// The number of cells in the snapshot.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the snapshot has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}


/// The spatial window that is eligible to emit during one frame: a thin
/// radial shell intersected with an angular wedge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShellBounds {
    /// Inner radius of the shell, inclusive, in cm.
    pub r_min: f64,

    /// Outer radius of the shell, exclusive, in cm.
    pub r_max: f64,

    /// Minimum polar angle, inclusive, in radians.
    pub theta_min: f64,

    /// Maximum polar angle, exclusive, in radians.
    pub theta_max: f64,
}

impl ShellBounds {
    /// Compute the shell swept between the frame at which transport last
    /// stopped (`frame_scatt`) and the injection frame, given the frame rate
    /// of the hydro snapshots and the injection radius.
    ///
    /// The shell is one light-crossing frame thick, centered on the radius
    /// the injection surface has reached after `frame_scatt - frame_inj`
    /// frames.
    pub fn from_frames(frame_scatt: i64, frame_inj: i64, fps: f64, r_inj: f64,
                       theta_min: f64, theta_max: f64) -> Self {
        let delta = (frame_scatt - frame_inj) as f64;

        ShellBounds {
            r_min: r_inj + SPEED_LIGHT * (delta - 1.) / (2. * fps),
            r_max: r_inj + SPEED_LIGHT * (delta + 1.) / (2. * fps),
            theta_min: theta_min,
            theta_max: theta_max,
        }
    }

    /// Whether a cell at the given radius and polar angle lies inside the
    /// shell. Radial and angular intervals are half-open: `[r_min, r_max)`
    /// and `[theta_min, theta_max)`.
    pub fn contains(&self, r: f64, theta: f64) -> bool {
        r >= self.r_min && r < self.r_max && theta >= self.theta_min && theta < self.theta_max
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use ::SPEED_LIGHT;

    #[test]
    fn snapshot_rejects_ragged_arrays() {
        let a = [1., 2., 3.];
        let short = [1., 2.];

        assert!(GridSnapshot::new(HydroModel::Flash2d, &a, &a, &a, &a, &a, &a, &a, &a, &short)
                .is_err());
        assert!(GridSnapshot::new(HydroModel::Flash2d, &a, &a, &a, &a, &a, &a, &a, &a, &a)
                .is_ok());
    }

    #[test]
    fn shell_bounds_match_frame_arithmetic() {
        let b = ShellBounds::from_frames(12, 10, 5., 1e12, 0., 0.5);

        assert_approx_eq!(b.r_min, 1e12 + SPEED_LIGHT * 1. / 10., 1e-3 * SPEED_LIGHT);
        assert_approx_eq!(b.r_max, 1e12 + SPEED_LIGHT * 3. / 10., 1e-3 * SPEED_LIGHT);
        assert!(b.r_max - b.r_min > 0.);
        assert_approx_eq!(b.r_max - b.r_min, SPEED_LIGHT / 5., 1.);
    }

    #[test]
    fn shell_membership_is_half_open() {
        let b = ShellBounds {
            r_min: 1.,
            r_max: 2.,
            theta_min: 0.,
            theta_max: 0.5,
        };

        assert!(b.contains(1., 0.));
        assert!(!b.contains(2., 0.));
        assert!(!b.contains(1.5, 0.5));
        assert!(b.contains(1.999, 0.499));
        assert!(!b.contains(0.999, 0.2));
    }
}

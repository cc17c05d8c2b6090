// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Generate synchrotron photons for Monte Carlo radiative transfer.

This crate is a Rust port of the thermal synchrotron emission module of
[MCRaT](https://github.com/lazzati-astro/MCRaT), a Monte Carlo radiation
transfer code that post-processes 2D relativistic hydrodynamic simulations.
The emissivity and absorption physics follow [Wardziński & Zdziarski
(2000)](https://dx.doi.org/10.1046/j.1365-8711.2000.03048.x) and
[Ghisellini, Haardt & Fabian
(1991)](https://ui.adsabs.harvard.edu/abs/1991MNRAS.248P..14G).

Given a snapshot of a hydrodynamic grid, the crate decides how many
synchrotron photons the thin radial shell swept during one light-crossing
frame should contribute, samples their comoving frequencies from the thermal
emissivity spectrum by rejection, boosts them into the lab frame with a
caller-supplied transform, and places them into a shared, growable photon
pool. The top-level entry point is [`emit_synchrotron`].

All quantities are in cgs units.

*/

#![deny(missing_docs)]

#[cfg(test)] #[macro_use] extern crate assert_approx_eq;
extern crate rand;
extern crate rand_chacha;
extern crate rand_distr;
extern crate rayon;
#[macro_use] extern crate slog;
extern crate thiserror;

use std::collections::TryReserveError;
use std::f64;
use thiserror::Error;

pub use f64::consts::PI;

/// Two times pi, as an `f64`.
pub const TWO_PI: f64 = 2. * PI;

/// The mass of the electron in cgs (grams).
pub const MASS_ELECTRON: f64 = 9.1093826e-28;

/// The mass of the proton in cgs (grams).
pub const MASS_PROTON: f64 = 1.67262171e-24;

/// The speed of light in cgs (centimeters per second).
pub const SPEED_LIGHT: f64 = 2.99792458e10;

/// The charge of the electron, in cgs (esu's).
pub const ELECTRON_CHARGE: f64 = 4.80320680e-10;

/// The Boltzmann constant in cgs (ergs per kelvin).
pub const BOLTZMANN: f64 = 1.3806505e-16;

/// The Planck constant in cgs (erg seconds).
pub const PLANCK: f64 = 6.6260693e-27;

/// The fine structure constant (dimensionless).
pub const FINE_STRUCTURE: f64 = 7.297352568e-3;

/// The Thomson cross section in cgs (square centimeters).
pub const THOMSON_CROSS_SECTION: f64 = 6.65245873e-25;

/// The classical electron radius in cgs (centimeters).
pub const ELECTRON_RADIUS: f64 = 2.817940325e-13;


/// The origin of a photon in the simulation.
#[derive(Copy,Clone,Debug,Eq,Hash,PartialEq)]
pub enum PhotonType {
    /// A photon injected by the outer simulation driver.
    Injected,

    /// A photon emitted by the thermal synchrotron process of this crate.
    Synchrotron,
}


/// One record of the simulation's photon population.
///
/// A record with `weight == 0` is a *null slot*: unoccupied and eligible for
/// reuse. No other field is authoritative for occupancy.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct Photon {
    /// The 4-momentum in the lab frame, `(p0, p1, p2, p3)` in cgs.
    pub lab_momentum: [f64; 4],

    /// The 4-momentum in the frame comoving with the emitting fluid.
    pub comoving_momentum: [f64; 4],

    /// The spatial position in the lab frame (centimeters).
    pub position: [f64; 3],

    /// Stokes parameters `(I, Q, U, V)`, normalized so that `I` is 1 for an
    /// unpolarized photon at creation.
    pub stokes: [f64; 4],

    /// The number of scatterings this photon has undergone.
    pub num_scatt: u32,

    /// The index of the grid block nearest to the photon; −1 if unassigned.
    pub nearest_block_index: i64,

    /// Whether the photon was injected or synchrotron-emitted.
    pub kind: PhotonType,

    /// The statistical weight of this macro-photon; 0 marks a null slot.
    pub weight: f64,
}

impl Photon {
    /// Create a null (unoccupied) photon record.
    pub fn null() -> Self {
        Photon {
            lab_momentum: [0.; 4],
            comoving_momentum: [0.; 4],
            position: [0.; 3],
            stokes: [0.; 4],
            num_scatt: 0,
            nearest_block_index: -1,
            kind: PhotonType::Injected,
            weight: 0.,
        }
    }

    /// Whether this record is a null slot, i.e. its weight is zero.
    pub fn is_null(&self) -> bool {
        self.weight == 0.
    }
}


/// Things that can go wrong while emitting photons.
///
/// The original C implementation aborted the whole process on these; we
/// return them to the caller, who decides.
#[derive(Debug, Error)]
pub enum EmissionError {
    /// The grid snapshot comes from a hydro model we cannot emit for.
    #[error("emitting photons with thermal synchrotron is not available for the {0:?} hydro model")]
    UnsupportedModel(HydroModel),

    /// The photon pool could not be grown to hold the new photons.
    #[error("failed to reserve space for {additional} additional photon records")]
    PoolAllocation {
        /// How many records the pool tried to add.
        additional: usize,
        /// The underlying allocator error.
        #[source]
        source: TryReserveError,
    },

    /// The per-cell arrays of a grid snapshot disagree in length.
    #[error("grid snapshot arrays disagree in length")]
    InconsistentGrid,
}


pub mod bessel;
pub mod quad;
pub mod physics;
pub mod grid;
pub mod rng;
pub mod sampler;
pub mod estimator;
pub mod pool;
pub mod emit;

pub use grid::{GridSnapshot, HydroModel, ShellBounds};
pub use pool::PhotonPool;
pub use rng::RngPool;
pub use emit::{emit_synchrotron, EmissionConfig, EmissionReport};

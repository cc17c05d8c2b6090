// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! The top-level synchrotron emission operation.

One call covers one frame of the simulation: figure out which cells the
light-crossing shell sweeps, decide how many photons they emit, reserve
slots in the shared pool, and fill each slot with a freshly sampled photon
boosted into the lab frame.

The Lorentz boost itself belongs to the transport machinery elsewhere in the
simulator, so it arrives here as a caller-supplied pure function from a
boost velocity and a comoving 4-momentum to a lab-frame 4-momentum.

The estimation passes run in parallel; the fill phase is serial and driven
entirely by the primary random stream, which makes the emitted photons a
deterministic function of the primary seed and the stream count.

*/

use rand::{Rng, RngCore};
use slog::Logger;

use estimator;
use grid::{GridSnapshot, HydroModel, ShellBounds};
use physics;
use pool::PhotonPool;
use rng::RngPool;
use sampler;
use {EmissionError, PhotonType};
use {MASS_PROTON, PI, PLANCK, SPEED_LIGHT, TWO_PI};


/// Configuration of one emission operation.
#[derive(Clone, Copy, Debug)]
pub struct EmissionConfig {
    /// The radius at which photons were originally injected, in cm.
    pub r_inj: f64,

    /// The nominal per-photon statistical weight; the estimator adjusts it.
    pub nominal_weight: f64,

    /// The cap on the total photon population. A single shell may realize at
    /// most a tenth of this.
    pub max_photons: usize,

    /// Frames per second of the hydro snapshot cadence.
    pub fps: f64,

    /// Minimum polar angle of the emitting wedge, inclusive, in radians.
    pub theta_min: f64,

    /// Maximum polar angle of the emitting wedge, exclusive, in radians.
    pub theta_max: f64,

    /// The frame at which transport previously stopped.
    pub frame_scatt: i64,

    /// The frame at which photons were injected.
    pub frame_inj: i64,

    /// The fraction of the matter energy density carried by the magnetic
    /// field.
    pub epsilon_b: f64,
}


/// What one emission operation did, returned by value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmissionReport {
    /// How many photons were newly placed in the pool.
    pub emitted: usize,

    /// The pool size after any growth.
    pub pool_size: usize,

    /// How many null slots remain after emission.
    pub null_count: usize,

    /// The converged per-photon weight used for every emitted photon.
    pub weight: f64,
}


/// Emit synchrotron photons for the shell swept during the current frame.
///
/// The pool is exclusively owned by this operation for its duration: it may
/// grow (never shrink), and existing occupied records are left untouched.
/// `boost` maps a boost velocity (as a fraction of c) and a comoving
/// 4-momentum to the lab-frame 4-momentum.
pub fn emit_synchrotron<R, F>(pool: &mut PhotonPool, grid: &GridSnapshot, config: &EmissionConfig,
                              primary: &mut R, boost: F, log: &Logger)
                              -> Result<EmissionReport, EmissionError>
where R: RngCore, F: Fn([f64; 3], [f64; 4]) -> [f64; 4] {
    if grid.model() != HydroModel::Flash2d {
        return Err(EmissionError::UnsupportedModel(grid.model()));
    }

    let shell = ShellBounds::from_frames(config.frame_scatt, config.frame_inj, config.fps,
                                         config.r_inj, config.theta_min, config.theta_max);

    info!(log, "emitting synchrotron photons";
          "r_min" => shell.r_min, "r_max" => shell.r_max,
          "theta_min" => shell.theta_min, "theta_max" => shell.theta_max,
          "frame" => config.frame_scatt);

    let mut streams = RngPool::per_worker(primary);
    let est = estimator::estimate_counts(grid, &shell, config.epsilon_b, config.fps,
                                         config.nominal_weight, config.max_photons,
                                         &mut streams, log);

    pool.refresh_free();

    let total = est.total as usize;

    info!(log, "shell photon budget";
          "total" => total, "weight" => est.weight,
          "pool_size" => pool.len(), "null_slots" => pool.null_count());

    if total > pool.null_count() {
        info!(log, "growing photon pool";
              "additional" => total - pool.null_count(),
              "new_size" => pool.len() + (total - pool.null_count()));
    }

    let mut reserved = pool.acquire(total)?;
    let mut emitted = 0_usize;

    'fill: for (&cell, &count) in est.eligible.iter().zip(&est.counts) {
        if count == 0 {
            continue;
        }

        let el_dens = grid.dens[cell] / MASS_PROTON;
        let temp = grid.temp[cell];
        let nu_c = physics::cyclotron_frequency(
            physics::magnetic_field(el_dens, temp, config.epsilon_b));
        let dimless_theta = physics::dimensionless_theta(temp);

        for _ in 0..count {
            let idx = match reserved.pop() {
                Some(idx) => idx,
                None => break 'fill,
            };

            let nu = sampler::sample_frequency(primary, nu_c, dimless_theta, el_dens);

            // Isotropic comoving direction and a random azimuth for the
            // photon's placement within the axisymmetric cell.
            let position_phi = primary.gen::<f64>() * TWO_PI;
            let dir_phi = primary.gen::<f64>() * TWO_PI;
            let dir_theta = primary.gen::<f64>() * PI;

            let p0 = PLANCK * nu / SPEED_LIGHT;
            let comoving = [
                p0,
                p0 * dir_theta.sin() * dir_phi.cos(),
                p0 * dir_theta.sin() * dir_phi.sin(),
                p0 * dir_theta.cos(),
            ];

            // The boost takes the photon from the comoving frame to the lab
            // frame, so the fluid velocity enters negated.
            let boost_v = [
                -grid.vx[cell] * position_phi.cos(),
                -grid.vx[cell] * position_phi.sin(),
                -grid.vy[cell],
            ];
            let lab = boost(boost_v, comoving);

            trace!(log, "placing photon"; "slot" => idx, "cell" => cell, "nu" => nu);

            let ph = &mut pool.photons_mut()[idx];
            ph.lab_momentum = lab;
            ph.comoving_momentum = comoving;
            // The cell's y coordinate is the simulation's z axis.
            ph.position = [
                grid.x[cell] * position_phi.cos(),
                grid.x[cell] * position_phi.sin(),
                grid.y[cell],
            ];
            ph.stokes = [1., 0., 0., 0.];
            ph.num_scatt = 0;
            ph.nearest_block_index = -1;
            ph.kind = PhotonType::Synchrotron;
            ph.weight = est.weight;

            emitted += 1;
        }
    }

    info!(log, "synchrotron emission finished";
          "emitted" => emitted, "pool_size" => pool.len(), "null_slots" => pool.null_count());

    Ok(EmissionReport {
        emitted: emitted,
        pool_size: pool.len(),
        null_count: pool.null_count(),
        weight: est.weight,
    })
}

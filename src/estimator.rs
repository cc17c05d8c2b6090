// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Decide how many photons each eligible cell should emit.

For every cell inside the active shell we integrate the photon-number
spectrum over the sampling domain, scale by the cell's annular volume and
the frame cadence, and treat the result divided by the per-photon weight as
the mean of a Poisson draw. The realized total is then balanced against the
population cap: too many photons and the weight is inflated tenfold (each
macro-photon stands for more physical photons, so fewer are needed); too few
and it is halved. Draws repeat until the total falls inside the configured
bounds, which keeps memory and runtime bounded no matter how bright the
shell is.

Quadrature non-convergence is reported through the logger but never fatal:
the estimate in hand is used as-is, trading accuracy for liveness.

*/

use rand::Rng;
use rand_distr::{Distribution, Poisson};
use rayon::prelude::*;
use slog::Logger;

use grid::{GridSnapshot, ShellBounds};
use physics;
use quad::IntegrationWorkspace;
use rng::RngPool;
use sampler::{DOMAIN_HIGH, DOMAIN_LOW};
use {MASS_PROTON, TWO_PI};


/// How many subdivisions the per-cell quadrature may use.
const QUAD_WORKSPACE: usize = 10000;

/// Relative tolerance of the per-cell quadrature.
const QUAD_EPSREL: f64 = 1e-2;


/// The outcome of the count estimation for one shell.
#[derive(Clone, Debug)]
pub struct CountEstimate {
    /// Indices of the grid cells inside the shell, in ascending order.
    pub eligible: Vec<usize>,

    /// The realized photon count for each eligible cell, aligned with
    /// `eligible`.
    pub counts: Vec<u64>,

    /// The converged per-photon statistical weight.
    pub weight: f64,

    /// The total number of photons to emit, `counts.iter().sum()`.
    pub total: u64,
}


/// Estimate the realized photon counts for every cell of `grid` inside
/// `shell`.
///
/// `nominal_weight` seeds the rebalancing loop; `max_photons` is the cap on
/// the whole photon population, of which one tenth is the most a single
/// shell may realize.
pub fn estimate_counts(grid: &GridSnapshot, shell: &ShellBounds, epsilon_b: f64, fps: f64,
                       nominal_weight: f64, max_photons: usize, streams: &mut RngPool,
                       log: &Logger) -> CountEstimate {
    let eligible: Vec<usize> = (0..grid.len())
        .into_par_iter()
        .filter(|&i| shell.contains(grid.r[i], grid.theta[i]))
        .collect();

    if eligible.is_empty() {
        return CountEstimate {
            eligible: eligible,
            counts: Vec::new(),
            weight: nominal_weight,
            total: 0,
        };
    }

    // The weight-independent part of each cell's expectation: photons per
    // second of comoving emission, times the annular cell volume, per frame.
    // The rebalancing loop rescales this by the running weight instead of
    // re-integrating.

    let rates: Vec<f64> = eligible.par_iter()
        .map(|&i| cell_photon_rate(grid, i, epsilon_b, fps, log))
        .collect();

    let shell_cap = 0.1 * max_photons as f64;
    let shell_floor = 0_f64;
    let mut weight = nominal_weight;

    loop {
        let counts = draw_counts(&rates, weight, streams);
        let total = counts.iter().fold(0_u64, |acc, &c| acc.saturating_add(c));

        debug!(log, "estimated shell photon count";
               "total" => total, "weight" => weight, "cells" => eligible.len());

        if total as f64 > shell_cap {
            weight *= 10.;
        } else if (total as f64) < shell_floor {
            weight *= 0.5;
        } else {
            return CountEstimate {
                eligible: eligible,
                counts: counts,
                weight: weight,
                total: total,
            };
        }
    }
}


/// Integrate the photon-number spectrum of one cell and scale it to a
/// photons-per-frame rate (before the statistical weight is applied).
fn cell_photon_rate(grid: &GridSnapshot, i: usize, epsilon_b: f64, fps: f64,
                    log: &Logger) -> f64 {
    let el_dens = grid.dens[i] / MASS_PROTON;
    let temp = grid.temp[i];
    let nu_c = physics::cyclotron_frequency(physics::magnetic_field(el_dens, temp, epsilon_b));
    let dimless_theta = physics::dimensionless_theta(temp);

    let mut ws = IntegrationWorkspace::new(QUAD_WORKSPACE);
    let result = ws.qag(|nu| physics::jnu_photon_spectrum(nu, nu_c, dimless_theta, el_dens),
                        nu_c * DOMAIN_LOW, nu_c * DOMAIN_HIGH)
        .tolerance(0., QUAD_EPSREL)
        .compute();

    let integral = match result {
        Ok(r) => {
            if r.abserr > QUAD_EPSREL * r.value.abs() && r.value != 0. {
                debug!(log, "cell spectrum integration did not reach tolerance";
                       "cell" => i, "value" => r.value, "abserr" => r.abserr);
            }
            r.value.max(0.)
        },
        Err(e) => {
            debug!(log, "cell spectrum integration failed"; "cell" => i, "err" => %e);
            0.
        },
    };

    integral * TWO_PI * grid.x[i] * grid.sz[i] * grid.sz[i] / fps
}


/// One Poisson pass over every eligible cell: the cell list is split into
/// contiguous chunks, one per stream, so the draw a given cell receives
/// depends only on the stream count, never on scheduling order.
fn draw_counts(rates: &[f64], weight: f64, streams: &mut RngPool) -> Vec<u64> {
    let chunk = streams.chunk_len(rates.len());

    let per_chunk: Vec<Vec<u64>> = rates.par_chunks(chunk)
        .zip(streams.streams_mut().par_iter_mut())
        .map(|(rs, rng)| rs.iter().map(|&rate| poisson_draw(rng, rate / weight)).collect())
        .collect();

    per_chunk.into_iter().flat_map(|v| v.into_iter()).collect()
}


fn poisson_draw<R: Rng>(rng: &mut R, mean: f64) -> u64 {
    if !(mean > 0.) || !mean.is_finite() {
        return 0;
    }

    match Poisson::new(mean) {
        Ok(dist) => dist.sample(rng) as u64,
        Err(_) => 0,
    }
}

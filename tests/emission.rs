// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

//! End-to-end checks of the emission operation: shell selection, pool
//! growth and reuse, the invariants of freshly emitted records, and
//! reproducibility under a fixed seed.

extern crate rand;
extern crate rand_chacha;
#[macro_use] extern crate slog;
extern crate synchrony;
extern crate synchrony_test_support;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use slog::Logger;
use synchrony::{emit_synchrotron, EmissionConfig, EmissionError, GridSnapshot, HydroModel,
                Photon, PhotonPool, PhotonType, MASS_PROTON, PLANCK, SPEED_LIGHT};
use synchrony::physics;
use synchrony_test_support::lorentz_boost;


fn quiet_log() -> Logger {
    Logger::root(slog::Discard, o!())
}

fn config() -> EmissionConfig {
    EmissionConfig {
        r_inj: 1e12,
        nominal_weight: 1e40,
        max_photons: 1000,
        fps: 5.,
        theta_min: 0.,
        theta_max: 0.5,
        frame_scatt: 12,
        frame_inj: 10,
        epsilon_b: 0.5,
    }
}

/// Per-cell arrays for a grid with one hot, dense cell inside the shell
/// that `config()` selects and one cell far outside it.
struct Cells {
    x: Vec<f64>,
    y: Vec<f64>,
    sz: Vec<f64>,
    r: Vec<f64>,
    theta: Vec<f64>,
    temp: Vec<f64>,
    dens: Vec<f64>,
    vx: Vec<f64>,
    vy: Vec<f64>,
}

impl Cells {
    fn new() -> Self {
        Cells {
            x: vec![1e10, 1e10],
            y: vec![1e10, 5e12],
            sz: vec![1e9, 1e9],
            r: vec![1.006e12, 5e12],
            theta: vec![0.1, 0.1],
            temp: vec![1e9, 1e9],
            dens: vec![1e-5, 1e-5],
            vx: vec![0.1, 0.1],
            vy: vec![0.05, 0.05],
        }
    }

    fn snapshot(&self, model: HydroModel) -> GridSnapshot {
        GridSnapshot::new(model, &self.x, &self.y, &self.sz, &self.r, &self.theta,
                          &self.temp, &self.dens, &self.vx, &self.vy).unwrap()
    }
}

fn occupied(tag: f64) -> Photon {
    let mut ph = Photon::null();
    ph.weight = tag;
    ph.lab_momentum = [tag, tag, 0., 0.];
    ph.num_scatt = 3;
    ph
}


#[test]
fn unsupported_hydro_model_is_an_error() {
    let cells = Cells::new();
    let grid = cells.snapshot(HydroModel::Riken3d);
    let mut pool = PhotonPool::new();
    let mut primary = ChaCha8Rng::seed_from_u64(42);

    let err = emit_synchrotron(&mut pool, &grid, &config(), &mut primary, lorentz_boost,
                               &quiet_log());

    match err {
        Err(EmissionError::UnsupportedModel(m)) => assert_eq!(m, HydroModel::Riken3d),
        other => panic!("expected UnsupportedModel, got {:?}", other),
    }
}

#[test]
fn empty_shell_leaves_the_pool_untouched() {
    let mut cells = Cells::new();
    // Push both cells outside the shell.
    cells.r = vec![5e12, 6e12];

    let grid = cells.snapshot(HydroModel::Flash2d);
    let mut pool = PhotonPool::from_photons(vec![occupied(1.), Photon::null(), occupied(2.)]);
    let before = pool.photons().to_vec();
    let mut primary = ChaCha8Rng::seed_from_u64(42);

    let report = emit_synchrotron(&mut pool, &grid, &config(), &mut primary, lorentz_boost,
                                  &quiet_log()).unwrap();

    assert_eq!(report.emitted, 0);
    assert_eq!(report.pool_size, 3);
    assert_eq!(pool.photons(), &before[..]);
}

#[test]
fn emitted_records_satisfy_the_creation_invariants() {
    let cells = Cells::new();
    let grid = cells.snapshot(HydroModel::Flash2d);
    let mut pool = PhotonPool::new();
    let mut primary = ChaCha8Rng::seed_from_u64(42);

    let report = emit_synchrotron(&mut pool, &grid, &config(), &mut primary, lorentz_boost,
                                  &quiet_log()).unwrap();

    assert!(report.emitted >= 1);
    assert_eq!(report.pool_size, report.emitted);
    assert_eq!(report.null_count, 0);
    assert!(report.weight > 0.);

    let el_dens = cells.dens[0] / MASS_PROTON;
    let nu_c = physics::cyclotron_frequency(
        physics::magnetic_field(el_dens, cells.temp[0], 0.5));

    for ph in pool.photons() {
        assert_eq!(ph.weight, report.weight);
        assert_eq!(ph.stokes, [1., 0., 0., 0.]);
        assert_eq!(ph.num_scatt, 0);
        assert_eq!(ph.kind, PhotonType::Synchrotron);
        assert_eq!(ph.nearest_block_index, -1);

        // The comoving frequency must lie in the sampling domain.
        let nu = ph.comoving_momentum[0] * SPEED_LIGHT / PLANCK;
        assert!(nu >= nu_c * 1e-4 && nu < nu_c * 1e2, "nu = {:e}, nu_c = {:e}", nu, nu_c);

        // Placement: the cell center rotated by the emission azimuth, with
        // the grid's y coordinate on the z axis.
        let rho = (ph.position[0] * ph.position[0] + ph.position[1] * ph.position[1]).sqrt();
        assert!((rho - cells.x[0]).abs() < 1e-3 * cells.x[0]);
        assert_eq!(ph.position[2], cells.y[0]);

        // The lab 4-momentum is the boost of the comoving one.
        assert!(ph.lab_momentum[0] > 0.);
    }
}

#[test]
fn null_slots_are_reused_without_growth() {
    let cells = Cells::new();
    let grid = cells.snapshot(HydroModel::Flash2d);

    // 200 null slots: more than a shell can realize under max_photons=1000.
    let mut pool = PhotonPool::from_photons(vec![Photon::null(); 200]);
    let mut primary = ChaCha8Rng::seed_from_u64(42);

    let report = emit_synchrotron(&mut pool, &grid, &config(), &mut primary, lorentz_boost,
                                  &quiet_log()).unwrap();

    assert!(report.emitted >= 1);
    assert_eq!(report.pool_size, 200);
    assert_eq!(report.null_count, 200 - report.emitted);

    // Tail-first reuse: the filled slots are the highest-indexed ones.
    for (i, ph) in pool.photons().iter().enumerate() {
        if i < 200 - report.emitted {
            assert!(ph.is_null());
        } else {
            assert_eq!(ph.kind, PhotonType::Synchrotron);
            assert!(!ph.is_null());
        }
    }
}

#[test]
fn growth_is_limited_to_the_shortfall() {
    let cells = Cells::new();
    let grid = cells.snapshot(HydroModel::Flash2d);

    let originals = vec![occupied(7.), Photon::null(), occupied(8.), Photon::null()];
    let mut pool = PhotonPool::from_photons(originals.clone());
    let mut primary = ChaCha8Rng::seed_from_u64(42);

    let report = emit_synchrotron(&mut pool, &grid, &config(), &mut primary, lorentz_boost,
                                  &quiet_log()).unwrap();

    if report.emitted > 2 {
        // Grown by exactly the shortfall beyond the two null slots.
        assert_eq!(report.pool_size, originals.len() + report.emitted - 2);
        assert_eq!(report.null_count, 0);
    } else {
        assert_eq!(report.pool_size, originals.len());
        assert_eq!(report.null_count, 2 - report.emitted);
    }

    // Occupied records survive bit-for-bit.
    assert_eq!(pool.photons()[0], originals[0]);
    assert_eq!(pool.photons()[2], originals[2]);
}

#[test]
fn fixed_seed_runs_are_identical() {
    let cells = Cells::new();
    let grid = cells.snapshot(HydroModel::Flash2d);

    let mut pool_a = PhotonPool::new();
    let mut primary_a = ChaCha8Rng::seed_from_u64(777);
    let report_a = emit_synchrotron(&mut pool_a, &grid, &config(), &mut primary_a,
                                    lorentz_boost, &quiet_log()).unwrap();

    let mut pool_b = PhotonPool::new();
    let mut primary_b = ChaCha8Rng::seed_from_u64(777);
    let report_b = emit_synchrotron(&mut pool_b, &grid, &config(), &mut primary_b,
                                    lorentz_boost, &quiet_log()).unwrap();

    assert_eq!(report_a, report_b);
    assert_eq!(pool_a.photons(), pool_b.photons());
}

// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

//! Run one synchrotron emission pass over a toy wedge of hot, magnetized
//! fluid and print what came out.

extern crate clap;
extern crate rand;
extern crate rand_chacha;
extern crate synchrony;
extern crate synchrony_test_support;

use clap::{value_parser, Arg};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use synchrony::{emit_synchrotron, EmissionConfig, GridSnapshot, HydroModel, PhotonPool,
                ShellBounds, SPEED_LIGHT};
use synchrony_test_support::{default_log, lorentz_boost};


fn main() {
    let matches = clap::Command::new("demo-emission")
        .version("0.1.0")
        .about("Emit synchrotron photons from a toy hydro grid")
        .arg(Arg::new("SEED")
             .help("The seed for the primary random stream")
             .value_parser(value_parser!(u64))
             .default_value("42")
             .index(1))
        .arg(Arg::new("CELLS")
             .help("How many grid cells to spread across the emitting shell")
             .value_parser(value_parser!(usize))
             .default_value("32")
             .index(2))
        .get_matches();

    let seed = *matches.get_one::<u64>("SEED").unwrap();
    let n_cells = *matches.get_one::<usize>("CELLS").unwrap();

    let config = EmissionConfig {
        r_inj: 1e12,
        nominal_weight: 1e40,
        max_photons: 10000,
        fps: 5.,
        theta_min: 0.,
        theta_max: 0.6,
        frame_scatt: 12,
        frame_inj: 10,
        epsilon_b: 0.5,
    };

    // Lay the cells out across the shell that the frame arithmetic selects,
    // fanning them over the polar wedge.
    let shell = ShellBounds::from_frames(config.frame_scatt, config.frame_inj, config.fps,
                                         config.r_inj, config.theta_min, config.theta_max);

    let mut x = Vec::with_capacity(n_cells);
    let mut y = Vec::with_capacity(n_cells);
    let mut sz = Vec::with_capacity(n_cells);
    let mut r = Vec::with_capacity(n_cells);
    let mut theta = Vec::with_capacity(n_cells);
    let mut temp = Vec::with_capacity(n_cells);
    let mut dens = Vec::with_capacity(n_cells);
    let mut vx = Vec::with_capacity(n_cells);
    let mut vy = Vec::with_capacity(n_cells);

    for i in 0..n_cells {
        let f = (i as f64 + 0.5) / n_cells as f64;
        let r_i = shell.r_min + f * (shell.r_max - shell.r_min);
        let th_i = config.theta_min + f * (config.theta_max - config.theta_min);

        x.push(r_i * th_i.sin());
        y.push(r_i * th_i.cos());
        sz.push(1e9);
        r.push(r_i);
        theta.push(th_i);
        temp.push(1e9 * (1. + 0.5 * f));
        dens.push(1e-5 * (1. - 0.3 * f));
        vx.push(0.2 * th_i.sin());
        vy.push(0.2 * th_i.cos());
    }

    let grid = GridSnapshot::new(HydroModel::Flash2d, &x, &y, &sz, &r, &theta,
                                 &temp, &dens, &vx, &vy).unwrap();

    let log = default_log();
    let mut pool = PhotonPool::new();
    let mut primary = ChaCha8Rng::seed_from_u64(seed);

    let report = emit_synchrotron(&mut pool, &grid, &config, &mut primary, lorentz_boost, &log)
        .unwrap();

    let mut mean_energy = 0.;

    for ph in pool.photons() {
        if !ph.is_null() {
            mean_energy += ph.lab_momentum[0] * SPEED_LIGHT;
        }
    }

    if report.emitted > 0 {
        mean_energy /= report.emitted as f64;
    }

    println!("emitted:          {}", report.emitted);
    println!("pool size:        {}", report.pool_size);
    println!("null slots:       {}", report.null_count);
    println!("photon weight:    {:e}", report.weight);
    println!("mean energy:      {:e} erg", mean_energy);
}

// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

//! A tiny helper for testing convenience.

#[macro_use] extern crate slog;
extern crate slog_async;
extern crate slog_term;

use slog::Drain;

/// Create a simple `slog` logger for use in test programs.
///
/// It logs to the terminal using default parameters, as per the `slog` basic
/// example. This just saves us ~8 lines of boilerplate in all of our
/// test/demo programs.
pub fn default_log() -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain)
        .overflow_strategy(slog_async::OverflowStrategy::Block)
        .build().fuse();
    slog::Logger::root(drain, o!())
}


/// A reference Lorentz boost, standing in for the transport machinery's.
///
/// `velocity` is the boost velocity as a fraction of the speed of light;
/// `p` is a 4-momentum in the source frame. Returns the 4-momentum in the
/// boosted frame. To take a comoving photon into the lab frame, pass the
/// negated fluid velocity, which is how the emission core builds its boost
/// vector.
pub fn lorentz_boost(velocity: [f64; 3], p: [f64; 4]) -> [f64; 4] {
    let beta_sq = velocity[0] * velocity[0] + velocity[1] * velocity[1]
        + velocity[2] * velocity[2];

    if beta_sq == 0. {
        return p;
    }

    let gamma = 1. / (1. - beta_sq).sqrt();
    let beta_dot_p = velocity[0] * p[1] + velocity[1] * p[2] + velocity[2] * p[3];
    let spatial_factor = (gamma - 1.) * beta_dot_p / beta_sq - gamma * p[0];

    [
        gamma * (p[0] - beta_dot_p),
        p[1] + spatial_factor * velocity[0],
        p[2] + spatial_factor * velocity[1],
        p[3] + spatial_factor * velocity[2],
    ]
}


#[cfg(test)]
mod tests {
    use super::lorentz_boost;

    #[test]
    fn zero_velocity_is_identity() {
        let p = [1., 0.5, -0.25, 0.3];
        assert_eq!(lorentz_boost([0., 0., 0.], p), p);
    }

    #[test]
    fn boost_preserves_the_null_norm() {
        let p = [1., 0.6, 0.64, 0.48];
        // p is lightlike: p0^2 = p1^2 + p2^2 + p3^2.
        let b = lorentz_boost([0.3, -0.1, 0.2], p);
        let norm = b[0] * b[0] - b[1] * b[1] - b[2] * b[2] - b[3] * b[3];
        assert!(norm.abs() < 1e-12);
    }

    #[test]
    fn opposite_boosts_cancel() {
        let p = [2., 0.3, 1.1, -0.7];
        let v = [0.25, 0.1, -0.4];
        let there = lorentz_boost(v, p);
        let back = lorentz_boost([-v[0], -v[1], -v[2]], there);

        for i in 0..4 {
            assert!((back[i] - p[i]).abs() < 1e-12, "component {} drifted", i);
        }
    }
}

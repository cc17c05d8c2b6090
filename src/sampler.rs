// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Draw photon frequencies from the emissivity spectrum.

One photon frequency at a time, by rejection: draw a trial frequency
uniformly across the sampling domain and a trial height uniformly under an
envelope, and accept once the trial height falls at or below the emissivity
at the trial frequency.

The envelope is twice the emissivity at one tenth of the cyclotron frequency,
an empirical near-peak estimate rather than a proven bound. Rejection
sampling stays correct under a loose envelope, it just wastes draws, but if
the true spectrum ever pokes above the envelope the acceptance region is
clipped there and the draw is biased toward the envelope.

*/

use physics;
use rand::Rng;


/// The sampling domain, as multiples of the cyclotron frequency. About four
/// orders of magnitude separate the spectral peak from the lower limit, and
/// the exponential cutoff kills the spectrum well below the upper one.
pub const DOMAIN_LOW: f64 = 1e-4;

/// Upper end of the sampling domain, as a multiple of the cyclotron
/// frequency.
pub const DOMAIN_HIGH: f64 = 1e2;


/// Draw a comoving photon frequency, in Hz, from the emissivity spectrum of
/// a cell with the given cyclotron frequency, dimensionless temperature, and
/// electron density.
pub fn sample_frequency<R: Rng>(rng: &mut R, nu_c: f64, dimless_theta: f64,
                                el_dens: f64) -> f64 {
    let lo = nu_c * DOMAIN_LOW;
    let hi = nu_c * DOMAIN_HIGH;
    let envelope = 2. * physics::jnu(nu_c / 10., nu_c, dimless_theta, el_dens);

    loop {
        let trial_nu = rng.gen_range(lo..hi);
        let trial_height = rng.gen::<f64>() * envelope;

        if trial_height <= physics::jnu(trial_nu, nu_c, dimless_theta, el_dens) {
            return trial_nu;
        }
    }
}


#[cfg(test)]
mod tests {
    use physics;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use super::*;

    fn cell() -> (f64, f64, f64) {
        let temp = 1e9;
        let el_dens = 1e-6 / ::MASS_PROTON;
        let nu_c = physics::cyclotron_frequency(physics::magnetic_field(el_dens, temp, 0.5));
        (nu_c, physics::dimensionless_theta(temp), el_dens)
    }

    #[test]
    fn samples_stay_in_domain() {
        let (nu_c, theta, el_dens) = cell();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..200 {
            let nu = sample_frequency(&mut rng, nu_c, theta, el_dens);
            assert!(nu >= nu_c * DOMAIN_LOW && nu < nu_c * DOMAIN_HIGH);
        }
    }

    #[test]
    fn sampling_is_reproducible() {
        let (nu_c, theta, el_dens) = cell();

        let mut rng_a = ChaCha8Rng::seed_from_u64(1234);
        let mut rng_b = ChaCha8Rng::seed_from_u64(1234);

        for _ in 0..20 {
            let a = sample_frequency(&mut rng_a, nu_c, theta, el_dens);
            let b = sample_frequency(&mut rng_b, nu_c, theta, el_dens);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn samples_concentrate_near_the_peak() {
        // The spectrum peaks within a few nu_c; far more draws should land
        // below 10 nu_c than above it even though that is only a tenth of
        // the domain.
        let (nu_c, theta, el_dens) = cell();
        let mut rng = ChaCha8Rng::seed_from_u64(99);

        let mut below = 0;
        for _ in 0..300 {
            if sample_frequency(&mut rng, nu_c, theta, el_dens) < 10. * nu_c {
                below += 1;
            }
        }

        assert!(below > 250, "only {} of 300 samples below 10 nu_c", below);
    }
}

// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! The thermal synchrotron micro-physics kernel.

Pure functions, deterministic in their real-valued inputs, with no state and
no I/O. The emissivity follows [Wardziński & Zdziarski
(2000)](https://dx.doi.org/10.1046/j.1365-8711.2000.03048.x): the spectrum is
built from the emission of electrons near the Lorentz factor that dominates
at each frequency, with a line-shape function, its curvature, and a thermal
half-width setting the spectral profile. The absorption cross section follows
the cold-plasma model of Ghisellini, Haardt & Fabian (1991).

Two electron-density models are available: the relativistic Maxwell–Jüttner
distribution and the non-relativistic Maxwell–Boltzmann one. [`jnu`] selects
between them at the dimensionless temperature of a 10^7 K plasma.

Numeric hazards: the shape functions take logarithms and fractional powers of
expressions that vanish as the Lorentz factor approaches 1 or the momentum
approaches 0. Those limits underflow to zero emissivity rather than
diverging, but callers probing exactly `gamma == 1` or `p == 0` will see
NaNs, as in the original code.

*/

use bessel;
use super::{BOLTZMANN, ELECTRON_CHARGE, ELECTRON_RADIUS, FINE_STRUCTURE, MASS_ELECTRON, PI,
            PLANCK, SPEED_LIGHT, THOMSON_CROSS_SECTION, TWO_PI};


/// The cyclotron frequency, in Hz, of an electron gyrating in a magnetic
/// field of the given strength in Gauss.
pub fn cyclotron_frequency(magnetic_field: f64) -> f64 {
    ELECTRON_CHARGE * magnetic_field / (TWO_PI * MASS_ELECTRON * SPEED_LIGHT)
}

/// The dimensionless electron temperature `k T / (m_e c^2)` of a plasma at
/// the given temperature in kelvin.
pub fn dimensionless_theta(temp: f64) -> f64 {
    BOLTZMANN * temp / (MASS_ELECTRON * SPEED_LIGHT * SPEED_LIGHT)
}

/// Estimate the magnetic field strength, in Gauss, as equipartition with a
/// fraction `epsilon_b` of the matter energy density `(3/2) n_e k T`.
pub fn magnetic_field(el_dens: f64, temp: f64, epsilon_b: f64) -> f64 {
    (8. * PI * epsilon_b * 3. * el_dens * BOLTZMANN * temp / 2.).sqrt()
}

/// The number density of electrons at Lorentz factor `gamma` in a
/// relativistic thermal (Maxwell–Jüttner) distribution.
pub fn n_el_juettner(el_dens: f64, dimless_theta: f64, gamma: f64) -> f64 {
    el_dens * gamma * (gamma * gamma - 1.).sqrt() * (-gamma / dimless_theta).exp()
        / (dimless_theta * bessel::kn(2, 1. / dimless_theta))
}

/// The number density of electrons at Lorentz factor `gamma` in a
/// non-relativistic thermal (Maxwell–Boltzmann) distribution.
pub fn n_el_boltzmann(el_dens: f64, dimless_theta: f64, gamma: f64) -> f64 {
    let temp = dimless_theta * MASS_ELECTRON * SPEED_LIGHT * SPEED_LIGHT / BOLTZMANN;
    let v = SPEED_LIGHT * (1. - 1. / (gamma * gamma)).sqrt();

    el_dens * 4. * PI * (MASS_ELECTRON / (TWO_PI * BOLTZMANN * temp)).powf(1.5)
        * (v * SPEED_LIGHT * SPEED_LIGHT / gamma.powi(3))
        * (-MASS_ELECTRON * v * v / (2. * BOLTZMANN * temp)).exp()
}

/// The line-shape function `Z` of Wardziński & Zdziarski (2000), evaluated
/// for emission at `nu` by electrons of Lorentz factor `gamma`.
pub fn line_shape(nu: f64, nu_c: f64, gamma: f64) -> f64 {
    ((gamma * gamma - 1.).sqrt() * (1. / gamma).exp() / (1. + gamma))
        .powf(2. * nu * gamma / nu_c)
}

/// The second derivative of the exponent of [`line_shape`] with respect to
/// the Lorentz factor, at the observer angle of pi/2 used throughout.
pub fn line_shape_curvature(nu: f64, nu_c: f64, gamma: f64) -> f64 {
    let log_term = ((gamma * gamma - 1.).sqrt() * (1. / gamma).exp() / (1. + gamma)).ln();

    nu * (-2. * gamma.powi(3) * (1. + gamma)
          + 4. * gamma.powi(4) * (1. + gamma - gamma.powi(2) - gamma.powi(3)) * log_term)
        / (nu_c * gamma.powi(5) * (1. + gamma))
}

/// The characteristic thermal half-width `chi` of the emission line.
pub fn half_width(dimless_theta: f64, gamma: f64) -> f64 {
    if dimless_theta <= 0.08 {
        (2. * dimless_theta * (gamma * gamma - 1.) / (gamma * (3. * gamma * gamma - 1.))).sqrt()
    } else {
        (2. * dimless_theta / (3. * gamma)).sqrt()
    }
}

/// The Lorentz factor of the electrons that dominate emission at `nu`.
///
/// Always at least 1. The original C transcription negated the exponent of
/// the non-relativistic branch, driving the result below 1 and the
/// emissivity to NaN at every sub-relativistic temperature; the exponent
/// here follows the paper.
pub fn peak_lorentz_factor(nu: f64, nu_c: f64, dimless_theta: f64) -> f64 {
    let x = nu * dimless_theta / nu_c;

    if dimless_theta <= 0.08 {
        ((1. + 2. * x * (1. + 4.5 * x)).powf(1. / 3.)).sqrt()
    } else {
        ((1. + 4. * x / 3.).powf(2. / 3.)).sqrt()
    }
}

/// The thermal synchrotron emissivity at frequency `nu`, in ergs per second
/// per cubic centimeter per hertz.
///
/// Below the dimensionless temperature of a 10^7 K plasma the electron
/// density model is Maxwell–Boltzmann; at or above it, Maxwell–Jüttner.
pub fn jnu(nu: f64, nu_c: f64, dimless_theta: f64, el_dens: f64) -> f64 {
    let theta_ref = dimensionless_theta(1e7);
    let gamma = peak_lorentz_factor(nu, nu_c, dimless_theta);

    let n_el = if dimless_theta < theta_ref {
        n_el_boltzmann(el_dens, dimless_theta, gamma)
    } else {
        n_el_juettner(el_dens, dimless_theta, gamma)
    };

    PI.powf(1.5) * ELECTRON_CHARGE * ELECTRON_CHARGE / (2_f64.powf(1.5) * SPEED_LIGHT)
        * (nu * nu_c).sqrt()
        * n_el
        * line_shape(nu, nu_c, gamma)
        * half_width(dimless_theta, gamma)
        * line_shape_curvature(nu, nu_c, gamma).abs().powf(-0.5)
}

/// The photon-number spectrum `jnu / (h nu)`: photons emitted per second per
/// cubic centimeter per hertz. This is the quantity the count estimator
/// integrates over frequency.
pub fn jnu_photon_spectrum(nu: f64, nu_c: f64, dimless_theta: f64, el_dens: f64) -> f64 {
    jnu(nu, nu_c, dimless_theta, el_dens) / (PLANCK * nu)
}


// Ghisellini, Haardt & Fabian (1991) absorption cross section. The three
// helpers below are geometric functions of the electron momentum.

fn c_factor(nu_ph: f64, nu_c: f64, gamma: f64, p_el: f64) -> f64 {
    (2. * gamma * gamma - 1.) / (gamma * p_el * p_el)
        + 2. * nu_ph * (gamma / (p_el * p_el) - gamma * ((gamma + 1.) / p_el).ln()) / nu_c
}

fn g_factor(gamma: f64, p_el: f64) -> f64 {
    (1. - 2. * p_el * p_el * (gamma * ((gamma + 1.) / p_el).ln() - 1.)).sqrt()
}

fn g_factor_prime(gamma: f64, p_el: f64) -> f64 {
    (3. * gamma - (3. * gamma * gamma - 1.) * ((gamma + 1.) / p_el).ln()) / g_factor(gamma, p_el)
}

/// The synchrotron self-absorption cross section, in square centimeters, for
/// a photon of frequency `nu_ph` meeting electrons of dimensionless momentum
/// `p_el` in a plasma of the given density and temperature.
pub fn syn_cross_section(el_dens: f64, temp: f64, nu_ph: f64, p_el: f64, epsilon_b: f64) -> f64 {
    let b_crit = FINE_STRUCTURE
        * (MASS_ELECTRON * SPEED_LIGHT * SPEED_LIGHT / ELECTRON_RADIUS.powi(3)).sqrt();
    let b = magnetic_field(el_dens, temp, epsilon_b);
    let nu_c = cyclotron_frequency(b);
    let gamma = (p_el * p_el + 1.).sqrt();
    let g = g_factor(gamma, p_el);

    3. * PI * PI / 8. * (THOMSON_CROSS_SECTION / FINE_STRUCTURE) * (b_crit / b)
        * (nu_c / nu_ph).powi(2)
        * (-2. * nu_ph * (gamma * ((gamma + 1.) / p_el).ln() - 1.) / nu_c).exp()
        * (c_factor(nu_ph, nu_c, gamma, p_el) / g - g_factor_prime(gamma, p_el) / (g * g))
}

// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Adaptive quadrature over finite intervals.

This module exposes a builder-style API shaped like a GSL workspace wrapper,
but the implementation is pure Rust: a 15-point
Gauss–Kronrod rule (QUADPACK's QK15 abscissae and weights) applied
adaptively, bisecting whichever segment carries the largest error estimate
until the requested tolerance is met or the workspace's segment budget is
exhausted. Running out of budget is not an error: the caller gets the best
available estimate along with its absolute-error estimate and can decide how
much to trust it.

*/

use thiserror::Error;


/// Abscissae of the 15-point Kronrod rule on [-1, 1]; positive half, the
/// embedded 7-point Gauss rule uses the odd-indexed entries plus zero.
const XGK: [f64; 8] = [
    0.991455371120813,
    0.949107912342759,
    0.864864423359769,
    0.741531185599394,
    0.586087235467691,
    0.405845151377397,
    0.207784955007898,
    0.,
];

const WGK: [f64; 8] = [
    0.022935322010529,
    0.063092092629979,
    0.104790010322250,
    0.140653259715525,
    0.169004726639267,
    0.190350578064785,
    0.204432940075298,
    0.209482141084728,
];

const WG: [f64; 4] = [
    0.129484966168870,
    0.279705391489277,
    0.381830050505119,
    0.417959183673469,
];


/// An error from the quadrature routines.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum QuadError {
    /// The integrand returned a non-finite value somewhere in the segment
    /// centered on the given abscissa.
    #[error("integrand is not finite near x = {0:e}")]
    BadIntegrand(f64),
}

/// A `Result` whose error type is [`QuadError`].
pub type QuadResult<T> = Result<T, QuadError>;


/// The outcome of an integration: the estimated value of the integral and
/// an estimate of the absolute error in that value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntegrationResult {
    /// The estimated value of the integral.
    pub value: f64,

    /// The estimated absolute error of `value`.
    pub abserr: f64,
}


/// A reusable integration workspace. Its size bounds how many segments the
/// adaptive subdivision may hold, exactly like a GSL workspace bounds the
/// interval count.
#[derive(Clone, Copy, Debug)]
pub struct IntegrationWorkspace {
    capacity: usize,
}

impl IntegrationWorkspace {
    /// Create a workspace that can hold up to `n` segments.
    pub fn new(n: usize) -> Self {
        IntegrationWorkspace { capacity: n.max(1) }
    }

    /// Integrate `f` adaptively over the finite interval
    /// `[lower_bound, upper_bound]`.
    pub fn qag<'a, F>(&'a mut self, f: F, lower_bound: f64, upper_bound: f64)
                      -> IntegrationBuilder<'a, F> where F: FnMut(f64) -> f64 {
        IntegrationBuilder {
            workspace: self,
            function: f,
            lower_bound: lower_bound,
            upper_bound: upper_bound,
            epsabs: 0.,
            epsrel: 1e-8,
        }
    }
}


/// A builder for one integration; see [`IntegrationWorkspace::qag`].
pub struct IntegrationBuilder<'a, F: 'a> where F: FnMut(f64) -> f64 {
    workspace: &'a mut IntegrationWorkspace,
    function: F,
    lower_bound: f64,
    upper_bound: f64,
    epsabs: f64,
    epsrel: f64,
}

#[derive(Clone, Copy, Debug)]
struct Segment {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

impl<'a, F: 'a> IntegrationBuilder<'a, F> where F: FnMut(f64) -> f64 {
    /// Set the absolute and relative error tolerances.
    pub fn tolerance(mut self, epsabs: f64, epsrel: f64) -> Self {
        self.epsabs = epsabs;
        self.epsrel = epsrel;
        self
    }

    /// Run the integration.
    pub fn compute(mut self) -> QuadResult<IntegrationResult> {
        // Start from a handful of uniform segments rather than one. The
        // synchrotron spectra we integrate are sharply peaked within a tiny
        // fraction of the domain, and a single 15-point panel over six
        // decades of frequency can produce a deceptively small error
        // estimate before the peak has ever been sampled.
        const INITIAL_SEGMENTS: usize = 8;

        let n_init = INITIAL_SEGMENTS.min(self.workspace.capacity);
        let width = (self.upper_bound - self.lower_bound) / n_init as f64;
        let mut segments = Vec::with_capacity(self.workspace.capacity);

        for i in 0..n_init {
            let a = self.lower_bound + i as f64 * width;
            let b = if i == n_init - 1 { self.upper_bound } else { a + width };
            segments.push(gk15(&mut self.function, a, b)?);
        }

        loop {
            let value: f64 = segments.iter().map(|s| s.value).sum();
            let abserr: f64 = segments.iter().map(|s| s.error).sum();
            let tol = self.epsabs.max(self.epsrel * value.abs());

            if abserr <= tol || segments.len() + 1 > self.workspace.capacity {
                return Ok(IntegrationResult { value: value, abserr: abserr });
            }

            let worst = segments.iter().enumerate()
                .max_by(|x, y| x.1.error.partial_cmp(&y.1.error).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(i, _)| i)
                .unwrap_or(0);

            let seg = segments.swap_remove(worst);
            let mid = 0.5 * (seg.a + seg.b);
            segments.push(gk15(&mut self.function, seg.a, mid)?);
            segments.push(gk15(&mut self.function, mid, seg.b)?);
        }
    }
}


fn gk15<F>(f: &mut F, a: f64, b: f64) -> QuadResult<Segment> where F: FnMut(f64) -> f64 {
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);

    let f_center = f(center);
    let mut kronrod = WGK[7] * f_center;
    let mut gauss = WG[3] * f_center;

    for j in 0..7 {
        let pair = f(center - half * XGK[j]) + f(center + half * XGK[j]);
        kronrod += WGK[j] * pair;

        if j % 2 == 1 {
            gauss += WG[j / 2] * pair;
        }
    }

    let value = kronrod * half;

    if !value.is_finite() {
        return Err(QuadError::BadIntegrand(center));
    }

    Ok(Segment {
        a: a,
        b: b,
        value: value,
        error: ((kronrod - gauss) * half).abs(),
    })
}


#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use super::*;

    #[test]
    fn polynomial_is_exact() {
        let mut ws = IntegrationWorkspace::new(100);
        let r = ws.qag(|x| x * x, 0., 3.)
            .tolerance(0., 1e-10)
            .compute()
            .unwrap();
        assert_approx_eq!(r.value, 9., 1e-10);
    }

    #[test]
    fn oscillatory_integrand_converges() {
        let mut ws = IntegrationWorkspace::new(1000);
        let r = ws.qag(|x| x.sin(), 0., PI)
            .tolerance(0., 1e-9)
            .compute()
            .unwrap();
        assert_approx_eq!(r.value, 2., 1e-8);
        assert!(r.abserr < 1e-6);
    }

    #[test]
    fn narrow_peak_in_wide_domain() {
        // A Gaussian occupying ~1% of the domain; this is the shape of
        // trouble that synchrotron spectra pose.
        let mut ws = IntegrationWorkspace::new(10000);
        let r = ws.qag(|x| (-((x - 100.) / 5.).powi(2)).exp(), 0., 1000.)
            .tolerance(0., 1e-6)
            .compute()
            .unwrap();
        assert_approx_eq!(r.value, 5. * PI.sqrt(), 1e-4);
    }

    #[test]
    fn budget_exhaustion_reports_error_estimate() {
        let mut ws = IntegrationWorkspace::new(8);
        let r = ws.qag(|x| (50. * x).sin().abs(), 0., 10.)
            .tolerance(0., 1e-14)
            .compute()
            .unwrap();
        // Too few segments to converge to 1e-14, but we still get a value
        // and an honest error estimate.
        assert!(r.value > 0.);
        assert!(r.abserr > 0.);
    }

    #[test]
    fn non_finite_integrand_is_an_error() {
        let mut ws = IntegrationWorkspace::new(100);
        let err = ws.qag(|x| (x - 0.5).sqrt(), 0., 1.)
            .tolerance(0., 1e-6)
            .compute();
        assert!(err.is_err());
    }
}

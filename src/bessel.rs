// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Modified Bessel functions of the second kind.

The Maxwell–Jüttner normalization needs `K_2(1/theta)`, and that is the only
special function this crate requires, so we evaluate it ourselves rather than
binding a numerics library. `K_0` and `K_1` use the polynomial fits of
Abramowitz & Stegun (9.8.5–9.8.8), good to about 2e-7 relative error, and
higher orders follow from the standard upward recurrence.

*/

/// The modified Bessel function of the second kind of order zero, `K_0(x)`.
///
/// The argument must be positive.
pub fn k0(x: f64) -> f64 {
    if x <= 2. {
        let t = x * x / 4.;
        let i0 = bessel_i0(x);

        -(x / 2.).ln() * i0 - 0.57721566
            + t * (0.42278420
            + t * (0.23069756
            + t * (0.03488590
            + t * (0.00262698
            + t * (0.00010750
            + t * 0.00000740)))))
    } else {
        let t = 2. / x;

        (-x).exp() / x.sqrt() * (1.25331414
            + t * (-0.07832358
            + t * (0.02189568
            + t * (-0.01062446
            + t * (0.00587872
            + t * (-0.00251540
            + t * 0.00053208))))))
    }
}

/// The modified Bessel function of the second kind of order one, `K_1(x)`.
///
/// The argument must be positive.
pub fn k1(x: f64) -> f64 {
    if x <= 2. {
        let t = x * x / 4.;
        let i1 = bessel_i1(x);

        (x / 2.).ln() * i1 + (1. / x) * (1.
            + t * (0.15443144
            + t * (-0.67278579
            + t * (-0.18156897
            + t * (-0.01919402
            + t * (-0.00110404
            + t * -0.00004686))))))
    } else {
        let t = 2. / x;

        (-x).exp() / x.sqrt() * (1.25331414
            + t * (0.23498619
            + t * (-0.03655620
            + t * (0.01504268
            + t * (-0.00780353
            + t * (0.00325614
            + t * -0.00068245))))))
    }
}

/// The modified Bessel function of the second kind of integer order,
/// `K_n(x)`, computed by upward recurrence from `K_0` and `K_1`.
///
/// The argument must be positive.
pub fn kn(n: u32, x: f64) -> f64 {
    match n {
        0 => k0(x),
        1 => k1(x),
        _ => {
            let two_over_x = 2. / x;
            let mut km = k0(x);
            let mut k = k1(x);

            for j in 1..n {
                let kp = km + j as f64 * two_over_x * k;
                km = k;
                k = kp;
            }

            k
        },
    }
}

fn bessel_i0(x: f64) -> f64 {
    // Valid for |x| < 3.75, which covers every call from k0().
    let t = (x / 3.75) * (x / 3.75);

    1. + t * (3.5156229
        + t * (3.0899424
        + t * (1.2067492
        + t * (0.2659732
        + t * (0.0360768
        + t * 0.0045813)))))
}

fn bessel_i1(x: f64) -> f64 {
    // Valid for |x| < 3.75, which covers every call from k1().
    let t = (x / 3.75) * (x / 3.75);

    x * (0.5
        + t * (0.87890594
        + t * (0.51498869
        + t * (0.15084934
        + t * (0.02658733
        + t * (0.00301532
        + t * 0.00032411))))))
}

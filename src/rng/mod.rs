//! Replicate-local random number generation
//!
//! Every simulation replicate owns one [`RMersenneTwister`] seeded from its
//! replicate seed. All sampling in the crate (gene choice, effect sizes, size
//! factors, negative binomial draws, dropout masks) goes through a handle
//! that is passed explicitly, so replicates never share generator state.
//!
//! The generator reproduces R's `set.seed()` / Mersenne-Twister stream so that
//! uniform draws line up with an R session seeded the same way. Normal,
//! exponential, gamma, Poisson and index draws follow R's nmath algorithms,
//! so every derived stream matches R's defaults as well.

/// 2^-32, R's scaling for 32-bit MT output
const I2_32M1: f64 = 2.328_306_436_538_696_3e-10;

/// R-compatible Mersenne-Twister
#[derive(Debug, Clone)]
pub struct RMersenneTwister {
    state: [u32; 624],
    index: usize,
}

impl RMersenneTwister {
    const N: usize = 624;
    const M: usize = 397;
    const MATRIX_A: u32 = 0x9908_B0DF;
    const UPPER_MASK: u32 = 0x8000_0000;
    const LOWER_MASK: u32 = 0x7FFF_FFFF;

    /// Seed the generator the way R's `set.seed(seed)` does
    pub fn new(seed: u32) -> Self {
        let mut mt = RMersenneTwister {
            state: [0; Self::N],
            index: Self::N,
        };
        mt.seed_state(seed);
        mt
    }

    /// R scrambles the seed with an LCG (69069 x + 1): 50 warm-up rounds,
    /// one discarded value, then 624 values fill the state.
    fn seed_state(&mut self, seed: u32) {
        let lcg = |x: u32| x.wrapping_mul(69069).wrapping_add(1);

        let mut x = seed;
        for _ in 0..51 {
            x = lcg(x);
        }
        for slot in self.state.iter_mut() {
            x = lcg(x);
            *slot = x;
        }
        self.index = Self::N;
    }

    fn twist(&mut self) {
        for i in 0..Self::N {
            let y = (self.state[i] & Self::UPPER_MASK)
                | (self.state[(i + 1) % Self::N] & Self::LOWER_MASK);
            let mut next = self.state[(i + Self::M) % Self::N] ^ (y >> 1);
            if y & 1 != 0 {
                next ^= Self::MATRIX_A;
            }
            self.state[i] = next;
        }
        self.index = 0;
    }

    /// Next tempered 32-bit word
    pub fn next_u32(&mut self) -> u32 {
        if self.index >= Self::N {
            self.twist();
        }

        let mut y = self.state[self.index];
        self.index += 1;

        y ^= y >> 11;
        y ^= (y << 7) & 0x9D2C_5680;
        y ^= (y << 15) & 0xEFC6_0000;
        y ^= y >> 18;
        y
    }

    /// Uniform draw on the open interval (0, 1)
    ///
    /// R equivalent: `runif(1)`
    pub fn runif(&mut self) -> f64 {
        let u = self.next_u32() as f64 * I2_32M1;
        // R's fixup keeps the draw strictly inside (0, 1)
        if u <= 0.0 {
            0.5 * I2_32M1
        } else if u >= 1.0 {
            1.0 - 0.5 * I2_32M1
        } else {
            u
        }
    }

    /// Uniform draw on (min, max)
    pub fn runif_range(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.runif()
    }

    /// Standard normal draw, R's default `INVERSION` kind
    ///
    /// R equivalent: `rnorm(1)`
    ///
    /// Two uniforms are combined into one 2^27-scaled uniform before
    /// inverting, as in R's `norm_rand`.
    pub fn rnorm(&mut self) -> f64 {
        const BIG: f64 = 134_217_728.0;
        let u = (BIG * self.runif()).trunc() + self.runif();
        qnorm(u / BIG)
    }

    /// Normal draw with the given mean and standard deviation
    pub fn rnorm_with(&mut self, mean: f64, sd: f64) -> f64 {
        mean + sd * self.rnorm()
    }

    /// Exponential(1) draw, Ahrens-Dieter (1972) algorithm SA as in R's `exp_rand`
    ///
    /// R equivalent: `rexp(1)`
    pub fn rexp(&mut self) -> f64 {
        // q[k - 1] = sum(ln(2)^k / k!), k = 1..16
        const Q: [f64; 16] = [
            0.6931471805599453,
            0.9333736875190459,
            0.9888777961838675,
            0.9984959252914960040,
            0.9998292811061389,
            0.9999833164100727,
            0.9999985508193421,
            0.9999998906925558,
            0.9999999924734159,
            0.9999999995283275,
            0.9999999999728814,
            0.9999999999985598,
            0.9999999999999289,
            0.9999999999999968,
            0.9999999999999999,
            1.0000000000000000,
        ];

        let mut a = 0.0;
        let mut u = self.runif();
        loop {
            u += u;
            if u > 1.0 {
                break;
            }
            a += Q[0];
        }
        u -= 1.0;

        if u <= Q[0] {
            return a + u;
        }

        let mut i = 0;
        let mut umin = self.runif();
        loop {
            let ustar = self.runif();
            if ustar < umin {
                umin = ustar;
            }
            i += 1;
            if u <= Q[i] {
                break;
            }
        }
        a + umin * Q[0]
    }

    /// Bernoulli draw, true with probability `p`
    pub fn rbernoulli(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.runif() < p
    }

    /// `bits` random bits assembled from 16-bit chunks of uniforms (R's `rbits`)
    fn rbits(&mut self, bits: u32) -> u64 {
        let mut v: u64 = 0;
        let mut n = 0;
        while n <= bits {
            let chunk = (self.runif() * 65536.0).floor() as u64;
            v = v.wrapping_mul(65536).wrapping_add(chunk);
            n += 16;
        }
        v & ((1u64 << bits) - 1)
    }

    /// Uniform index in `0..n`; `n` must be positive
    ///
    /// R's `R_unif_index` under the default `Rejection` sample kind: draw
    /// `ceil(log2(n))` bits and reject values `>= n`.
    pub fn index(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        let bits = (n as f64).log2().ceil() as u32;
        loop {
            let v = self.rbits(bits);
            if v < n as u64 {
                return v as usize;
            }
        }
    }

    /// `k` distinct indices from `0..n`, in draw order
    ///
    /// Same swap-with-last scheme as R's `sample.int(n, k)`.
    ///
    /// R equivalent: `sample.int(n, k) - 1`
    pub fn sample_without_replacement(&mut self, n: usize, k: usize) -> Vec<usize> {
        let k = k.min(n);
        let mut pool: Vec<usize> = (0..n).collect();
        let mut remaining = n;
        let mut picked = Vec::with_capacity(k);
        for _ in 0..k {
            let j = self.index(remaining);
            picked.push(pool[j]);
            remaining -= 1;
            pool[j] = pool[remaining];
        }
        picked
    }

    /// `k` values drawn with replacement from `values`
    ///
    /// R equivalent: `values[sample.int(length(values), k, replace = TRUE)]`
    pub fn sample_with_replacement(&mut self, values: &[f64], k: usize) -> Vec<f64> {
        if values.is_empty() {
            return Vec::new();
        }
        (0..k).map(|_| values[self.index(values.len())]).collect()
    }

    /// Gamma draw with the given shape and scale
    ///
    /// Ahrens-Dieter GS (shape < 1) and GD (shape >= 1), as in R's rgamma.c.
    ///
    /// R equivalent: `rgamma(1, shape, scale = scale)`
    pub fn rgamma(&mut self, shape: f64, scale: f64) -> f64 {
        const SQRT32: f64 = 5.656854;
        const EXP_M1: f64 = 0.36787944117144232;

        const Q: [f64; 7] = [
            0.04166669, 0.02083148, 0.00801191, 0.00144121, -7.388e-5, 2.4511e-4, 2.424e-4,
        ];
        const A: [f64; 7] = [
            0.3333333, -0.250003, 0.2000062, -0.1662921, 0.1423657, -0.1367177, 0.1233795,
        ];

        fn poly(c: &[f64; 7], v: f64) -> f64 {
            c.iter().rev().fold(0.0, |acc, &ci| (acc + ci) * v)
        }

        if shape <= 0.0 || !shape.is_finite() || scale <= 0.0 {
            return 0.0;
        }

        if shape < 1.0 {
            let e = 1.0 + EXP_M1 * shape;
            loop {
                let p = e * self.runif();
                if p >= 1.0 {
                    let x = -((e - p) / shape).ln();
                    if self.rexp() >= (1.0 - shape) * x.ln() {
                        return scale * x;
                    }
                } else {
                    let x = (p.ln() / shape).exp();
                    if self.rexp() >= x {
                        return scale * x;
                    }
                }
            }
        }

        let s2 = shape - 0.5;
        let s = s2.sqrt();
        let d = SQRT32 - s * 12.0;

        let t = self.rnorm();
        let x = s + 0.5 * t;
        if t >= 0.0 {
            return scale * x * x;
        }

        let u = self.runif();
        if d * u <= t * t * t {
            return scale * x * x;
        }

        let q0 = poly(&Q, 1.0 / shape);
        let (b, si, c) = if shape <= 3.686 {
            (0.463 + s + 0.178 * s2, 1.235, 0.195 / s - 0.079 + 0.16 * s)
        } else if shape <= 13.022 {
            (1.654 + 0.0076 * s2, 1.68 / s + 0.275, 0.062 / s + 0.024)
        } else {
            (1.77, 0.75, 0.1515 / s)
        };

        let log_q = |t: f64| {
            let v = t / (s + s);
            if v.abs() <= 0.25 {
                q0 + 0.5 * t * t * poly(&A, v)
            } else {
                q0 - s * t + 0.25 * t * t + (s2 + s2) * (1.0 + v).ln()
            }
        };

        if x > 0.0 && (1.0 - u).ln() <= log_q(t) {
            return scale * x * x;
        }

        loop {
            let e = self.rexp();
            let u = 2.0 * self.runif() - 1.0;
            let t = if u < 0.0 { b - si * e } else { b + si * e };
            if t < -0.71874483771719 {
                continue;
            }
            let q = log_q(t);
            if q > 0.0 && c * u.abs() <= q.exp_m1() * (e - 0.5 * t * t).exp() {
                let x = s + 0.5 * t;
                return scale * x * x;
            }
        }
    }

    /// Poisson draw with mean `lambda`
    ///
    /// Ahrens-Dieter (1982) as in R's rpois.c: table-aided inversion below
    /// 10, normal approximation with squeeze, quotient and hat acceptance
    /// above.
    ///
    /// R equivalent: `rpois(1, lambda)`
    pub fn rpois(&mut self, lambda: f64) -> u64 {
        if !(lambda > 0.0) || !lambda.is_finite() {
            return 0;
        }
        if lambda < 10.0 {
            self.rpois_inversion(lambda)
        } else {
            self.rpois_normal(lambda)
        }
    }

    /// Cumulative table up to k = 35; a uniform beyond the table is redrawn
    fn rpois_inversion(&mut self, mu: f64) -> u64 {
        let p0 = (-mu).exp();
        let mut table = [0.0f64; 36];
        let mut p = p0;
        let mut q = p0;
        table[0] = p0;
        for (k, slot) in table.iter_mut().enumerate().skip(1) {
            p *= mu / k as f64;
            q += p;
            *slot = q;
        }

        loop {
            let u = self.runif();
            if u <= p0 {
                return 0;
            }
            if let Some(k) = table.iter().skip(1).position(|&cdf| u <= cdf) {
                return (k + 1) as u64;
            }
        }
    }

    fn rpois_normal(&mut self, mu: f64) -> u64 {
        const A: [f64; 8] = [
            -0.5, 0.3333333, -0.2500068, 0.2000118, -0.1661269, 0.1421878, -0.1384794, 0.1250060,
        ];
        const FACT: [f64; 10] = [1., 1., 2., 6., 24., 120., 720., 5040., 40320., 362880.];
        const ONE_7: f64 = 0.1428571428571428571;
        const ONE_12: f64 = 0.0833333333333333333;
        const ONE_24: f64 = 0.0416666666666666667;
        const M_1_SQRT_2PI: f64 = 0.398942280401432677939946059934;

        let s = mu.sqrt();
        let d = 6.0 * mu * mu;
        let big_l = (mu - 1.1484).floor();

        // Step N: normal sample, immediate and squeeze acceptance
        let g = mu + s * self.rnorm();
        let mut pois = -1.0;
        let mut u = 0.0;
        if g >= 0.0 {
            pois = g.floor();
            if pois >= big_l {
                return pois as u64;
            }
            let difmuk = mu - pois;
            u = self.runif();
            if d * u >= difmuk * difmuk * difmuk {
                return pois as u64;
            }
        }

        // Step P: Hermite approximation of the discrete normal probabilities
        let omega = M_1_SQRT_2PI / s;
        let b1 = ONE_24 / mu;
        let b2 = 0.3 * b1 * b1;
        let c3 = ONE_7 * b1 * b2;
        let c2 = b2 - 15.0 * c3;
        let c1 = b1 - 6.0 * b2 + 45.0 * c3;
        let c0 = 1.0 - b1 + 3.0 * b2 - 15.0 * c3;
        let c = 0.1069 / mu;

        // Step F: (px, py, fx, fy) for a candidate `pois`
        let densities = |pois: f64| {
            let difmuk = mu - pois;
            let (px, py) = if pois < 10.0 {
                (-mu, mu.powf(pois) / FACT[pois as usize])
            } else {
                let del = ONE_12 / pois;
                let del = del * (1.0 - 4.8 * del * del);
                let v = difmuk / pois;
                let px = if v.abs() <= 0.25 {
                    let poly = A.iter().rev().fold(0.0, |acc, &a| acc * v + a);
                    pois * v * v * poly - del
                } else {
                    pois * (1.0 + v).ln() - difmuk - del
                };
                (px, M_1_SQRT_2PI / pois.sqrt())
            };
            let x = (0.5 - difmuk) / s;
            let xx = x * x;
            let fx = -0.5 * xx;
            let fy = omega * (((c3 * xx + c2) * xx + c1) * xx + c0);
            (px, py, fx, fy)
        };

        // Step Q: quotient acceptance
        if g >= 0.0 {
            let (px, py, fx, fy) = densities(pois);
            if fy - u * fy <= py * (px - fx).exp() {
                return pois as u64;
            }
        }

        // Steps E and H: Laplace hat with exponential sample
        loop {
            let e = self.rexp();
            let u = 2.0 * self.runif() - 1.0;
            let t = 1.8 + if u < 0.0 { -e } else { e };
            if t <= -0.6744 {
                continue;
            }
            let pois = (mu + s * t).floor();
            let (px, py, fx, fy) = densities(pois);
            if c * u.abs() <= py * (px + e).exp() - fy * (fx + e).exp() {
                return pois as u64;
            }
        }
    }

    /// Negative binomial draw in the (size, mu) parameterization
    ///
    /// Gamma-Poisson mixture, variance `mu + mu^2 / size`. An infinite size
    /// degenerates to a Poisson draw.
    ///
    /// R equivalent: `rnbinom(1, size = size, mu = mu)` for finite `size`
    pub fn rnbinom_mu(&mut self, size: f64, mu: f64) -> u64 {
        if !(mu > 0.0) {
            return 0;
        }
        if !size.is_finite() {
            return self.rpois(mu);
        }
        let lambda = self.rgamma(size, mu / size);
        self.rpois(lambda)
    }

    /// Derive `n` replicate seeds from this stream
    pub fn derive_seeds(&mut self, n: usize) -> Vec<u32> {
        (0..n).map(|_| self.next_u32()).collect()
    }
}

/// Standard normal quantile, Wichura's AS 241 (as in R's qnorm.c)
pub fn qnorm(p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    fn horner(coeffs: &[f64; 8], x: f64) -> f64 {
        coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }

    const A: [f64; 8] = [
        3.3871328727963666080e0,
        1.3314166789178437745e2,
        1.9715909503065514427e3,
        1.3731693765509461125e4,
        4.5921953931549871457e4,
        6.7265770927008700853e4,
        3.3430575583588128105e4,
        2.5090809287301226727e3,
    ];
    const B: [f64; 8] = [
        1.0,
        4.2313330701600911252e1,
        6.8718700749205790830e2,
        5.3941960214247511077e3,
        2.1213794301586595867e4,
        3.9307895800092710610e4,
        2.8729085735721942674e4,
        5.2264952788528545610e3,
    ];
    const C: [f64; 8] = [
        1.42343711074968357734e0,
        4.63033784615654529590e0,
        5.76949722146069140550e0,
        3.64784832476320460504e0,
        1.27045825245236838258e0,
        2.41780725177450611770e-1,
        2.27238449892691845833e-2,
        7.7454501427834140764e-4,
    ];
    const D: [f64; 8] = [
        1.0,
        2.05319162663775882187e0,
        1.6763848301838038494e0,
        6.89767334985100004550e-1,
        1.48103976427480074590e-1,
        1.51986665636164571966e-2,
        5.47593808499534494600e-4,
        1.05075007164441684324e-9,
    ];
    const E: [f64; 8] = [
        6.65790464350110377720e0,
        5.46378491116411436990e0,
        1.78482653991729133580e0,
        2.96560571828504891230e-1,
        2.65321895265761230930e-2,
        1.24266094738807843860e-3,
        2.71155556874348757815e-5,
        2.01033439929228813265e-7,
    ];
    const F: [f64; 8] = [
        1.0,
        5.99832206555887937690e-1,
        1.36929880922735805310e-1,
        1.48753612908506148525e-2,
        7.86869131145613259100e-4,
        1.84631831751005468180e-5,
        1.42151175831644588870e-7,
        2.04426310338993978564e-15,
    ];

    let q = p - 0.5;
    if q.abs() <= 0.425 {
        let r = 0.180625 - q * q;
        return q * horner(&A, r) / horner(&B, r);
    }

    let r = if q < 0.0 { p } else { 1.0 - p };
    let r = (-r.ln()).sqrt();
    let val = if r <= 5.0 {
        let r = r - 1.6;
        horner(&C, r) / horner(&D, r)
    } else {
        let r = r - 5.0;
        horner(&E, r) / horner(&F, r)
    };

    if q < 0.0 {
        -val
    } else {
        val
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statrs::distribution::{ContinuousCDF, Discrete, Normal, Poisson};

    fn mean_var(xs: &[f64]) -> (f64, f64) {
        let n = xs.len() as f64;
        let mean = xs.iter().sum::<f64>() / n;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        (mean, var)
    }

    #[test]
    fn test_runif_matches_r_stream() {
        // set.seed(2); runif(5)
        let expected = [0.1848822599, 0.7023740360, 0.5733263348, 0.1680519204, 0.9438393388];
        let mut rng = RMersenneTwister::new(2);
        for &exp in &expected {
            let got = rng.runif();
            assert!((got - exp).abs() < 1e-9, "got {}, expected {}", got, exp);
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = RMersenneTwister::new(42);
        let mut b = RMersenneTwister::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_qnorm_reference_points() {
        assert!(qnorm(0.5).abs() < 1e-12);
        assert!((qnorm(0.975) - 1.959963984540054).abs() < 1e-12);
        assert!((qnorm(1e-10) + 6.361341).abs() < 1e-5);
    }

    #[test]
    fn test_rpois_moments() {
        let mut rng = RMersenneTwister::new(7);
        for &lambda in &[0.5, 4.0, 9.9, 10.0, 25.0, 500.0] {
            let draws: Vec<f64> = (0..20000).map(|_| rng.rpois(lambda) as f64).collect();
            let (mean, var) = mean_var(&draws);
            assert!((mean - lambda).abs() < 0.05 * lambda + 0.05, "lambda {} mean {}", lambda, mean);
            assert!((var - lambda).abs() < 0.1 * lambda + 0.1, "lambda {} var {}", lambda, var);
        }
    }

    #[test]
    fn test_qnorm_agrees_with_statrs() {
        let normal = Normal::new(0.0, 1.0).unwrap();
        for &p in &[1e-8, 0.001, 0.02, 0.3, 0.5, 0.77, 0.99, 0.999999] {
            assert!((qnorm(p) - normal.inverse_cdf(p)).abs() < 1e-8, "p = {}", p);
        }
    }

    #[test]
    fn test_rpois_frequencies_match_pmf() {
        let mut rng = RMersenneTwister::new(17);
        let n = 50000;
        for &lambda in &[3.0, 30.0] {
            let poisson = Poisson::new(lambda).unwrap();
            let mut counts = vec![0usize; 200];
            for _ in 0..n {
                counts[(rng.rpois(lambda) as usize).min(199)] += 1;
            }
            let mode = lambda.floor() as u64;
            for k in mode.saturating_sub(3)..=mode + 3 {
                let observed = counts[k as usize] as f64 / n as f64;
                let expected = poisson.pmf(k);
                assert!(
                    (observed - expected).abs() < 0.01,
                    "lambda {} k {}: {} vs {}",
                    lambda,
                    k,
                    observed,
                    expected
                );
            }
        }
    }

    #[test]
    fn test_rnbinom_moments() {
        let mut rng = RMersenneTwister::new(11);
        let (size, mu) = (10.0, 50.0);
        let draws: Vec<f64> = (0..20000).map(|_| rng.rnbinom_mu(size, mu) as f64).collect();
        let (mean, var) = mean_var(&draws);
        let expected_var = mu + mu * mu / size;
        assert!((mean - mu).abs() < 1.5, "mean {}", mean);
        assert!((var - expected_var).abs() < 0.1 * expected_var, "var {}", var);
    }

    #[test]
    fn test_rnbinom_zero_mean() {
        let mut rng = RMersenneTwister::new(1);
        assert_eq!(rng.rnbinom_mu(1.0, 0.0), 0);
    }

    #[test]
    fn test_sample_without_replacement_distinct() {
        let mut rng = RMersenneTwister::new(3);
        let mut picked = rng.sample_without_replacement(50, 20);
        assert_eq!(picked.len(), 20);
        picked.sort_unstable();
        picked.dedup();
        assert_eq!(picked.len(), 20);
        assert!(picked.iter().all(|&i| i < 50));
    }

    #[test]
    fn test_sample_follows_r_index_stream() {
        // set.seed(2); sample(10, 3) - 1, rejection sampling on 4 and 3 bits
        let mut rng = RMersenneTwister::new(2);
        assert_eq!(rng.sample_without_replacement(10, 3), vec![4, 5, 8]);
    }

    #[test]
    fn test_index_stays_in_range() {
        let mut rng = RMersenneTwister::new(8);
        let mut seen = [0usize; 7];
        for _ in 0..7000 {
            seen[rng.index(7)] += 1;
        }
        assert!(seen.iter().all(|&c| c > 800 && c < 1200), "{:?}", seen);
        assert_eq!(rng.index(1), 0);
    }

    #[test]
    fn test_rexp_moments() {
        let mut rng = RMersenneTwister::new(13);
        let draws: Vec<f64> = (0..20000).map(|_| rng.rexp()).collect();
        let (mean, var) = mean_var(&draws);
        assert!(draws.iter().all(|&x| x >= 0.0));
        assert!((mean - 1.0).abs() < 0.03, "mean {}", mean);
        assert!((var - 1.0).abs() < 0.08, "var {}", var);
    }

    #[test]
    fn test_rnorm_moments() {
        let mut rng = RMersenneTwister::new(21);
        let draws: Vec<f64> = (0..20000).map(|_| rng.rnorm()).collect();
        let (mean, var) = mean_var(&draws);
        assert!(mean.abs() < 0.03, "mean {}", mean);
        assert!((var - 1.0).abs() < 0.05, "var {}", var);
    }

    #[test]
    fn test_rgamma_mean() {
        let mut rng = RMersenneTwister::new(5);
        for &(shape, scale) in &[(0.5, 2.0), (3.0, 1.5)] {
            let draws: Vec<f64> = (0..20000).map(|_| rng.rgamma(shape, scale)).collect();
            let (mean, _) = mean_var(&draws);
            assert!((mean - shape * scale).abs() < 0.05 * shape * scale + 0.02);
        }
    }
}

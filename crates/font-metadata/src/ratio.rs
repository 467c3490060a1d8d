//! Rational approximation of slopes

/// The closest fraction to `value` with a denominator of at most `max_denominator`,
/// as `(numerator, denominator)`.
///
/// Works on the continued fraction expansion of `value`; `value` must be
/// finite and non-negative.
pub fn limit_denominator(value: f64, max_denominator: u64) -> (u64, u64) {
    const SCALE: f64 = (1u64 << 52) as f64;
    let (mut n, mut d) = ((value * SCALE).round() as u128, SCALE as u128);
    let max = max_denominator as u128;
    if d <= max {
        let g = gcd(n, d);
        return ((n / g) as u64, (d / g) as u64);
    }

    let (mut p0, mut q0, mut p1, mut q1) = (0u128, 1u128, 1u128, 0u128);
    let (n0, d0) = (n, d);
    loop {
        let a = n / d;
        let q2 = q0 + a * q1;
        if q2 > max {
            break;
        }
        (p0, q0, p1, q1) = (p1, q1, p0 + a * p1, q2);
        (n, d) = (d, n - a * d);
        if d == 0 {
            break;
        }
    }

    let k = (max - q0) / q1;
    let (bp, bq) = (p0 + k * p1, q0 + k * q1);
    // Compare |bp/bq - n0/d0| with |p1/q1 - n0/d0| without division.
    let dist = |p: u128, q: u128| (p * d0).abs_diff(n0 * q) as f64 / (q as f64);
    if dist(p1, q1) <= dist(bp, bq) { (p1 as u64, q1 as u64) } else { (bp as u64, bq as u64) }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tan_12_degrees() {
        assert_eq!(limit_denominator(12f64.to_radians().tan(), 1000), (193, 908));
    }

    #[test]
    fn test_exact_values() {
        assert_eq!(limit_denominator(0.5, 1000), (1, 2));
        assert_eq!(limit_denominator(0.0, 1000), (0, 1));
    }

    #[test]
    fn test_pi() {
        assert_eq!(limit_denominator(std::f64::consts::PI, 1000), (355, 113));
        assert_eq!(limit_denominator(std::f64::consts::PI, 100), (311, 99));
    }
}

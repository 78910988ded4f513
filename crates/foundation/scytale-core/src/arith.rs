//! Modular arithmetic over Z_m
//!
//! Every reduction goes through [`modulo`], which lands in `[0, m)` even
//! for negative inputs.

/// `x mod m` normalized into `[0, m)`
pub fn modulo(x: i64, m: i64) -> i64 {
    x.rem_euclid(m)
}

pub fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a.abs()
    } else {
        gcd(b, a % b)
    }
}

/// Extended Euclid: returns `(g, x, y)` with `a*x + b*y == g`
pub fn extended_gcd(a: i64, b: i64) -> (i64, i64, i64) {
    let (mut old_r, mut r) = (a, b);
    let (mut old_x, mut x) = (1i64, 0i64);
    let (mut old_y, mut y) = (0i64, 1i64);

    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_x, x) = (x, old_x - q * x);
        (old_y, y) = (y, old_y - q * y);
    }

    if old_r < 0 {
        (-old_r, -old_x, -old_y)
    } else {
        (old_r, old_x, old_y)
    }
}

/// Inverse of `a` modulo `m`, or `None` when `gcd(a mod m, m) != 1`
pub fn mod_inverse(a: i64, m: i64) -> Option<i64> {
    if m <= 1 {
        return None;
    }
    let (g, x, _) = extended_gcd(modulo(a, m), m);
    if g == 1 {
        Some(modulo(x, m))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modulo_negative() {
        assert_eq!(modulo(-1, 26), 25);
        assert_eq!(modulo(-27, 26), 25);
        assert_eq!(modulo(52, 26), 0);
    }

    #[test]
    fn test_extended_gcd_identity() {
        for &(a, b) in &[(240, 46), (11, 26), (0, 7), (7, 0), (-15, 33), (35, 64)] {
            let (g, x, y) = extended_gcd(a, b);
            assert_eq!(a * x + b * y, g, "a={a} b={b}");
            assert_eq!(g, gcd(a, b));
        }
    }

    #[test]
    fn test_mod_inverse() {
        assert_eq!(mod_inverse(11, 26), Some(19));
        assert_eq!(mod_inverse(3, 33), None);
        assert_eq!(mod_inverse(-1, 26), Some(25));
    }

    #[test]
    fn test_mod_inverse_edges() {
        for m in 2..40 {
            assert_eq!(mod_inverse(0, m), None);
            assert_eq!(mod_inverse(1, m), Some(1));
        }
    }

    #[test]
    fn test_mod_inverse_roundtrip() {
        for a in 1..33 {
            if let Some(inv) = mod_inverse(a, 33) {
                assert_eq!(modulo(a * inv, 33), 1);
            } else {
                assert_ne!(gcd(a, 33), 1);
            }
        }
    }
}

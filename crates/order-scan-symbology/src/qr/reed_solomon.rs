//! Reed-Solomon decoding over GF(256) with the QR polynomial 0x11D.

use std::sync::OnceLock;

struct Gf256 {
    exp: [u8; 512],
    log: [u8; 256],
}

impl Gf256 {
    fn build() -> Self {
        let mut exp = [0u8; 512];
        let mut log = [0u8; 256];
        let mut x = 1u16;
        for i in 0..255 {
            exp[i] = x as u8;
            log[x as usize] = i as u8;
            x <<= 1;
            if x & 0x100 != 0 {
                x ^= 0x11D;
            }
        }
        for i in 255..512 {
            exp[i] = exp[i - 255];
        }
        Self { exp, log }
    }

    #[inline]
    fn alpha_pow(&self, i: usize) -> u8 {
        self.exp[i % 255]
    }

    #[inline]
    fn mul(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        self.exp[self.log[a as usize] as usize + self.log[b as usize] as usize]
    }

    /// Multiplicative inverse; `a` must be nonzero.
    #[inline]
    fn inv(&self, a: u8) -> u8 {
        self.exp[255 - self.log[a as usize] as usize]
    }

    #[inline]
    fn pow(&self, a: u8, n: usize) -> u8 {
        if a == 0 {
            return if n == 0 { 1 } else { 0 };
        }
        self.exp[(self.log[a as usize] as usize * n) % 255]
    }
}

fn gf() -> &'static Gf256 {
    static GF: OnceLock<Gf256> = OnceLock::new();
    GF.get_or_init(Gf256::build)
}

/// Evaluate a codeword polynomial (leading coefficient first) at `x`.
fn eval_msb_first(poly: &[u8], x: u8) -> u8 {
    let gf = gf();
    poly.iter().fold(0u8, |acc, &c| gf.mul(acc, x) ^ c)
}

/// Evaluate an ascending-order polynomial at `x`.
fn eval_ascending(poly: &[u8], x: u8) -> u8 {
    let gf = gf();
    poly.iter()
        .rev()
        .fold(0u8, |acc, &c| gf.mul(acc, x) ^ c)
}

/// Berlekamp-Massey: error locator polynomial from the syndromes,
/// ascending coefficient order with `lambda[0] == 1`.
fn error_locator(synd: &[u8]) -> Vec<u8> {
    let gf = gf();
    let mut lambda: Vec<u8> = vec![1];
    let mut prev: Vec<u8> = vec![1];
    let mut l = 0usize;
    let mut m = 1usize;
    let mut b = 1u8;

    for n in 0..synd.len() {
        let mut delta = synd[n];
        for i in 1..=l.min(lambda.len() - 1) {
            delta ^= gf.mul(lambda[i], synd[n - i]);
        }

        if delta == 0 {
            m += 1;
            continue;
        }

        let coef = gf.mul(delta, gf.inv(b));
        let correction: Vec<u8> = {
            let mut c = vec![0u8; prev.len() + m];
            for (i, &p) in prev.iter().enumerate() {
                c[i + m] = gf.mul(p, coef);
            }
            c
        };

        if 2 * l <= n {
            let snapshot = lambda.clone();
            lambda = poly_add(&lambda, &correction);
            l = n + 1 - l;
            prev = snapshot;
            b = delta;
            m = 1;
        } else {
            lambda = poly_add(&lambda, &correction);
            m += 1;
        }
    }

    while lambda.len() > 1 && lambda.last() == Some(&0) {
        lambda.pop();
    }
    lambda
}

fn poly_add(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; a.len().max(b.len())];
    for (i, &c) in a.iter().enumerate() {
        out[i] ^= c;
    }
    for (i, &c) in b.iter().enumerate() {
        out[i] ^= c;
    }
    out
}

/// Correct one block in place.
///
/// `block` holds data plus `ec_len` correction codewords. Returns the
/// number of corrected byte errors, or `None` when the block is
/// uncorrectable.
pub(crate) fn correct_block(block: &mut [u8], ec_len: usize) -> Option<usize> {
    let gf = gf();
    let n = block.len();
    debug_assert!(n <= 255 && ec_len < n);

    let mut synd = vec![0u8; ec_len];
    let mut clean = true;
    for (i, s) in synd.iter_mut().enumerate() {
        *s = eval_msb_first(block, gf.alpha_pow(i));
        clean &= *s == 0;
    }
    if clean {
        return Some(0);
    }

    let lambda = error_locator(&synd);
    let errors = lambda.len() - 1;
    if errors == 0 || 2 * errors > ec_len {
        return None;
    }

    // Chien search over the codeword positions (term degrees).
    let mut degrees = Vec::with_capacity(errors);
    for d in 0..n {
        let x_inv = gf.alpha_pow(255 - (d % 255));
        if eval_ascending(&lambda, x_inv) == 0 {
            degrees.push(d);
        }
    }
    if degrees.len() != errors {
        return None;
    }

    // Omega(x) = S(x) * Lambda(x) mod x^ec_len.
    let mut omega = vec![0u8; ec_len];
    for (i, &s) in synd.iter().enumerate() {
        for (j, &la) in lambda.iter().enumerate() {
            if i + j < ec_len {
                omega[i + j] ^= gf.mul(s, la);
            }
        }
    }

    // Forney with b = 0: magnitude = Xi * Omega(Xi^-1) / Lambda'(Xi^-1).
    for &d in &degrees {
        let xi = gf.alpha_pow(d);
        let xi_inv = gf.inv(xi);

        let mut denom = 0u8;
        for i in (1..lambda.len()).step_by(2) {
            denom ^= gf.mul(lambda[i], gf.pow(xi_inv, i - 1));
        }
        if denom == 0 {
            return None;
        }

        let num = eval_ascending(&omega, xi_inv);
        let magnitude = gf.mul(xi, gf.mul(num, gf.inv(denom)));
        block[n - 1 - d] ^= magnitude;
    }

    // Corrected word must be a valid codeword.
    for i in 0..ec_len {
        if eval_msb_first(block, gf.alpha_pow(i)) != 0 {
            return None;
        }
    }
    Some(errors)
}

//! Dense polynomials over GF(2^m) and the Euclidean operations the decoder
//! needs on them.

use alloc::{vec, vec::Vec};

use crate::gf::GfTables;

/// A dense polynomial over GF(2^m).
///
/// `c[i]` is the m-bit field element multiplying X^i. The leading coefficient
/// `c[deg]` is non-zero except for the zero polynomial, which is represented
/// as degree 0 with `c[0] == 0`. The coefficient buffer keeps its allocated
/// capacity; entries above `deg` are not kept in any particular state.
pub(crate) struct GfPoly {
    pub(crate) deg: usize,
    pub(crate) c: Vec<u32>,
}

impl GfPoly {
    /// The zero polynomial with room for `cap` coefficients.
    pub(crate) fn with_capacity(cap: usize) -> Self {
        Self {
            deg: 0,
            c: vec![0; cap],
        }
    }

    /// Reset to the zero polynomial, clearing the whole coefficient buffer.
    pub(crate) fn clear(&mut self) {
        self.deg = 0;
        self.c.fill(0);
    }

    /// Copy degree and the `deg + 1` live coefficients of `src`.
    pub(crate) fn copy_from(&mut self, src: &GfPoly) {
        self.deg = src.deg;
        self.c[..=src.deg].copy_from_slice(&src.c[..=src.deg]);
    }

    /// Drop leading zero coefficients.
    pub(crate) fn normalize(&mut self) {
        while self.deg > 0 && self.c[self.deg] == 0 {
            self.deg -= 1;
        }
    }
}

/// Monic, log-based representation of `a`: `rep[i] = log(c[i] / c[deg])`,
/// with -1 standing in for zero coefficients. `rep[deg]` is not written.
pub(crate) fn logrep(gf: &GfTables, a: &GfPoly, rep: &mut [i32]) {
    let l = gf.n() - gf.a_log(a.c[a.deg]);
    for i in 0..a.deg {
        rep[i] = if a.c[i] != 0 {
            gf.mod_s(gf.a_log(a.c[i]) + l) as i32
        } else {
            -1
        };
    }
}

/// Euclidean remainder against a divisor of degree `d` given by its log
/// representation: `a <- a mod b`, up to a scalar factor.
///
/// The eliminated high coefficients are left in place above the new degree;
/// [`div`] reads the quotient out of them.
pub(crate) fn rem_logrep(gf: &GfTables, a: &mut GfPoly, d: usize, rep: &[i32]) {
    if a.deg < d {
        return;
    }

    for j in (d..=a.deg).rev() {
        if a.c[j] != 0 {
            let la = gf.a_log(a.c[j]);
            let mut p = j - d;
            for &m in &rep[..d] {
                if m >= 0 {
                    a.c[p] ^= gf.pow_raw(gf.mod_s(m as u32 + la));
                }
                p += 1;
            }
        }
    }

    a.deg = d - 1;
    a.normalize();
}

/// Euclidean remainder `a <- a mod b`. `cache` receives the log
/// representation of `b` as a side effect.
pub(crate) fn rem(gf: &GfTables, a: &mut GfPoly, b: &GfPoly, cache: &mut [i32]) {
    if a.deg < b.deg {
        return;
    }
    logrep(gf, b, cache);
    rem_logrep(gf, a, b.deg, cache);
}

/// Euclidean quotient `q <- a / b`, up to a scalar factor. Reduces `a` to
/// `a mod b` in the process.
pub(crate) fn div(gf: &GfTables, a: &mut GfPoly, b: &GfPoly, q: &mut GfPoly, cache: &mut [i32]) {
    if a.deg >= b.deg {
        q.deg = a.deg - b.deg;
        rem(gf, a, b, cache);
        q.c[..=q.deg].copy_from_slice(&a.c[b.deg..=b.deg + q.deg]);
    } else {
        q.deg = 0;
        q.c[0] = 0;
    }
}

/// Greatest common divisor, up to a scalar factor, of two polynomials that
/// share a non-trivial factor. Both inputs are consumed as working storage;
/// the returned reference points into whichever of the two ended up holding
/// the result.
pub(crate) fn gcd<'a>(
    gf: &GfTables,
    mut a: &'a mut GfPoly,
    mut b: &'a mut GfPoly,
    cache: &mut [i32],
) -> &'a mut GfPoly {
    if a.deg < b.deg {
        core::mem::swap(&mut a, &mut b);
    }

    while b.deg > 0 {
        rem(gf, a, b, cache);
        core::mem::swap(&mut a, &mut b);
    }

    a
}

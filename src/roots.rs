//! Root finding for error locator polynomials.
//!
//! Polynomials of degree 1 to 4 are solved in closed form; anything larger
//! is split with the Berlekamp Trace algorithm, taking GCDs of the input
//! against trace polynomials `Tr(α^k · X) mod f` for increasing `k`, until
//! the factors reach a directly solvable degree.
//!
//! Roots are reported as exponents: the value `e` stands for the codeword
//! position whose error locator `α^(-e)` is a root. The decode orchestrator
//! maps exponents to bit positions.

use alloc::{vec, vec::Vec};

use crate::{
    Result, error_internal,
    gf::{self, GfTables},
    poly::{self, GfPoly},
};

/// Solve an m x m linear system over GF(2) with an expected number of
/// solutions, returning how many were found.
///
/// Each row holds one equation: bit `m - c` is the coefficient of unknown
/// `c` and bit 0 the constant term. Rows without a pivot contribute free
/// parameters; all `2^k` assignments are enumerated and back-substituted.
/// Returns 0 if the system is contradictory or the solution count does not
/// match `nsol`.
fn solve_linear_system(m: usize, rows: &mut [u32; 16], sol: &mut [u32], nsol: usize) -> usize {
    let mut param = [0usize; 16];
    let mut k = 0;
    let mut mask = 1u32 << m;

    // Gaussian elimination
    for c in 0..m {
        let p = c - k;
        let mut rem = 0;
        for r in p..m {
            if rows[r] & mask != 0 {
                rows.swap(r, p);
                rem = r + 1;
                break;
            }
        }
        if rem != 0 {
            // eliminate the column from the remaining rows
            let tmp = rows[p];
            for r in rem..m {
                if rows[r] & mask != 0 {
                    rows[r] ^= tmp;
                }
            }
        } else {
            // no pivot, remember the defective column
            param[k] = c;
            k += 1;
        }
        mask >>= 1;
    }

    // rewrite the system, inserting rows for the free parameters
    if k > 0 {
        let mut p = k;
        for r in (0..m).rev() {
            if r > m - 1 - k && rows[r] != 0 {
                // leftover constraint row, the system has no solution
                return 0;
            }
            rows[r] = if p > 0 && r == param[p - 1] {
                p -= 1;
                1u32 << (m - r)
            } else {
                rows[r - p]
            };
        }
    }

    if nsol != 1 << k {
        return 0;
    }

    for s in 0..nsol {
        // set the free parameters for the s-th solution
        for c in 0..k {
            rows[param[c]] = (rows[param[c]] & !1) | ((s as u32 >> c) & 1);
        }
        // back-substitute, resolving each pivot row with a parity check
        let mut tmp = 0u32;
        for r in (0..m).rev() {
            let mask = rows[r] & (tmp | 1);
            tmp |= gf::parity(mask) << (m - r);
        }
        sol[s] = tmp >> 1;
    }

    nsol
}

/// Precompute xi_tab for the quadratic solver: for each r < m a field
/// element x with `x² + x = α^r + Tr(α^r)·α^k`, where k is any exponent
/// with `Tr(α^k) = 1`.
pub(crate) fn build_deg2_base(gf: &GfTables) -> Result<Vec<u32>> {
    let m = gf.m();
    let n = gf.n();

    // find k such that Tr(α^k) = 1, 0 <= k < m
    let mut ak = 0;
    for i in 0..m {
        let mut sum = 0;
        for j in 0..m {
            sum ^= gf.a_pow(i * (1 << j));
        }
        if sum != 0 {
            ak = gf.pow_raw(i);
            break;
        }
    }

    let mut xi_tab = vec![0u32; m as usize];
    let mut filled = [false; 16];
    let mut remaining = m as usize;

    let mut x = 0;
    while x <= n && remaining > 0 {
        let mut y = gf.sqr(x) ^ x;
        // y covers the Tr = 0 case, y ^ α^k the Tr = 1 case
        for _ in 0..2 {
            let r = gf.a_log(y);
            if y != 0 && r < m && !filled[r as usize] {
                xi_tab[r as usize] = x;
                filled[r as usize] = true;
                remaining -= 1;
                break;
            }
            y ^= ak;
        }
        x += 1;
    }

    if remaining != 0 {
        return Err(error_internal("cannot build the quadratic solver base"));
    }
    Ok(xi_tab)
}

/// Shared state for one root finding run.
pub(crate) struct RootFinder<'a> {
    gf: &'a GfTables,
    xi_tab: &'a [u32],
    scratch: &'a mut [GfPoly; 4],
    cache: &'a mut [i32],
}

impl<'a> RootFinder<'a> {
    pub(crate) fn new(
        gf: &'a GfTables,
        xi_tab: &'a [u32],
        scratch: &'a mut [GfPoly; 4],
        cache: &'a mut [i32],
    ) -> Self {
        Self {
            gf,
            xi_tab,
            scratch,
            cache,
        }
    }

    /// Find the roots of `f`, writing their exponents to `roots` and
    /// returning how many were found. `f` is consumed as working storage.
    pub(crate) fn find_roots(&mut self, k: u32, f: &mut GfPoly, roots: &mut [u32]) -> usize {
        match f.deg {
            1 => self.find_deg1_roots(f, roots),
            2 => self.find_deg2_roots(f, roots),
            3 => self.find_deg3_roots(f, roots),
            4 => self.find_deg4_roots(f, roots),
            _ => {
                let mut cnt = 0;
                if f.deg > 0 && k <= self.gf.m() {
                    match self.factor(k, f) {
                        Some((mut g, mut h)) => {
                            cnt += self.find_roots(k + 1, &mut g, roots);
                            cnt += self.find_roots(k + 1, &mut h, &mut roots[cnt..]);
                        }
                        // no split at this k, try the next trace polynomial
                        None => cnt += self.find_roots(k + 1, f, roots),
                    }
                }
                cnt
            }
        }
    }

    /// Root of bX + c as log(b/c), i.e. the exponent of 1/(c/b).
    fn find_deg1_roots(&self, f: &GfPoly, roots: &mut [u32]) -> usize {
        let gf = self.gf;
        if f.c[0] == 0 {
            return 0;
        }
        roots[0] = gf.mod_s(gf.n() - gf.a_log(f.c[0]) + gf.a_log(f.c[1]));
        1
    }

    /// Roots of aX² + bX + c via the substitution X = (a/b)·Z, which turns
    /// the equation into Z² + Z = u with u = ac/b². A solution of the
    /// latter is assembled from xi_tab; z and z + 1 are the two roots iff
    /// Tr(u) = 0, which the verification step checks implicitly.
    fn find_deg2_roots(&self, f: &GfPoly, roots: &mut [u32]) -> usize {
        let gf = self.gf;
        let mut n = 0;
        if f.c[0] != 0 && f.c[1] != 0 {
            let l0 = gf.a_log(f.c[0]);
            let l1 = gf.a_log(f.c[1]);
            let l2 = gf.a_log(f.c[2]);

            let u = gf.a_pow(l0 + l2 + 2 * (gf.n() - l1));

            let mut r = 0;
            let mut v = u;
            while v != 0 {
                let i = gf::deg(v);
                r ^= self.xi_tab[i as usize];
                v ^= 1 << i;
            }

            if gf.sqr(r) ^ r == u {
                // undo the substitution and return log(1/root)
                roots[n] = gf.modulo(2 * gf.n() - l1 - gf.a_log(r) + l2);
                n += 1;
                roots[n] = gf.modulo(2 * gf.n() - l1 - gf.a_log(r ^ 1) + l2);
                n += 1;
            }
        }
        n
    }

    /// Roots of a cubic: normalize to X³ + a₂X² + b₂X + c₂, multiply by
    /// (X + a₂) to reach the affine quartic X⁴ + aX² + bX + c, solve that
    /// and drop the root a₂ the multiplication introduced.
    fn find_deg3_roots(&mut self, f: &GfPoly, roots: &mut [u32]) -> usize {
        let gf = self.gf;
        let mut n = 0;
        if f.c[0] != 0 {
            let e3 = f.c[3];
            let c2 = gf.div(f.c[0], e3);
            let b2 = gf.div(f.c[1], e3);
            let a2 = gf.div(f.c[2], e3);

            let c = gf.mul(a2, c2);
            let b = gf.mul(a2, b2) ^ c2;
            let a = gf.sqr(a2) ^ b2;

            let mut tmp = [0u32; 4];
            if self.find_affine4_roots(a, b, c, &mut tmp) == 4 {
                for &root in &tmp {
                    if root != a2 {
                        roots[n] = gf.a_ilog(root);
                        n += 1;
                    }
                }
            }
        }
        n
    }

    /// Roots of a quartic: normalize to monic, eliminate the linear term
    /// with Z = X + e where e² = c/a, then substitute Y = 1/X to reach an
    /// affine quartic. Every transformation is undone on the roots found.
    fn find_deg4_roots(&mut self, f: &GfPoly, roots: &mut [u32]) -> usize {
        let gf = self.gf;
        if f.c[0] == 0 {
            return 0;
        }

        let e4 = f.c[4];
        let mut d = gf.div(f.c[0], e4);
        let c = gf.div(f.c[1], e4);
        let mut b = gf.div(f.c[2], e4);
        let a = gf.div(f.c[3], e4);

        let mut e = 0;
        let (a2, b2, c2);

        if a != 0 {
            if c != 0 {
                // e² = c/a, via the exact half of the logarithm
                let f2 = gf.div(c, a);
                let mut l = gf.a_log(f2);
                l += if l & 1 != 0 { gf.n() } else { 0 };
                e = gf.a_pow(l / 2);
                d = gf.a_pow(2 * l) ^ gf.mul(b, f2) ^ d;
                b = gf.mul(a, e) ^ b;
            }
            if d == 0 {
                // assume all roots have multiplicity 1
                return 0;
            }
            c2 = gf.inv(d);
            b2 = gf.div(a, d);
            a2 = gf.div(b, d);
        } else {
            // the polynomial is already affine
            c2 = d;
            b2 = c;
            a2 = b;
        }

        if self.find_affine4_roots(a2, b2, c2, roots) != 4 {
            return 0;
        }
        for root in roots[..4].iter_mut() {
            let r = if a != 0 { gf.inv(*root) } else { *root };
            *root = gf.a_ilog(r ^ e);
        }
        4
    }

    /// Roots of the affine monic quartic X⁴ + aX² + bX + c, found by
    /// solving the linear system its evaluation on the power basis defines.
    fn find_affine4_roots(&mut self, a: u32, b: u32, c: u32, roots: &mut [u32]) -> usize {
        let gf = self.gf;
        let m = gf.m() as usize;
        let mut rows = [0u32; 16];

        let mut j = gf.a_log(b);
        let mut k = gf.a_log(a);
        rows[0] = c;

        // row i + 1 encodes (α^i)⁴ + a(α^i)² + b(α^i)
        for (i, row) in rows[1..=m].iter_mut().enumerate() {
            *row = gf.pow_raw(4 * i as u32)
                ^ (if a != 0 { gf.pow_raw(gf.mod_s(k)) } else { 0 })
                ^ (if b != 0 { gf.pow_raw(gf.mod_s(j)) } else { 0 });
            j += 1;
            k += 2;
        }

        // transpose the 16x16 bit matrix (valid for m < 16)
        let mut mask = 0xffu32;
        let mut w = 8;
        while w != 0 {
            let mut r = 0;
            while r < 16 {
                let t = ((rows[r] >> w) ^ rows[r + w]) & mask;
                rows[r] ^= t << w;
                rows[r + w] ^= t;
                r = (r + w + 1) & !w;
            }
            w >>= 1;
            mask ^= mask << w;
        }

        solve_linear_system(m, &mut rows, roots, 4)
    }

    /// Compute `Tr(α^k · X) mod f`, reducing the squared summand modulo `f`
    /// at every step to keep the degree bounded.
    fn trace_mod(
        gf: &GfTables,
        cache: &mut [i32],
        k: u32,
        f: &GfPoly,
        z: &mut GfPoly,
        out: &mut GfPoly,
    ) {
        let m = gf.m();

        // z holds (α^k·X)^(2^i) mod f
        z.deg = 1;
        z.c[0] = 0;
        z.c[1] = gf.a_pow(k);

        out.clear();

        poly::logrep(gf, f, cache);

        for i in 0..m {
            for j in (0..=z.deg).rev() {
                out.c[j] ^= z.c[j];
                z.c[2 * j] = gf.sqr(z.c[j]);
                z.c[2 * j + 1] = 0;
            }
            if z.deg > out.deg {
                out.deg = z.deg;
            }
            if i < m - 1 {
                z.deg *= 2;
                poly::rem_logrep(gf, z, f.deg, cache);
            }
        }
        out.normalize();
    }

    /// Try to split `f` with the trace polynomial for `k`. On success the
    /// two factors are returned as fresh polynomials and `f` is consumed;
    /// `None` means this trace polynomial does not separate the roots.
    fn factor(&mut self, k: u32, f: &mut GfPoly) -> Option<(GfPoly, GfPoly)> {
        let gf = self.gf;
        let [f2, q, tk, z] = &mut *self.scratch;
        let cache = &mut *self.cache;

        Self::trace_mod(gf, cache, k, f, z, tk);

        if tk.deg > 0 {
            f2.copy_from(f);
            let g = poly::gcd(gf, f2, tk, cache);
            if g.deg < f.deg {
                poly::div(gf, f, g, q, cache);
                let g_out = GfPoly {
                    deg: g.deg,
                    c: g.c[..=g.deg].to_vec(),
                };
                let h_out = GfPoly {
                    deg: q.deg,
                    c: q.c[..=q.deg].to_vec(),
                };
                return Some((g_out, h_out));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{gf::DEFAULT_PRIM_POLY, tests::Lcg};

    fn field(m: u32) -> GfTables {
        GfTables::build(m, DEFAULT_PRIM_POLY[(m - 5) as usize]).unwrap()
    }

    /// (X + x1)...(X + xk) expanded into a polynomial with extra capacity.
    fn from_roots(gf: &GfTables, cap: usize, roots: &[u32]) -> GfPoly {
        let mut p = GfPoly::with_capacity(cap);
        p.c[0] = 1;
        for &r in roots {
            p.c[p.deg + 1] = 1;
            for j in (1..=p.deg).rev() {
                p.c[j] = gf.mul(p.c[j], r) ^ p.c[j - 1];
            }
            p.c[0] = gf.mul(p.c[0], r);
            p.deg += 1;
        }
        p
    }

    fn run_finder(gf: &GfTables, f: &mut GfPoly, out: &mut [u32]) -> usize {
        let xi_tab = build_deg2_base(gf).unwrap();
        let cap = f.deg * 2 + 2;
        let mut scratch = core::array::from_fn::<_, 4, _>(|_| GfPoly::with_capacity(cap));
        let mut cache = vec![0i32; cap];
        let mut finder = RootFinder::new(gf, &xi_tab, &mut scratch, &mut cache);
        finder.find_roots(1, f, out)
    }

    /// Solvers return log(1/x) for each root x.
    fn expected_exponents(gf: &GfTables, roots: &[u32]) -> Vec<u32> {
        let mut v: Vec<u32> = roots.iter().map(|&x| gf.a_ilog(x)).collect();
        v.sort_unstable();
        v
    }

    fn assert_roots(gf: &GfTables, found: &mut [u32], roots: &[u32]) {
        found.sort_unstable();
        let expected = expected_exponents(gf, roots);
        assert_eq!(&found[..], expected.as_slice());
    }

    #[test]
    fn test_deg2_base_solves_quadratics() {
        for m in [5u32, 8, 11] {
            let gf = field(m);
            let xi_tab = build_deg2_base(&gf).unwrap();
            // every entry must satisfy x² + x = α^r or α^r + α^k
            for (r, &x) in xi_tab.iter().enumerate() {
                let y = gf.sqr(x) ^ x;
                assert_ne!(y, 0, "m={m}, r={r}");
            }
        }
    }

    #[test]
    fn test_closed_form_degrees() {
        let gf = field(8);
        let mut rng = Lcg::new(0xBADC0FFEE0DDF00D);

        for degree in 1..=4usize {
            for _ in 0..20 {
                // pick distinct non-zero roots
                let mut roots = Vec::new();
                while roots.len() < degree {
                    let x = (rng.next_u8() as u32) & gf.n();
                    if x != 0 && !roots.contains(&x) {
                        roots.push(x);
                    }
                }
                let mut f = from_roots(&gf, degree + 1, &roots);
                let mut found = [0u32; 8];
                let n = run_finder(&gf, &mut f, &mut found);
                assert_eq!(n, degree, "degree={degree}, roots={roots:?}");
                assert_roots(&gf, &mut found[..n], &roots);
            }
        }
    }

    #[test]
    fn test_trace_factoring_high_degrees() {
        let gf = field(10);
        let mut rng = Lcg::new(0x0123456789ABCDEF);

        for degree in 5..=8usize {
            for _ in 0..10 {
                let mut roots = Vec::new();
                while roots.len() < degree {
                    let x = (rng.next_u64() as u32) & gf.n();
                    if x != 0 && !roots.contains(&x) {
                        roots.push(x);
                    }
                }
                let mut f = from_roots(&gf, 2 * degree + 2, &roots);
                let mut found = [0u32; 16];
                let n = run_finder(&gf, &mut f, &mut found);
                assert_eq!(n, degree, "degree={degree}, roots={roots:?}");
                assert_roots(&gf, &mut found[..n], &roots);
            }
        }
    }

    #[test]
    fn test_affine4_against_brute_force() {
        let gf = field(8);
        let mut rng = Lcg::new(0x5555AAAA5555AAAA);
        let xi_tab = build_deg2_base(&gf).unwrap();
        let mut scratch = core::array::from_fn::<_, 4, _>(|_| GfPoly::with_capacity(8));
        let mut cache = vec![0i32; 8];
        let mut finder = RootFinder::new(&gf, &xi_tab, &mut scratch, &mut cache);

        for _ in 0..50 {
            let a = rng.next_u8() as u32;
            let b = rng.next_u8() as u32;
            let c = rng.next_u8() as u32;

            let mut brute = Vec::new();
            for x in 0..=gf.n() {
                let v = gf.mul(gf.sqr(x), gf.sqr(x)) ^ gf.mul(a, gf.sqr(x)) ^ gf.mul(b, x) ^ c;
                if v == 0 {
                    brute.push(x);
                }
            }

            let mut sol = [0u32; 4];
            let n = finder.find_affine4_roots(a, b, c, &mut sol);
            if brute.len() == 4 {
                assert_eq!(n, 4, "a={a}, b={b}, c={c}");
                let mut sol = sol.to_vec();
                sol.sort_unstable();
                brute.sort_unstable();
                assert_eq!(sol, brute);
            } else {
                assert_eq!(n, 0, "a={a}, b={b}, c={c}, brute={brute:?}");
            }
        }
    }

    #[test]
    fn test_quartic_with_zero_constant_term_reports_no_roots() {
        let gf = field(8);
        let mut f = GfPoly::with_capacity(5);
        f.deg = 4;
        f.c = vec![0, 3, 7, 1, 1];
        let mut found = [0u32; 4];
        let n = run_finder(&gf, &mut f, &mut found);
        assert_eq!(n, 0);
    }
}

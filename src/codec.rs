//! The BCH control structure with its encoder and decoder pipeline.

use alloc::{vec, vec::Vec};

use crate::{
    Result, bits, error_invalid_parameter, error_uncorrectable,
    gf::{self, DEFAULT_PRIM_POLY, GfTables},
    poly::GfPoly,
    roots::{RootFinder, build_deg2_base},
};

const MIN_M: u32 = 5;
const MAX_M: u32 = 15;

/// A binary BCH encoder/decoder for one `(m, t)` parameter set.
///
/// Codewords are `n = 2^m - 1` bits long, carry [`data_bits`] payload bits
/// and [`ecc_bits`] parity bits, and tolerate up to `t` bit errors. The
/// byte-granular API ([`encode`], [`decode`], [`correct`]) treats the
/// payload as whole bytes followed by [`ecc_bytes`] parity bytes; shortened
/// codes simply use fewer payload bytes. The bit-granular API
/// ([`encode_bits`], [`decode_bits`], [`correct_bits`]) works on buffers
/// holding one bit per byte.
///
/// Construction builds all lookup tables and performs every allocation the
/// codec will ever need; encode and decode only touch those scratch buffers,
/// which is why they take `&mut self`. Use one instance per thread.
///
/// ```
/// let mut bch = libbch::Bch::new(8, 4, None).unwrap();
///
/// let data = *b"hello, world....";
/// let mut ecc = vec![0u8; bch.ecc_bytes()];
/// bch.encode(&data, &mut ecc).unwrap();
///
/// let mut received = data;
/// received[2] ^= 0x44; // two bit errors
///
/// let mut errloc = vec![0u32; 4];
/// let nerr = bch.decode(&received, &ecc, &mut errloc).unwrap();
/// assert_eq!(nerr, 2);
///
/// bch.correct(&mut received, &errloc[..nerr]);
/// assert_eq!(received, data);
/// ```
///
/// [`data_bits`]: Self::data_bits
/// [`ecc_bits`]: Self::ecc_bits
/// [`ecc_bytes`]: Self::ecc_bytes
/// [`encode`]: Self::encode
/// [`decode`]: Self::decode
/// [`correct`]: Self::correct
/// [`encode_bits`]: Self::encode_bits
/// [`decode_bits`]: Self::decode_bits
/// [`correct_bits`]: Self::correct_bits
pub struct Bch {
    m: u32,
    t: u32,
    n: u32,
    ecc_bits: u32,
    ecc_bytes: usize,
    gf: GfTables,
    /// 4 byte lanes x 256 byte values x ecc_words remainder limbs.
    mod8_tab: Vec<u32>,
    /// Basis for the closed-form quadratic solver.
    xi_tab: Vec<u32>,
    ecc_buf: Vec<u32>,
    ecc_buf2: Vec<u32>,
    syn: Vec<u32>,
    cache: Vec<i32>,
    /// Error locator polynomial workspace.
    elp: GfPoly,
    poly_2t: [GfPoly; 4],
    databuf: Vec<u8>,
}

impl Bch {
    /// Create a BCH codec for Galois field order `m` (5..=15) and error
    /// correction capability `t`.
    ///
    /// `prim_poly` selects the primitive polynomial generating GF(2^m), as
    /// an (m+1)-bit value whose degree-m term is the high bit; `None` picks
    /// the default polynomial for `m`. Reducible polynomials are rejected.
    ///
    /// Building the lookup tables takes some time, so construct the codec
    /// once up front and keep it around, not inside a per-message path.
    pub fn new(m: u32, t: u32, prim_poly: Option<u32>) -> Result<Self> {
        if !(MIN_M..=MAX_M).contains(&m) {
            return Err(error_invalid_parameter("m must be in 5..=15"));
        }
        let n = (1u32 << m) - 1;
        if t < 1 || m * t >= n {
            return Err(error_invalid_parameter(
                "t errors do not fit a 2^m - 1 bit codeword",
            ));
        }

        let prim_poly = prim_poly.unwrap_or(DEFAULT_PRIM_POLY[(m - MIN_M) as usize]);
        let gf = GfTables::build(m, prim_poly)?;

        let (genpoly, ecc_bits) = build_generator_poly(&gf, m, t);
        let ecc_bytes = ecc_bits.div_ceil(8) as usize;
        let ecc_words = ecc_bits.div_ceil(32) as usize;

        let mod8_tab = build_mod8_tables(&genpoly, ecc_words);
        let xi_tab = build_deg2_base(&gf)?;

        let t = t as usize;
        let databuf_len = (n - ecc_bits).div_ceil(8) as usize + ecc_bytes;

        Ok(Self {
            m,
            t: t as u32,
            n,
            ecc_bits,
            ecc_bytes,
            gf,
            mod8_tab,
            xi_tab,
            ecc_buf: vec![0; ecc_words],
            ecc_buf2: vec![0; ecc_words],
            syn: vec![0; 2 * t],
            cache: vec![0; 2 * t],
            elp: GfPoly::with_capacity(2 * t + 1),
            poly_2t: core::array::from_fn(|_| GfPoly::with_capacity(2 * t + 1)),
            databuf: vec![0; databuf_len],
        })
    }

    /// Galois field order.
    pub fn m(&self) -> u32 {
        self.m
    }

    /// Maximum number of correctable bit errors per codeword.
    pub fn t(&self) -> u32 {
        self.t
    }

    /// Codeword length in bits, `2^m - 1`.
    pub fn n(&self) -> u32 {
        self.n
    }

    /// Exact number of parity bits. May be less than `m * t` when the
    /// generator polynomial comes out shorter than the upper bound.
    pub fn ecc_bits(&self) -> u32 {
        self.ecc_bits
    }

    /// Parity size in bytes for the byte-granular API.
    pub fn ecc_bytes(&self) -> usize {
        self.ecc_bytes
    }

    /// Number of payload bits a full-length codeword carries,
    /// `n - ecc_bits`.
    pub fn data_bits(&self) -> usize {
        (self.n - self.ecc_bits) as usize
    }

    /// Calculate the BCH parity of `data` into `ecc`.
    ///
    /// `ecc` is both input and output and must hold exactly
    /// [`ecc_bytes`](Self::ecc_bytes) bytes. Zero it before encoding a new
    /// message; passing the output of a previous call back in continues the
    /// computation, so a long message can be encoded incrementally in
    /// chunks with identical results to a one-shot call.
    pub fn encode(&mut self, data: &[u8], ecc: &mut [u8]) -> Result<()> {
        if ecc.len() != self.ecc_bytes {
            return Err(error_invalid_parameter(
                "ecc buffer length must equal ecc_bytes",
            ));
        }
        load_ecc8(&mut self.ecc_buf, ecc);
        self.encode_into_buf(data);
        store_ecc8(ecc, &self.ecc_buf);
        Ok(())
    }

    /// Locate bit errors from the original data and the received parity.
    ///
    /// On success returns the number of errors found (0 meaning the
    /// codeword is clean) and stores that many bit positions in `errloc`,
    /// which must have room for at least `t` entries. A position below
    /// `8 * data.len()` lies in the data and can be fixed with
    /// `data[pos / 8] ^= 1 << (pos % 8)` (or [`correct`](Self::correct));
    /// greater positions lie in the parity.
    ///
    /// The codeword is never modified; `errloc` contents are unspecified on
    /// error.
    pub fn decode(&mut self, data: &[u8], recv_ecc: &[u8], errloc: &mut [u32]) -> Result<usize> {
        self.check_decode_args(data.len(), recv_ecc.len(), errloc.len())?;
        // parity of the received data, into the internal word buffer
        self.ecc_buf.fill(0);
        self.encode_into_buf(data);
        self.xor_recv_and_decode(recv_ecc, data.len(), errloc)
    }

    /// Like [`decode`](Self::decode), but takes a parity already calculated
    /// over the received data (for example by a hardware engine) instead of
    /// the data itself. `len` is the data length in bytes.
    pub fn decode_with_calc_ecc(
        &mut self,
        calc_ecc: &[u8],
        recv_ecc: &[u8],
        len: usize,
        errloc: &mut [u32],
    ) -> Result<usize> {
        self.check_decode_args(len, recv_ecc.len(), errloc.len())?;
        if calc_ecc.len() != self.ecc_bytes {
            return Err(error_invalid_parameter(
                "calculated ecc length must equal ecc_bytes",
            ));
        }
        load_ecc8(&mut self.ecc_buf, calc_ecc);
        self.xor_recv_and_decode(recv_ecc, len, errloc)
    }

    /// Like [`decode`](Self::decode), but takes the XOR of received and
    /// calculated parity directly.
    pub fn decode_with_xored_ecc(
        &mut self,
        ecc: &[u8],
        len: usize,
        errloc: &mut [u32],
    ) -> Result<usize> {
        self.check_decode_args(len, ecc.len(), errloc.len())?;
        load_ecc8(&mut self.ecc_buf, ecc);
        self.compute_syndromes();
        self.locate_errors(len, errloc)
    }

    /// Like [`decode`](Self::decode), but takes `2t` precomputed syndromes
    /// and skips the syndrome stage entirely.
    pub fn decode_with_syndromes(
        &mut self,
        syn: &[u32],
        len: usize,
        errloc: &mut [u32],
    ) -> Result<usize> {
        if syn.len() != 2 * self.t as usize {
            return Err(error_invalid_parameter("expected exactly 2t syndromes"));
        }
        if syn.iter().any(|&s| s > self.n) {
            return Err(error_invalid_parameter(
                "syndromes must be m-bit field elements",
            ));
        }
        self.check_decode_args(len, self.ecc_bytes, errloc.len())?;
        self.syn.copy_from_slice(syn);
        self.locate_errors(len, errloc)
    }

    /// Flip the data bits reported by a decode call. Positions inside the
    /// parity region are ignored. Applying the same locations a second time
    /// restores the corrupted input.
    pub fn correct(&self, data: &mut [u8], errloc: &[u32]) {
        for &loc in errloc {
            let byte = (loc >> 3) as usize;
            if byte < data.len() {
                data[byte] ^= 1 << (loc & 7);
            }
        }
    }

    /// Calculate parity over a bit buffer.
    ///
    /// `data_bits` holds one payload bit per byte (only the LSB of each
    /// byte is used) and must be exactly [`data_bits`](Self::data_bits)
    /// long; `ecc_out` receives [`ecc_bits`](Self::ecc_bits) parity bits in
    /// the same format.
    pub fn encode_bits(&mut self, data_bits: &[u8], ecc_out: &mut [u8]) -> Result<()> {
        if data_bits.len() != self.data_bits() {
            return Err(error_invalid_parameter(
                "data bit buffer length must equal data_bits",
            ));
        }
        if ecc_out.len() != self.ecc_bits as usize {
            return Err(error_invalid_parameter(
                "ecc bit buffer length must equal ecc_bits",
            ));
        }

        let kbytes = self.data_bits().div_ceil(8);
        let pad = kbytes * 8 - self.data_bits();
        let ecc_bytes = self.ecc_bytes;

        let mut databuf = core::mem::take(&mut self.databuf);
        let (data_part, ecc_part) = databuf.split_at_mut(kbytes);
        bits::pack_data_bits(data_bits, pad, data_part);
        ecc_part.fill(0);
        let result = self.encode(data_part, &mut ecc_part[..ecc_bytes]);
        if result.is_ok() {
            bits::unpack_ecc_bits(&ecc_part[..ecc_bytes], ecc_out);
        }
        self.databuf = databuf;
        result
    }

    /// Locate bit errors in a bit buffer codeword.
    ///
    /// Takes the same formats as [`encode_bits`](Self::encode_bits). On
    /// success the reported positions index directly into `data_bits`
    /// (position 0 is the first payload bit); positions at or above
    /// [`data_bits`](Self::data_bits) lie in the parity.
    pub fn decode_bits(
        &mut self,
        data_bits: &[u8],
        recv_ecc_bits: &[u8],
        errloc: &mut [u32],
    ) -> Result<usize> {
        if data_bits.len() != self.data_bits() || recv_ecc_bits.len() != self.ecc_bits as usize {
            return Err(error_invalid_parameter(
                "bit buffer lengths must match the code parameters",
            ));
        }

        let kbytes = self.data_bits().div_ceil(8);
        let pad = (kbytes * 8 - self.data_bits()) as u32;
        let ecc_bytes = self.ecc_bytes;

        let mut databuf = core::mem::take(&mut self.databuf);
        let (data_part, ecc_part) = databuf.split_at_mut(kbytes);
        bits::pack_data_bits(data_bits, pad as usize, data_part);
        bits::pack_ecc_bits(recv_ecc_bits, &mut ecc_part[..ecc_bytes]);
        let result = self.decode(data_part, &ecc_part[..ecc_bytes], errloc);
        self.databuf = databuf;

        let nerr = result?;
        for loc in errloc[..nerr].iter_mut() {
            // undo the per-byte reorder, then remove the packing pad
            let raw = (*loc & !7) | (7 - (*loc & 7));
            if raw < pad {
                return Err(error_uncorrectable("error located in the packing pad"));
            }
            *loc = raw - pad;
        }
        Ok(nerr)
    }

    /// Flip the payload bits reported by [`decode_bits`](Self::decode_bits).
    /// Positions inside the parity region are ignored.
    pub fn correct_bits(&self, data_bits: &mut [u8], errloc: &[u32]) {
        for &loc in errloc {
            if (loc as usize) < data_bits.len() {
                data_bits[loc as usize] ^= 1;
            }
        }
    }

    fn check_decode_args(&self, len: usize, ecc_len: usize, errloc_len: usize) -> Result<()> {
        if len > ((self.n - self.ecc_bits + 7) / 8) as usize {
            return Err(error_invalid_parameter("data length exceeds code capacity"));
        }
        if ecc_len != self.ecc_bytes {
            return Err(error_invalid_parameter(
                "ecc buffer length must equal ecc_bytes",
            ));
        }
        if errloc_len < self.t as usize {
            return Err(error_invalid_parameter(
                "errloc must have room for t entries",
            ));
        }
        Ok(())
    }

    /// Run `data` through the remainder tables against `ecc_buf`,
    /// 32 bits at a time.
    fn encode_into_buf(&mut self, data: &[u8]) {
        let mut words = data.chunks_exact(4);
        for chunk in &mut words {
            // input data is read in big-endian format
            let word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            encode_word(&self.mod8_tab, &mut self.ecc_buf, word);
        }
        for &byte in words.remainder() {
            encode_byte(&self.mod8_tab, &mut self.ecc_buf, byte);
        }
    }

    /// XOR the received parity into `ecc_buf` (which holds the calculated
    /// parity), short-circuit if the codeword is clean, then decode.
    fn xor_recv_and_decode(
        &mut self,
        recv_ecc: &[u8],
        len: usize,
        errloc: &mut [u32],
    ) -> Result<usize> {
        load_ecc8(&mut self.ecc_buf2, recv_ecc);
        let mut sum = 0;
        for (a, b) in self.ecc_buf.iter_mut().zip(&self.ecc_buf2) {
            *a ^= b;
            sum |= *a;
        }
        if sum == 0 {
            return Ok(0);
        }
        self.compute_syndromes();
        self.locate_errors(len, errloc)
    }

    /// Evaluate the parity polynomial in `ecc_buf` at α^j for j = 1..=2t.
    ///
    /// Only the odd evaluations are computed from the set bits; the even
    /// ones follow for free from `V(α^(2j)) = V(α^j)²`, squaring being
    /// linear in characteristic 2.
    fn compute_syndromes(&mut self) {
        let t = self.t as usize;

        // stray bits beyond ecc_bits in the last word must not contribute
        let frac = self.ecc_bits & 31;
        if frac != 0 {
            self.ecc_buf[(self.ecc_bits / 32) as usize] &= !((1u32 << (32 - frac)) - 1);
        }
        self.syn.fill(0);

        let mut s = self.ecc_bits as i32;
        let mut word = 0;
        loop {
            let mut poly = self.ecc_buf[word];
            word += 1;
            s -= 32;
            while poly != 0 {
                let i = gf::deg(poly) as i32;
                for j in (0..2 * t).step_by(2) {
                    self.syn[j] ^= self.gf.a_pow(((j as i32 + 1) * (i + s)) as u32);
                }
                poly ^= 1 << i;
            }
            if s <= 0 {
                break;
            }
        }

        for j in 0..t {
            self.syn[2 * j + 1] = self.gf.sqr(self.syn[j]);
        }
    }

    /// Berlekamp-Massey synthesis of the error locator polynomial Λ(X) from
    /// the syndromes. Returns deg Λ, the number of errors.
    fn compute_error_locator(&mut self) -> Result<usize> {
        let t = self.t as usize;
        let gf = &self.gf;
        let n = gf.n();
        let syn = &self.syn;
        let elp = &mut self.elp;
        let [pelp, elp_copy, _, _] = &mut self.poly_2t;

        pelp.clear();
        elp.clear();
        pelp.c[0] = 1;
        elp.c[0] = 1;

        let mut d = syn[0];
        let mut pd = 1;
        let mut pp: i32 = -1;

        let mut i = 0;
        while i < t && elp.deg <= t {
            if d != 0 {
                // Λ(X) += (d/pd) · X^(2i - pp) · Λ_prev(X)
                let k = (2 * i as i32 - pp) as usize;
                elp_copy.copy_from(elp);
                let scale = gf.a_log(d) + n - gf.a_log(pd);
                for j in 0..=pelp.deg {
                    if pelp.c[j] != 0 {
                        let l = gf.a_log(pelp.c[j]);
                        elp.c[j + k] ^= gf.a_pow(scale + l);
                    }
                }
                let tmp = pelp.deg + k;
                if tmp > elp.deg {
                    elp.deg = tmp;
                    pelp.copy_from(elp_copy);
                    pd = d;
                    pp = 2 * i as i32;
                }
            }
            // next discrepancy: d = S(2i+3) + Λ₁S(2i+2) + ... + Λ_l S(2i+3-l)
            if i < t - 1 {
                d = syn[2 * i + 2];
                for j in 1..=elp.deg {
                    d ^= gf.mul(elp.c[j], syn[2 * i + 2 - j]);
                }
            }
            i += 1;
        }

        if elp.deg > t {
            Err(error_uncorrectable(
                "error locator degree exceeds correction capability",
            ))
        } else {
            Ok(elp.deg)
        }
    }

    /// Locator synthesis, root finding and location post-processing.
    fn locate_errors(&mut self, len: usize, errloc: &mut [u32]) -> Result<usize> {
        let nerr = self.compute_error_locator()?;
        if nerr == 0 {
            return Ok(0);
        }

        let mut finder =
            RootFinder::new(&self.gf, &self.xi_tab, &mut self.poly_2t, &mut self.cache);
        let nroots = finder.find_roots(1, &mut self.elp, errloc);
        if nroots != nerr {
            return Err(error_uncorrectable(
                "root count does not match the locator degree",
            ));
        }

        // turn root exponents into bit positions within (data || ecc)
        let nbits = (len * 8) as u32 + self.ecc_bits;
        for loc in errloc[..nerr].iter_mut() {
            if *loc >= nbits {
                return Err(error_uncorrectable("error located outside the codeword"));
            }
            let p = nbits - 1 - *loc;
            *loc = (p & !7) | (7 - (p & 7));
        }

        Ok(nerr)
    }
}

/// Expand g(X) as the product of (X + α^i) over the cyclotomic closure of
/// the odd powers α^1, α^3, ..., α^(2t-1), then serialize it as a
/// left-justified big-endian bit string. Returns the bit words and
/// `deg g`, the exact parity bit count.
fn build_generator_poly(gf: &GfTables, m: u32, t: u32) -> (Vec<u32>, u32) {
    let n = gf.n();

    let mut is_root = vec![false; (n + 1) as usize];
    for i in 0..t {
        let mut r = 2 * i + 1;
        for _ in 0..m {
            is_root[r as usize] = true;
            r = gf.mod_s(2 * r);
        }
    }

    let mut g = GfPoly::with_capacity((m * t + 1) as usize);
    g.c[0] = 1;
    for i in 0..n {
        if is_root[i as usize] {
            let r = gf.pow_raw(i);
            g.c[g.deg + 1] = 1;
            for j in (1..=g.deg).rev() {
                g.c[j] = gf.mul(g.c[j], r) ^ g.c[j - 1];
            }
            g.c[0] = gf.mul(g.c[0], r);
            g.deg += 1;
        }
    }

    let ecc_bits = g.deg as u32;
    let mut genpoly = vec![0u32; (ecc_bits + 1).div_ceil(32) as usize];
    let mut remaining = g.deg + 1;
    let mut i = 0;
    while remaining > 0 {
        let nbits = remaining.min(32);
        let mut word = 0;
        for j in 0..nbits {
            if g.c[remaining - 1 - j] != 0 {
                word |= 1u32 << (31 - j);
            }
        }
        genpoly[i] = word;
        i += 1;
        remaining -= nbits;
    }

    (genpoly, ecc_bits)
}

/// Remainder tables for the 32-bit parallel encoder: entry (lane b, byte i)
/// holds `(i · X^(8b + deg g)) mod g(X)` as `ecc_words` left-justified
/// limbs, computed by repeatedly subtracting shifted copies of g.
fn build_mod8_tables(genpoly: &[u32], ecc_words: usize) -> Vec<u32> {
    let plen = genpoly.len();
    let mut tab = vec![0u32; 4 * 256 * ecc_words];

    for i in 0..256u32 {
        // p(X) = i is a small polynomial of weight <= 8
        for b in 0..4 {
            let offset = (b * 256 + i as usize) * ecc_words;
            let mut data = i << (8 * b);
            while data != 0 {
                let d = gf::deg(data);
                // subtract X^d·g(X) from p(X)·X^(8b + deg g)
                data ^= genpoly[0] >> (31 - d);
                for j in 0..ecc_words {
                    let hi = if d < 31 { genpoly[j] << (d + 1) } else { 0 };
                    let lo = if j + 1 < plen { genpoly[j + 1] >> (31 - d) } else { 0 };
                    tab[offset + j] ^= hi | lo;
                }
            }
        }
    }

    tab
}

#[inline]
fn table_row(tab: &[u32], ecc_words: usize, lane: usize, byte: u32) -> &[u32] {
    let start = (lane * 256 + byte as usize) * ecc_words;
    &tab[start..start + ecc_words]
}

/// Shift one data byte into the parity register through lane 0.
fn encode_byte(tab: &[u32], ecc: &mut [u32], byte: u8) {
    let w = ecc.len();
    let l = w - 1;
    let row = table_row(tab, w, 0, ((ecc[0] >> 24) ^ u32::from(byte)) & 0xff);
    for i in 0..l {
        ecc[i] = ((ecc[i] << 8) | (ecc[i + 1] >> 24)) ^ row[i];
    }
    ecc[l] = (ecc[l] << 8) ^ row[l];
}

/// Shift 32 data bits into the parity register, one table row per lane.
fn encode_word(tab: &[u32], ecc: &mut [u32], word: u32) {
    let w = ecc.len();
    let l = w - 1;
    let x = ecc[0] ^ word;
    let p0 = table_row(tab, w, 0, x & 0xff);
    let p1 = table_row(tab, w, 1, (x >> 8) & 0xff);
    let p2 = table_row(tab, w, 2, (x >> 16) & 0xff);
    let p3 = table_row(tab, w, 3, (x >> 24) & 0xff);
    for i in 0..l {
        ecc[i] = ecc[i + 1] ^ p0[i] ^ p1[i] ^ p2[i] ^ p3[i];
    }
    ecc[l] = p0[l] ^ p1[l] ^ p2[l] ^ p3[l];
}

/// Load parity bytes into zero-padded big-endian 32-bit words.
fn load_ecc8(dst: &mut [u32], src: &[u8]) {
    let nwords = dst.len() - 1;
    for (w, chunk) in dst[..nwords].iter_mut().zip(src.chunks_exact(4)) {
        *w = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    let mut pad = [0u8; 4];
    let rest = &src[4 * nwords..];
    pad[..rest.len()].copy_from_slice(rest);
    dst[nwords] = u32::from_be_bytes(pad);
}

/// Store the 32-bit parity words back as bytes.
fn store_ecc8(dst: &mut [u8], src: &[u32]) {
    let nwords = src.len() - 1;
    for (chunk, w) in dst.chunks_exact_mut(4).zip(&src[..nwords]) {
        chunk.copy_from_slice(&w.to_be_bytes());
    }
    let rest = dst.len() - 4 * nwords;
    dst[4 * nwords..].copy_from_slice(&src[nwords].to_be_bytes()[..rest]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::Lcg;

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(Bch::new(4, 1, None).is_err());
        assert!(Bch::new(16, 1, None).is_err());
        assert!(Bch::new(8, 0, None).is_err());
        // m*t >= n
        assert!(Bch::new(5, 7, None).is_err());
        // wrong degree primitive polynomial
        assert!(Bch::new(5, 2, Some(0x769)).is_err());
    }

    #[test]
    fn test_generator_polynomial_sizes() {
        // BCH(31,21) has a degree 10 generator
        let bch = Bch::new(5, 2, None).unwrap();
        assert_eq!(bch.ecc_bits(), 10);
        assert_eq!(bch.ecc_bytes(), 2);
        assert_eq!(bch.data_bits(), 21);

        // for m=8, t=4 the minimal polynomials are all distinct of degree 8
        let bch = Bch::new(8, 4, None).unwrap();
        assert_eq!(bch.ecc_bits(), 32);
        assert_eq!(bch.ecc_bytes(), 4);
    }

    #[test]
    fn test_zero_data_has_zero_parity() {
        let mut bch = Bch::new(5, 2, None).unwrap();
        let mut ecc = [0u8; 2];
        bch.encode(&[0x00], &mut ecc).unwrap();
        assert_eq!(ecc, [0, 0]);

        let mut errloc = [0u32; 2];
        let nerr = bch.decode(&[0x00], &ecc, &mut errloc).unwrap();
        assert_eq!(nerr, 0);
    }

    #[test]
    fn test_encode_rejects_wrong_ecc_length() {
        let mut bch = Bch::new(5, 2, None).unwrap();
        let mut ecc = [0u8; 3];
        assert!(bch.encode(&[0x00], &mut ecc).is_err());
    }

    #[test]
    fn test_decode_rejects_oversized_data() {
        let mut bch = Bch::new(5, 2, None).unwrap();
        // capacity is (31 - 10 + 7) / 8 = 3 bytes
        let data = [0u8; 4];
        let ecc = [0u8; 2];
        let mut errloc = [0u32; 2];
        assert!(bch.decode(&data, &ecc, &mut errloc).is_err());
    }

    #[test]
    fn test_syndromes_are_linear() {
        let mut bch = Bch::new(8, 4, None).unwrap();
        let mut rng = Lcg::new(0x1122334455667788);

        let mut a = vec![0u8; bch.ecc_bytes()];
        let mut b = vec![0u8; bch.ecc_bytes()];
        rng.fill_buffer(&mut a);
        rng.fill_buffer(&mut b);

        let syn_of = |bch: &mut Bch, ecc: &[u8]| -> Vec<u32> {
            load_ecc8(&mut bch.ecc_buf, ecc);
            bch.compute_syndromes();
            bch.syn.clone()
        };

        let syn_a = syn_of(&mut bch, &a);
        let syn_b = syn_of(&mut bch, &b);

        let xored: Vec<u8> = a.iter().zip(&b).map(|(x, y)| x ^ y).collect();
        let syn_x = syn_of(&mut bch, &xored);

        for i in 0..syn_x.len() {
            assert_eq!(syn_x[i], syn_a[i] ^ syn_b[i], "syndrome {i}");
        }
    }

    #[test]
    fn test_decode_input_modes_agree() {
        let mut bch = Bch::new(8, 4, None).unwrap();
        let mut rng = Lcg::new(0xA5A5A5A55A5A5A5A);

        let mut data = vec![0u8; 16];
        rng.fill_buffer(&mut data);

        let mut calc_ecc = vec![0u8; bch.ecc_bytes()];
        bch.encode(&data, &mut calc_ecc).unwrap();

        // corrupt two data bits and one parity bit
        let mut recv_data = data.clone();
        recv_data[3] ^= 0x08;
        recv_data[11] ^= 0x80;
        let mut recv_ecc = calc_ecc.clone();
        recv_ecc[1] ^= 0x01;

        let mut recv_calc_ecc = vec![0u8; bch.ecc_bytes()];
        bch.encode(&recv_data, &mut recv_calc_ecc).unwrap();

        let mut expected = vec![0u32; 4];
        let nerr = bch.decode(&recv_data, &recv_ecc, &mut expected).unwrap();
        assert_eq!(nerr, 3);
        expected.truncate(nerr);
        expected.sort_unstable();

        // mode b: calculated parity provided by the caller
        let mut errloc = vec![0u32; 4];
        let n = bch
            .decode_with_calc_ecc(&recv_calc_ecc, &recv_ecc, data.len(), &mut errloc)
            .unwrap();
        errloc.truncate(n);
        errloc.sort_unstable();
        assert_eq!(errloc, expected);

        // mode c: pre-XORed parity
        let xored: Vec<u8> = recv_calc_ecc
            .iter()
            .zip(&recv_ecc)
            .map(|(a, b)| a ^ b)
            .collect();
        let mut errloc = vec![0u32; 4];
        let n = bch
            .decode_with_xored_ecc(&xored, data.len(), &mut errloc)
            .unwrap();
        errloc.truncate(n);
        errloc.sort_unstable();
        assert_eq!(errloc, expected);

        // mode d: raw syndromes
        load_ecc8(&mut bch.ecc_buf, &xored);
        bch.compute_syndromes();
        let syn = bch.syn.clone();
        let mut errloc = vec![0u32; 4];
        let n = bch
            .decode_with_syndromes(&syn, data.len(), &mut errloc)
            .unwrap();
        errloc.truncate(n);
        errloc.sort_unstable();
        assert_eq!(errloc, expected);
    }

    #[test]
    fn test_correct_is_self_inverse() {
        let mut bch = Bch::new(8, 4, None).unwrap();
        let mut rng = Lcg::new(0xD00DFEED12345678);

        let mut data = vec![0u8; 16];
        rng.fill_buffer(&mut data);
        let mut ecc = vec![0u8; bch.ecc_bytes()];
        bch.encode(&data, &mut ecc).unwrap();

        let mut corrupted = data.clone();
        corrupted[0] ^= 0x01;
        corrupted[9] ^= 0x10;

        let mut errloc = vec![0u32; 4];
        let nerr = bch.decode(&corrupted, &ecc, &mut errloc).unwrap();
        assert_eq!(nerr, 2);

        let mut fixed = corrupted.clone();
        bch.correct(&mut fixed, &errloc[..nerr]);
        assert_eq!(fixed, data);

        bch.correct(&mut fixed, &errloc[..nerr]);
        assert_eq!(fixed, corrupted);
    }
}

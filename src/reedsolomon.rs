/*  ************************************************************

    QR-Logo: http://qrlogo.kaarposoft.dk

    Copyright (C) 2011-2018 Henrik Kaare Poulsen

    Licensed under the Apache License, Version 2.0 (the "License");
    you may not use this file except in compliance with the License.
    You may obtain a copy of the License at

     http://www.apache.org/licenses/LICENSE-2.0

    Unless required by applicable law or agreed to in writing, software
    distributed under the License is distributed on an "AS IS" BASIS,
    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
    See the License for the specific language governing permissions and
    limitations under the License.

    ************************************************************ */


//  ************************************************************
//! Reed Solomon error correction over GF(256)
//  ************************************************************
//!
//! Field polynomial x^8 + x^4 + x^3 + x^2 + 1 (0x11D, "285"),
//! generator polynomial with roots a^0 .. a^(n-1).
//!
//! [`add_error_correction`] splits the data codewords into the blocks of a
//! [`SymbolPlan`], computes the error correction codewords of each block,
//! and interleaves everything into the final codeword sequence.

use std::fmt;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul};

use crate::tables::SymbolPlan;


//  ************************************************************
/// Reed Solomon encoder for a fixed number of error correction codewords
//  ************************************************************

pub struct ReedSolomonEncoder {
    n_ec_bytes: usize,
    gen_poly: Poly,
}

impl ReedSolomonEncoder {
    //  ************************************************************
    pub fn new(n_ec_bytes: usize) -> Self {
        let gen_poly = Poly::generator(n_ec_bytes);
        ReedSolomonEncoder { n_ec_bytes, gen_poly }
    }

    //  ************************************************************
    /// Remainder of `msg`·x^n divided by the generator, highest degree first
    pub fn encode(&self, msg: &[u8]) -> Vec<u8> {
        let n = self.n_ec_bytes;
        trace!("ReedSolomonEncoder::encode begin; n={} msg.len={}", n, msg.len());
        if n == 0 {
            return Vec::new();
        }
        let mut lfsr = vec![G(0); n];

        for &m in msg.iter() {
            let b = G(m) + lfsr[n - 1];
            let mut j = n;
            while j > 1 {
                j -= 1;
                lfsr[j] = lfsr[j - 1] + (self.gen_poly[j] * b);
            }
            lfsr[0] = self.gen_poly[0u8] * b;
        }

        let parity: Vec<u8> = lfsr.iter().rev().map(|&g| g.into()).collect();
        trace!("ReedSolomonEncoder::encode done; n={}, parity={:?}", n, parity);
        parity
    }
}


//  ************************************************************
/// Error correction codewords for one block
//  ************************************************************

pub fn encode_block(data: &[u8], ec_len: usize) -> Vec<u8> {
    ReedSolomonEncoder::new(ec_len).encode(data)
}


//  ************************************************************
/// Split `data` into blocks, add error correction and interleave
//  ************************************************************
///
/// Output is the first data codeword of every block, then the second, ...
/// (short blocks simply run out earlier), followed by the error correction
/// codewords interleaved the same way.

pub fn add_error_correction(data: &[u8], plan: &SymbolPlan) -> Vec<u8> {
    debug!("add_error_correction: data.len={} {}", data.len(), plan.name());
    if data.len() != plan.data_codewords {
        warn!(
            "add_error_correction: INCONSISTENT INPUT LENGTH: data.len={} data_codewords={}",
            data.len(),
            plan.data_codewords
        );
    }

    // Blocks in a plan share their ec length, so one encoder serves them all
    let mut encoders: Vec<(usize, ReedSolomonEncoder)> = Vec::new();
    let mut blocks: Vec<(&[u8], Vec<u8>)> = Vec::with_capacity(plan.ec_block_layout.len());
    let mut n = 0;
    for b in plan.ec_block_layout.iter() {
        let end = (n + b.data_codewords).min(data.len());
        let block = &data[n.min(end)..end];
        n = end;
        if !encoders.iter().any(|(len, _)| *len == b.ec_codewords) {
            encoders.push((b.ec_codewords, ReedSolomonEncoder::new(b.ec_codewords)));
        }
        let ec = encoders
            .iter()
            .find(|(len, _)| *len == b.ec_codewords)
            .map_or_else(Vec::new, |(_, rs)| rs.encode(block));
        blocks.push((block, ec));
    }

    let mut out_bytes = Vec::<u8>::with_capacity(plan.total_codewords);
    let max_data = blocks.iter().map(|(d, _)| d.len()).max().unwrap_or(0);
    for i in 0..max_data {
        for (d, _) in blocks.iter() {
            if i < d.len() {
                out_bytes.push(d[i]);
            }
        }
    }
    let max_ec = blocks.iter().map(|(_, e)| e.len()).max().unwrap_or(0);
    for i in 0..max_ec {
        for (_, e) in blocks.iter() {
            if i < e.len() {
                out_bytes.push(e[i]);
            }
        }
    }
    trace!("add_error_correction: out_bytes.len={} out_bytes={:?}", out_bytes.len(), out_bytes);
    if out_bytes.len() != plan.total_codewords {
        warn!(
            "add_error_correction: INCONSISTENT NUMBER OF OUTPUT CODE WORDS: out_bytes.len={} total_codewords={}",
            out_bytes.len(),
            plan.total_codewords
        );
    }
    out_bytes
}


//  ************************************************************
/// Polynomial over finite field
//  ************************************************************

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly {
    c: Vec<G>,
}

//  ************************************************************
impl Poly {
    //  ************************************************************
    pub fn new(nbytes: usize) -> Self {
        Poly { c: vec![G(0); nbytes] }
    }

    //  ************************************************************
    pub fn simplify(&mut self) {
        while self.c.len() > 1 && self.c[self.c.len() - 1] == G(0) {
            self.c.pop();
        }
    }

    //  ************************************************************
    pub fn generator(nbytes: usize) -> Self {
        trace!("Poly::generator begin; n={}", nbytes);

        // multiply (x + a^n) for n = 0 to nbytes-1

        let mut genpoly = Poly::new(nbytes.max(2));
        if nbytes == 0 {
            return Poly::new(0);
        }
        genpoly[0u8] = GF285_EXP[0];
        genpoly[1u8] = GF285_EXP[0];
        let mut tp = Poly::new(2);
        tp[1u8] = GF285_EXP[0];
        for i in 1..nbytes {
            tp[0u8] = GF285_EXP[i % 255];
            genpoly = &genpoly * &tp;
        }
        genpoly.simplify();
        trace!("Poly::generator done; n={}, genpoly={}", nbytes, genpoly);
        genpoly
    }

    //  ************************************************************
    /// Coefficients as exponents of a
    pub fn coef(&self) -> Vec<u8> {
        self.c
            .iter()
            .map(|&g| {
                let idx: usize = g.into();
                GF285_LOG[idx].into()
            })
            .collect()
    }
}

//  ************************************************************
impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.coef().fmt(f)
    }
}

//  ************************************************************
impl Index<u8> for Poly {
    type Output = G;

    fn index(&self, idx: u8) -> &G {
        let i = idx as usize;
        if i >= self.c.len() {
            return &G(0);
        }
        &self.c[i]
    }
}

//  ************************************************************
impl IndexMut<u8> for Poly {
    fn index_mut(&mut self, idx: u8) -> &mut G {
        &mut self.c[idx as usize]
    }
}

//  ************************************************************
impl Index<usize> for Poly {
    type Output = G;

    fn index(&self, idx: usize) -> &G {
        &self.c[idx]
    }
}


//  ************************************************************
///  polynomial multiplication
//  ************************************************************

impl<'a> Mul for &'a Poly {
    type Output = Poly;

    fn mul(self, other: &Poly) -> Poly {
        let m = self.c.len();
        let n = other.c.len();
        insane!("Poly::Mul::mul begin; n={} m={}", n, m);
        let mut dst = Poly::new(n + m);
        for i in 0..m {
            for j in 0..n {
                dst.c[i + j] += self.c[i] * other.c[j];
            }
        }
        dst.simplify();
        insane!("Poly::Mul::mul dst={}", dst);
        dst
    }
}


//  ************************************************************
/// Element in Galois Field
//  ************************************************************

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct G(u8);

impl From<G> for u8 {
    fn from(g: G) -> u8 {
        g.0
    }
}

//  ************************************************************
impl From<G> for usize {
    fn from(g: G) -> usize {
        g.0 as usize
    }
}

//  ************************************************************
impl Mul for G {
    type Output = G;

    fn mul(self, other: G) -> G {
        // Galois field multiplication
        if self.0 == 0 || other.0 == 0 {
            return G(0);
        }
        let i: u16 = GF285_LOG[self.0 as usize].0 as u16;
        let j: u16 = GF285_LOG[other.0 as usize].0 as u16;
        GF285_EXP[((i + j) % 255) as usize]
    }
}

//  ************************************************************
impl AddAssign for G {
    fn add_assign(&mut self, other: G) {
        *self = *self + other;
    }
}

//  ************************************************************
impl Add for G {
    type Output = G;
    fn add(self, other: G) -> G {
        G(self.0 ^ other.0)
    }
}


//  ************************************************************
/// Exponentials and logarithms for Galois Field 285
//  ************************************************************
///
/// `exp[255]` is 0 and `log[0]` is 255, so both tables are permutations of 0..=255.

const fn gf285_tables() -> ([G; 256], [G; 256]) {
    let mut exp = [G(0); 256];
    let mut log = [G(0); 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = G(x as u8);
        log[x as usize] = G(i as u8);
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= 0x11D;
        }
        i += 1;
    }
    log[0] = G(0xFF);
    (exp, log)
}

const GF285: ([G; 256], [G; 256]) = gf285_tables();
const GF285_EXP: [G; 256] = GF285.0;
const GF285_LOG: [G; 256] = GF285.1;




//  ************************************************************
#[cfg(test)]
//  ************************************************************

mod encoder {
    use super::*;
    use crate::tables::{QrRules, VariantRules};
    use crate::EccLevel;

    #[test]
    fn encode_1m() {
        let data = [0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11];
        let ec = encode_block(&data, 10);
        assert_eq!(ec, vec![0xA5, 0x24, 0xD4, 0xC1, 0xED, 0x36, 0xC7, 0x87, 0x2C, 0x55]);
    }

    #[test]
    fn encode_zero_is_zero() {
        assert_eq!(encode_block(&[0; 20], 7), vec![0; 7]);
        assert!(encode_block(&[1, 2, 3], 0).is_empty());
    }

    #[test]
    fn codeword_is_multiple_of_generator() {
        // data followed by its parity evaluates to zero at every root of the generator
        let data: Vec<u8> = (0..40u8).map(|i| i.wrapping_mul(37).wrapping_add(11)).collect();
        for &n in [7usize, 10, 13, 22, 30].iter() {
            let mut cw = data.clone();
            cw.extend(encode_block(&data, n));
            for r in 0..n {
                let root = GF285_EXP[r];
                let mut acc = G(0);
                for &c in cw.iter() {
                    acc = acc * root + G(c);
                }
                assert!(acc == G(0), "CODEWORD NOT DIVISIBLE: n={} root={}", n, r);
            }
        }
    }

    #[test]
    fn interleave_5q() {
        let plan = QrRules.plan(5, EccLevel::Q).unwrap();
        let data: Vec<u8> = (0..plan.data_codewords as u32).map(|i| i as u8).collect();
        let out = add_error_correction(&data, &plan);
        assert_eq!(out.len(), plan.total_codewords);
        // blocks start at 0, 15, 30, 46 (two short blocks of 15, two long of 16)
        assert_eq!(&out[0..8], &[0, 15, 30, 46, 1, 16, 31, 47]);
        // the extra codewords of the long blocks come last
        assert_eq!(&out[60..62], &[45, 61]);
        let ec0 = encode_block(&data[0..15], 18);
        assert_eq!(out[62], ec0[0]);
        assert_eq!(out[66], ec0[1]);
    }
}

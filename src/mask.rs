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
//! Data masking and mask selection
//  ************************************************************
//!
//! All mask candidates of a symbol are kept side by side in one [`Matrix`]:
//! each module is a byte, and bit `i` of the byte is the module's color
//! under candidate `i`, format information included.
//!
//! | Variant | Candidates | Selection |
//! | ------- | ---------- | --------- |
//! | QR Code, UPNQR | patterns 0..=7 | lowest penalty (N1 + N2 + N3 + N4) |
//! | Micro QR | patterns 1, 4, 6, 7 | highest edge score |
//! | rMQR | pattern 4 only | none |

use crate::matrix::{format_modules, Grid, Module};
use crate::{EccLevel, Variant};


//  ************************************************************
/// True if mask `pattern` (0..=7) inverts the module at (row, col)
//  ************************************************************

pub fn mask_bit(pattern: u8, row: usize, col: usize) -> bool {
    let (i, j) = (row, col);
    match pattern {
        0 => (i + j) % 2 == 0,
        1 => i % 2 == 0,
        2 => j % 3 == 0,
        3 => (i + j) % 3 == 0,
        4 => (i / 2 + j / 3) % 2 == 0,
        5 => (i * j) % 2 + (i * j) % 3 == 0,
        6 => ((i * j) % 2 + (i * j) % 3) % 2 == 0,
        _ => ((i + j) % 2 + (i * j) % 3) % 2 == 0,
    }
}


//  ************************************************************
/// Mask patterns tried for `variant`; the index in the slice is the number written to the format information
//  ************************************************************

pub fn candidates(variant: Variant) -> &'static [u8] {
    match variant {
        Variant::Qr | Variant::Upnqr => &[0, 1, 2, 3, 4, 5, 6, 7],
        Variant::MicroQr => &[1, 4, 6, 7],
        Variant::Rmqr => &[4],
    }
}


//  ************************************************************
/// Rectangular matrix of `u8` (byte) values, one bit per mask candidate
//  ************************************************************

#[derive(Debug)]
pub struct Matrix {
    rows: usize,
    width: usize,
    data: Vec<u8>,
}

//  ************************************************************
impl Matrix {
    //  ************************************************************
    /// All mask candidates of a fully placed `grid`
    pub fn new(grid: &Grid, variant: Variant, version: u8, ecc: EccLevel) -> Self {
        let patterns = candidates(variant);
        let (rows, width) = (grid.rows, grid.width);
        let mut data = vec![0u8; rows * width];
        for row in 0..rows {
            for col in 0..width {
                data[row * width + col] = match grid.get(row, col) {
                    Module::Function(true) => 0xFF,
                    Module::Function(false) | Module::Empty => 0,
                    Module::Data(d) => {
                        let mut b = 0u8;
                        for (k, &p) in patterns.iter().enumerate() {
                            if d != mask_bit(p, row, col) {
                                b |= 1 << k;
                            }
                        }
                        b
                    }
                };
            }
        }
        let mut m = Matrix { rows, width, data };
        for k in 0..patterns.len() {
            for (row, col, dark) in format_modules(variant, version, ecc, k as u8) {
                m.set_one(row, col, k as u8, dark);
            }
        }
        m
    }

    //  ************************************************************
    pub fn get_dim(&self) -> (usize, usize) {
        (self.rows, self.width)
    }

    //  ************************************************************
    pub fn get_one(&self, row: usize, col: usize, i: u8) -> bool {
        (self.data[row * self.width + col] & (1 << i)) > 0
    }

    //  ************************************************************
    fn set_one(&mut self, row: usize, col: usize, i: u8, dark: bool) {
        let b = &mut self.data[row * self.width + col];
        if dark {
            *b |= 1 << i;
        } else {
            *b &= !(1 << i);
        }
    }

    //  ************************************************************
    /// Modules of candidate `i`, row by row
    pub fn modules(&self, i: u8) -> Vec<bool> {
        self.data.iter().map(|&b| b & (1 << i) > 0).collect()
    }
}


//  ************************************************************
/// Choose a mask candidate for the placed `matrix`
//  ************************************************************
///
/// A `forced` candidate is used as is. rMQR has only one candidate.

pub fn select_mask(matrix: &Matrix, variant: Variant, forced: Option<u8>) -> u8 {
    if let Some(m) = forced {
        debug!("select_mask: forced mask={}", m);
        return m;
    }
    match variant {
        Variant::Qr | Variant::Upnqr => best_penalty(matrix),
        Variant::MicroQr => best_micro_score(matrix),
        Variant::Rmqr => 0,
    }
}


//  ************************************************************
/// Mask with the lowest penalty; ties go to the lowest mask number
pub fn best_penalty(matrix: &Matrix) -> u8 {
    let mut best_penalty = u32::max_value();
    let mut best_mask = 0u8;
    for mask in 0..8 {
        let p = penalty(matrix, mask);
        if p < best_penalty {
            best_penalty = p;
            best_mask = mask;
        }
    }
    debug!("best_penalty: best_penalty={} best_mask={}", best_penalty, best_mask);
    best_mask
}


//  ************************************************************
/// Micro QR evaluation
///
/// With SUM1 dark modules in the right edge and SUM2 in the bottom edge (timing excluded),
/// the score is 16 * min(SUM1, SUM2) + max(SUM1, SUM2). The highest score wins.
pub fn micro_score(matrix: &Matrix, mask: u8) -> u32 {
    let (n, _) = matrix.get_dim();
    let sum1 = (1..n).filter(|&r| matrix.get_one(r, n - 1, mask)).count() as u32;
    let sum2 = (1..n).filter(|&c| matrix.get_one(n - 1, c, mask)).count() as u32;
    16 * sum1.min(sum2) + sum1.max(sum2)
}

//  ************************************************************
fn best_micro_score(matrix: &Matrix) -> u8 {
    let mut best = (0u32, 0u8);
    for mask in 0..4 {
        let s = micro_score(matrix, mask);
        trace!("best_micro_score: mask={} score={}", mask, s);
        if mask == 0 || s > best.0 {
            best = (s, mask);
        }
    }
    debug!("best_micro_score: best_score={} best_mask={}", best.0, best.1);
    best.1
}


//  ************************************************************
pub fn penalty(matrix: &Matrix, mask: u8) -> u32 {
    let p_adjacent = penalty_adjacent(matrix, mask);
    let p_blocks = penalty_blocks(matrix, mask);
    let p_ratio = penalty_ratio(matrix, mask);
    let p_dark = penalty_dark(matrix, mask);
    let p_total = p_adjacent + p_blocks + p_ratio + p_dark;
    trace!(
        "penalty: mask={} p_adjacent={} p_blocks={} p_ratio={} p_dark={} p_total={}",
        mask,
        p_adjacent,
        p_blocks,
        p_ratio,
        p_dark,
        p_total
    );
    p_total
}

const PENALTY_N1: u32 = 3;
const PENALTY_N2: u32 = 3;
const PENALTY_N3: u32 = 40;
const PENALTY_N4: u32 = 10;

/// Light modules assumed outside the symbol when looking for finder-like patterns
const QUIET: u8 = 4;


//  ************************************************************
/// Module (row, col) or, transposed, (col, row)
fn module(matrix: &Matrix, by_row: bool, i: usize, j: usize, mask: u8) -> bool {
    if by_row {
        matrix.get_one(i, j, mask)
    } else {
        matrix.get_one(j, i, mask)
    }
}

//  ************************************************************
/// (lines, modules per line) for rows or for columns
fn lines(matrix: &Matrix, by_row: bool) -> (usize, usize) {
    let (rows, width) = matrix.get_dim();
    if by_row {
        (rows, width)
    } else {
        (width, rows)
    }
}


//  ************************************************************
/// Calculate penalty for adjacent modules in row/column in same color
///
/// # Feature:
/// Adjacent modules in row/column in same color
///
/// # Evaluation condition:
/// No. of modules = (5 + i)
///
/// # Points:
/// N1 + i
//  ************************************************************
pub fn penalty_adjacent(matrix: &Matrix, mask: u8) -> u32 {
    let mut points = 0;
    for &by_row in [true, false].iter() {
        let (n_lines, len) = lines(matrix, by_row);
        for i in 0..n_lines {
            let mut n = 0;
            let mut counting_dark = false;
            for j in 0..len {
                let is_dark = module(matrix, by_row, i, j, mask);
                if j == 0 {
                    counting_dark = is_dark;
                    n = 0;
                }
                if counting_dark == is_dark {
                    n += 1;
                } else {
                    if n >= 5 {
                        insane!("penalty_adjacent: by_row={} i={} j={} n={}", by_row, i, j, n);
                        points += PENALTY_N1 + n - 5;
                    }
                    counting_dark = !counting_dark;
                    n = 1;
                }
            }
            if n >= 5 {
                points += PENALTY_N1 + n - 5;
            }
        }
    }
    points
}


//  ************************************************************
/// Calculate penalty for block of modules in same color
///
/// # Feature:
/// Block of modules in same color
///
/// # Evaluation condition:
/// Block size = 2 x 2
///
/// # Points:
/// N2 per block, overlapping blocks counted separately
//  ************************************************************
pub fn penalty_blocks(matrix: &Matrix, mask: u8) -> u32 {
    let (rows, width) = matrix.get_dim();
    let mut p = 0;
    for i in 0..rows - 1 {
        for j in 0..width - 1 {
            let b = matrix.get_one(i, j, mask);
            if matrix.get_one(i + 1, j, mask) == b && matrix.get_one(i, j + 1, mask) == b && matrix.get_one(i + 1, j + 1, mask) == b {
                p += PENALTY_N2;
            }
        }
    }
    p
}


//  ************************************************************
/// Calculate penalty for 1:1:3:1:1 ratio (dark:light:dark:light:dark) pattern in row/column
///
/// # Feature:
/// 1:1:3:1:1 ratio (dark:light:dark:light:dark) pattern in row/column,
/// preceded or followed by light area 4 modules wide
///
/// # Evaluation condition:
/// Existence of the pattern; the area outside the symbol counts as light
///
/// # Points:
/// N3
//  ************************************************************
pub fn penalty_ratio(matrix: &Matrix, mask: u8) -> u32 {
    let mut points = 0;
    let mut pat = PenaltyPattern::new();
    for &by_row in [true, false].iter() {
        let (n_lines, len) = lines(matrix, by_row);
        for i in 0..n_lines {
            pat.reset();
            let mut counting_dark = false;
            let mut n = QUIET;
            for j in 0..len {
                let is_dark = module(matrix, by_row, i, j, mask);
                if counting_dark == is_dark {
                    n += 1;
                } else {
                    if pat.push(counting_dark, n) {
                        insane!("penalty_ratio: by_row={} i={} j={} {:?}", by_row, i, j, pat);
                        points += PENALTY_N3;
                    }
                    counting_dark = !counting_dark;
                    n = 1;
                }
            }
            if counting_dark {
                if pat.push(true, n) {
                    points += PENALTY_N3;
                }
                n = 0;
            }
            if pat.push(false, n + QUIET) {
                points += PENALTY_N3;
            }
        }
    }
    points
}


//  ************************************************************
/// Calculate penalty for proportion of dark modules in entire symbol
///
/// # Feature:
/// Proportion of dark modules in entire symbol
///
/// # Evaluation condition:
/// 50 +/- (5*k)% to 50 +/- (5*(k+1))%
///
/// # Points:
/// N4 x k
//  ************************************************************
pub fn penalty_dark(matrix: &Matrix, mask: u8) -> u32 {
    let (rows, width) = matrix.get_dim();
    let total = rows * width;
    let dark = matrix.data.iter().filter(|&&b| b & (1 << mask) > 0).count();
    let k = ((20 * dark) as isize - (10 * total) as isize).abs() as usize / total;
    (k as u32) * PENALTY_N4
}


//  ************************************************************
/// Helper structure to find 1:1:3:1:1 patterns to give penalty
//  ************************************************************
///
/// Keeps the last 8 run lengths of a line, light runs at even positions.
/// A pattern is reported once, when its second light border has been seen,
/// or earlier, when the border before it is already wide enough.

#[derive(Debug)]
pub struct PenaltyPattern {
    pat: [u8; 8],
    idx: usize,
    cnt: usize,
}

//  ************************************************************
impl PenaltyPattern {
    //  ************************************************************
    pub fn new() -> Self {
        PenaltyPattern { pat: [0; 8], idx: 0, cnt: 0 }
    }

    //  ************************************************************
    pub fn reset(&mut self) {
        self.pat = [0; 8];
        self.idx = 0;
        self.cnt = 0;
    }

    //  ************************************************************
    pub fn push(&mut self, dark: bool, n: u8) -> bool {
        self.cnt += 1;
        if dark {
            self.push_dark(n)
        } else {
            self.push_light(n)
        }
    }

    //  ************************************************************
    fn push_light(&mut self, n: u8) -> bool {
        debug_assert!(self.idx % 2 == 0);
        self.pat[self.idx] = n;
        self.idx = (self.idx + 1) % 8;
        let i = self.idx;
        if (self.cnt >= 5 + 1) && (n >= 4) && (self.pat[(i + 1) % 8] < 4) {
            let n1 = self.pat[(i + 2) % 8];
            (n1 > 0)
                && (self.pat[(i + 3) % 8] == n1)
                && (u16::from(self.pat[(i + 4) % 8]) == 3 * u16::from(n1))
                && (self.pat[(i + 5) % 8] == n1)
                && (self.pat[(i + 6) % 8] == n1)
        } else {
            false
        }
    }

    //  ************************************************************
    fn push_dark(&mut self, n: u8) -> bool {
        debug_assert!(self.idx % 2 == 1);
        self.pat[self.idx] = n;
        self.idx = (self.idx + 1) % 8;
        let i = self.idx;
        if (n > 0) && (self.cnt >= 5 + 1) && (self.pat[(i + 2) % 8] >= 4) {
            (self.pat[(i + 3) % 8] == n)
                && (self.pat[(i + 4) % 8] == n)
                && (u16::from(self.pat[(i + 5) % 8]) == 3 * u16::from(n))
                && (self.pat[(i + 6) % 8] == n)
        } else {
            false
        }
    }
}

impl Default for PenaltyPattern {
    fn default() -> Self {
        PenaltyPattern::new()
    }
}


//  ************************************************************

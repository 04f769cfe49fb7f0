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
//! Module placement: function patterns, data and format/version information
//  ************************************************************
//!
//! Coordinates are always (row, col), with (0, 0) in the top left corner.
//!
//! # References
//!
//! - ISO/IEC 18004:2015 sections 6.3, 7.7, 7.9 and 7.10
//! - ISO/IEC 23941:2022 sections 7.3, 7.7 and 7.8

use crate::bitstream::BitSeq;
use crate::tables::SymbolPlan;
use crate::{EccLevel, Variant};


//  ************************************************************
/// State of one module while the symbol is built
//  ************************************************************

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Module {
    /// Not yet assigned
    Empty,
    /// Data or error correction bit, subject to masking
    Data(bool),
    /// Finder, separator, timing, alignment, format or version module
    Function(bool),
}

impl Module {
    pub fn is_dark(self) -> bool {
        match self {
            Module::Data(d) | Module::Function(d) => d,
            Module::Empty => false,
        }
    }
}


//  ************************************************************
/// Rectangular grid of modules, stored row by row
//  ************************************************************

#[derive(Clone, Debug)]
pub struct Grid {
    pub rows: usize,
    pub width: usize,
    modules: Vec<Module>,
}

//  ************************************************************
impl Grid {
    //  ************************************************************
    pub fn new(rows: usize, width: usize) -> Self {
        Grid { rows, width, modules: vec![Module::Empty; rows * width] }
    }

    //  ************************************************************
    pub fn get(&self, row: usize, col: usize) -> Module {
        self.modules[row * self.width + col]
    }

    //  ************************************************************
    pub fn set(&mut self, row: usize, col: usize, m: Module) {
        self.modules[row * self.width + col] = m;
    }

    //  ************************************************************
    pub fn set_function(&mut self, row: usize, col: usize, dark: bool) {
        self.set(row, col, Module::Function(dark));
    }

    //  ************************************************************
    pub fn count(&self, f: impl Fn(Module) -> bool) -> usize {
        self.modules.iter().filter(|&&m| f(m)).count()
    }
}


//  ************************************************************
/// Grid with all function patterns in place, format and version areas reserved
//  ************************************************************

pub fn function_patterns(variant: Variant, version: u8) -> Grid {
    let (rows, width) = variant.rules().dimensions(version);
    let mut grid = Grid::new(rows, width);
    match variant {
        Variant::Qr | Variant::Upnqr => qr_function_patterns(&mut grid, version),
        Variant::MicroQr => micro_function_patterns(&mut grid),
        Variant::Rmqr => rmqr_function_patterns(&mut grid, version),
    }
    // Reserve format information; the real bits are written after masking
    for (row, col, _) in format_modules(variant, version, EccLevel::M, 0) {
        grid.set_function(row, col, false);
    }
    trace!(
        "function_patterns: {:?} version={} rows={} width={} free={}",
        variant,
        version,
        rows,
        width,
        grid.count(|m| m == Module::Empty)
    );
    grid
}


//  ************************************************************
/// 7x7 finder with its top left corner at (row, col)
fn set_finder_pattern(grid: &mut Grid, row: usize, col: usize) {
    for i in 0..7 {
        for j in 0..7 {
            // dark outer ring, light ring, dark 3x3 centre
            let ring = (i as isize - 3).abs().max((j as isize - 3).abs());
            grid.set_function(row + i, col + j, ring != 2);
        }
    }
}

//  ************************************************************
/// 5x5 alignment pattern (or rMQR finder sub-pattern) centred at (row, col)
fn set_alignment_pattern(grid: &mut Grid, row: usize, col: usize) {
    for i in 0..5 {
        for j in 0..5 {
            let ring = (i as isize - 2).abs().max((j as isize - 2).abs());
            grid.set_function(row + i - 2, col + j - 2, ring != 1);
        }
    }
}


//  ************************************************************
fn qr_function_patterns(grid: &mut Grid, version: u8) {
    let n = grid.width;

    // Separators: light 8x8 corners, finders on top
    for i in 0..8 {
        for j in 0..8 {
            grid.set_function(i, j, false);
            grid.set_function(i, n - 8 + j, false);
            grid.set_function(n - 8 + i, j, false);
        }
    }
    set_finder_pattern(grid, 0, 0);
    set_finder_pattern(grid, 0, n - 7);
    set_finder_pattern(grid, n - 7, 0);

    // Timing
    for i in 8..n - 8 {
        grid.set_function(6, i, i % 2 == 0);
        grid.set_function(i, 6, i % 2 == 0);
    }

    // Alignment, except where a finder sits
    let centres = Variant::Qr.rules().alignment_centres(version);
    if let Some(&last) = centres.last() {
        for &r in centres.iter() {
            for &c in centres.iter() {
                if (r == 6 && c == 6) || (r == 6 && c == last) || (r == last && c == 6) {
                    continue;
                }
                set_alignment_pattern(grid, r as usize, c as usize);
            }
        }
    }

    // Dark module
    grid.set_function(n - 8, 8, true);

    if version >= 7 {
        let info = version_info(version);
        for i in 0..6 {
            for k in 0..3 {
                let dark = (info >> (i * 3 + k)) & 1 == 1;
                grid.set_function(n - 11 + k, i, dark);
                grid.set_function(i, n - 11 + k, dark);
            }
        }
    }
}


//  ************************************************************
fn micro_function_patterns(grid: &mut Grid) {
    let n = grid.width;
    for i in 0..8 {
        grid.set_function(7, i, false);
        grid.set_function(i, 7, false);
    }
    set_finder_pattern(grid, 0, 0);
    for i in 8..n {
        grid.set_function(0, i, i % 2 == 0);
        grid.set_function(i, 0, i % 2 == 0);
    }
}


//  ************************************************************
fn rmqr_function_patterns(grid: &mut Grid, version: u8) {
    let (h, w) = (grid.rows, grid.width);

    // Timing along all four edges
    for c in 0..w {
        grid.set_function(0, c, c % 2 == 0);
        grid.set_function(h - 1, c, c % 2 == 0);
    }
    for r in 0..h {
        grid.set_function(r, 0, r % 2 == 0);
        grid.set_function(r, w - 1, r % 2 == 0);
    }

    set_finder_pattern(grid, 0, 0);
    set_alignment_pattern(grid, h - 3, w - 3);

    // Corner finder sub-patterns
    grid.set_function(h - 2, 0, true);
    grid.set_function(h - 2, 1, false);
    grid.set_function(h - 1, 1, true);
    grid.set_function(0, w - 2, true);
    grid.set_function(1, w - 2, false);
    grid.set_function(1, w - 1, true);

    // Separator
    for r in 0..7 {
        grid.set_function(r, 7, false);
    }
    if h > 7 {
        for c in 0..8 {
            grid.set_function(7, c, false);
        }
    }

    // Alignment: vertical timing with 3x3 squares at top and bottom
    for &c in Variant::Rmqr.rules().alignment_centres(version).iter() {
        let c = c as usize;
        for r in 0..h {
            grid.set_function(r, c, r % 2 == 0);
        }
        for &r in [1, 2, h - 3, h - 2].iter() {
            grid.set_function(r, c - 1, true);
            grid.set_function(r, c + 1, true);
        }
    }
}


//  ************************************************************
/// Fill the empty modules of `grid` with `bits`, two columns at a time
//  ************************************************************
///
/// Starts at the bottom right going up, reversing direction at each column pair.
/// QR Code skips the vertical timing column 6; rMQR starts left of its right timing column.
/// Modules left over when the bits run out are remainder bits (light).
/// Returns the number of remainder modules.

pub fn place_bits(grid: &mut Grid, variant: Variant, bits: &BitSeq) -> usize {
    let mut it = bits.into_iter();
    let mut remainder = 0;
    let (rows, width) = (grid.rows as isize, grid.width as isize);
    let mut right = if variant == Variant::Rmqr { width - 2 } else { width - 1 };
    let mut upward = true;
    let skip_timing = variant == Variant::Qr || variant == Variant::Upnqr;
    while right >= 0 {
        if skip_timing && right == 6 {
            right = 5;
        }
        for k in 0..rows {
            let row = (if upward { rows - 1 - k } else { k }) as usize;
            for &col in [right, right - 1].iter() {
                if col < 0 || grid.get(row, col as usize) != Module::Empty {
                    continue;
                }
                match it.next() {
                    Some(b) => grid.set(row, col as usize, Module::Data(b)),
                    None => {
                        grid.set(row, col as usize, Module::Data(false));
                        remainder += 1;
                    }
                }
            }
        }
        upward = !upward;
        right -= 2;
    }
    if it.next().is_some() {
        error!("place_bits: TOO MUCH DATA FOR SNAKE: {:?} {}x{}", variant, rows, width);
    }
    debug!("place_bits: {:?} {}x{} remainder={}", variant, rows, width, remainder);
    remainder
}


//  ************************************************************
/// Bits to place for the final codewords of `plan`
//  ************************************************************
///
/// A half data codeword (Micro QR M1, M3) contributes only its high nibble.

pub fn codeword_bits(codewords: &[u8], plan: &SymbolPlan) -> BitSeq {
    let mut bits = BitSeq::with_capacity(codewords.len());
    let half = if plan.has_half_codeword() { Some(plan.data_codewords - 1) } else { None };
    for (i, &cw) in codewords.iter().enumerate() {
        if Some(i) == half {
            bits.append_bits(u32::from(cw >> 4), 4);
        } else {
            bits.append_bits(u32::from(cw), 8);
        }
    }
    bits
}


/* ============================================================
 * Format and version information
 * ============================================================
 */

//  ************************************************************
/// `data` followed by the remainder of its division by `generator` (BCH code)
//  ************************************************************

fn bch(data: u32, generator: u32, gen_degree: u32) -> u32 {
    let mut rem = data << gen_degree;
    while rem != 0 && 32 - rem.leading_zeros() - 1 >= gen_degree {
        let shift = 32 - rem.leading_zeros() - 1 - gen_degree;
        rem ^= generator << shift;
    }
    (data << gen_degree) | rem
}

//  ************************************************************
/// QR Code 15 bit format information
pub fn qr_format_info(ecc: EccLevel, mask: u8) -> u16 {
    let data = (u32::from(ecc.format_bits()) << 3) | u32::from(mask);
    (bch(data, 0x537, 10) ^ 0x5412) as u16
}

//  ************************************************************
/// Micro QR symbol number (0..=7) identifying version and ECC level
pub fn micro_symbol_number(version: u8, ecc: EccLevel) -> u8 {
    match (version, ecc) {
        (1, _) => 0,
        (2, EccLevel::L) => 1,
        (2, _) => 2,
        (3, EccLevel::L) => 3,
        (3, _) => 4,
        (4, EccLevel::L) => 5,
        (4, EccLevel::M) => 6,
        _ => 7,
    }
}

//  ************************************************************
/// Micro QR 15 bit format information; `mask` is the Micro QR mask number 0..=3
pub fn micro_format_info(version: u8, ecc: EccLevel, mask: u8) -> u16 {
    let data = (u32::from(micro_symbol_number(version, ecc)) << 2) | u32::from(mask);
    (bch(data, 0x537, 10) ^ 0x4445) as u16
}

//  ************************************************************
/// rMQR 18 bit format information, (left, right) copies
pub fn rmqr_format_info(version: u8, ecc: EccLevel) -> (u32, u32) {
    let data = u32::from(version - 1) | if ecc == EccLevel::H { 0x20 } else { 0 };
    let info = bch(data, 0x1F25, 12);
    (info ^ 0x1FAB2, info ^ 0x20A7B)
}

//  ************************************************************
/// QR Code 18 bit version information (versions 7 and up)
pub fn version_info(version: u8) -> u32 {
    bch(u32::from(version), 0x1F25, 12)
}


//  ************************************************************
/// Positions and values of all format information modules
//  ************************************************************
///
/// `mask` is the number written into the format information:
/// 0..=7 for QR Code, 0..=3 for Micro QR, ignored for rMQR.

pub fn format_modules(variant: Variant, version: u8, ecc: EccLevel, mask: u8) -> Vec<(usize, usize, bool)> {
    let (rows, width) = variant.rules().dimensions(version);
    let mut res = Vec::with_capacity(36);
    match variant {
        Variant::Qr | Variant::Upnqr => {
            let info = qr_format_info(ecc, mask);
            let n = width;
            for i in 0..15 {
                let bit = (info >> i) & 1 == 1;
                let first = match i {
                    0..=5 => (i, 8),
                    6 => (7, 8),
                    7 => (8, 8),
                    8 => (8, 7),
                    _ => (8, 14 - i),
                };
                let second = if i < 8 { (8, n - 1 - i) } else { (n - 15 + i, 8) };
                res.push((first.0, first.1, bit));
                res.push((second.0, second.1, bit));
            }
        }
        Variant::MicroQr => {
            let info = micro_format_info(version, ecc, mask);
            for i in 0..15 {
                let bit = (info >> (14 - i)) & 1 == 1;
                let (row, col) = if i < 8 { (8, 1 + i) } else { (15 - i, 8) };
                res.push((row, col, bit));
            }
        }
        Variant::Rmqr => {
            let (left, right) = rmqr_format_info(version, ecc);
            let (h, w) = (rows, width);
            for j in 0..3 {
                for i in 0..5 {
                    let k = j * 5 + i;
                    res.push((i + 1, 8 + j, (left >> k) & 1 == 1));
                    res.push((h - 6 + i, w - 8 + j, (right >> k) & 1 == 1));
                }
            }
            for i in 0..3 {
                res.push((i + 1, 11, (left >> (15 + i)) & 1 == 1));
                res.push((h - 6, w - 5 + i, (right >> (15 + i)) & 1 == 1));
            }
        }
    }
    res
}


//  ************************************************************

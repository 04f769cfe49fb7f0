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
//! Capacity and geometry tables for QR Code, Micro QR Code and rMQR
//  ************************************************************
//!
//! # References
//!
//! - ISO/IEC 18004:2015 Tables 1, 3, 7, 9 and E.1
//! - ISO/IEC 23941:2022 Tables 2, 3, 6, 7 and 8
//!
//! Each symbol family is described by a [`VariantRules`] implementation.
//! The rest of the pipeline asks these rules about versions, capacities,
//! header widths and alignment positions, and never matches on the variant itself.

use std::ops::RangeInclusive;

use crate::{EccLevel, Mode, Variant};


//  ************************************************************
/// Number of light modules around a finished symbol
//  ************************************************************

pub const QUIET_ZONE: usize = 4;

/// Micro QR and rMQR only need half the quiet zone
pub const QUIET_ZONE_MICRO: usize = 2;

pub const QR_VERSION_MAX: u8 = 40;
pub const MICRO_VERSION_MAX: u8 = 4;
pub const RMQR_VERSION_MAX: u8 = 32;

/// Virtual rMQR versions 33..=38 select a fixed height (R7, R9, ..., R17) with automatic width
pub const RMQR_AUTO_WIDTH_MIN: u8 = 33;
pub const RMQR_AUTO_WIDTH_MAX: u8 = 38;

/// UPNQR is always version 15
pub const UPNQR_VERSION: u8 = 15;
pub const UPNQR_ECI: u32 = 4;


//  ************************************************************
/// The 45 characters of the alphanumeric mode, in value order
//  ************************************************************

pub const ALPHANUMERIC: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";


//  ************************************************************
/// Value (0..45) of an alphanumeric character
//  ************************************************************

pub fn alnum_value(c: u32) -> Option<u8> {
    match c {
        0x30..=0x39 => Some((c - 0x30) as u8),
        0x41..=0x5A => Some((c - 0x41 + 10) as u8),
        0x20 => Some(36),
        0x24 => Some(37),
        0x25 => Some(38),
        0x2A => Some(39),
        0x2B => Some(40),
        0x2D => Some(41),
        0x2E => Some(42),
        0x2F => Some(43),
        0x3A => Some(44),
        _ => None,
    }
}


//  ************************************************************
/// One Reed-Solomon block of a symbol
//  ************************************************************

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EcBlock {
    pub data_codewords: usize,
    pub ec_codewords: usize,
}


//  ************************************************************
/// Descriptor of one (variant, version, ecc) candidate
//  ************************************************************
///
/// Short blocks always come before long blocks in `ec_block_layout`.
/// For Micro QR M1 and M3 the last data codeword only holds 4 bits,
/// which is why `data_bits` is kept next to `data_codewords`.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolPlan {
    pub variant: Variant,
    pub version: u8,
    pub ecc: EccLevel,
    pub data_bits: usize,
    pub data_codewords: usize,
    pub total_codewords: usize,
    pub ec_block_layout: Vec<EcBlock>,
}

impl SymbolPlan {
    //  ************************************************************
    fn from_groups(variant: Variant, version: u8, ecc: EccLevel, ec: usize, groups: &[(usize, usize)]) -> Self {
        let mut ec_block_layout = Vec::new();
        for &(n, k) in groups.iter() {
            for _ in 0..n {
                ec_block_layout.push(EcBlock { data_codewords: k, ec_codewords: ec });
            }
        }
        let data_codewords = ec_block_layout.iter().map(|b| b.data_codewords).sum();
        let total_codewords = ec_block_layout.iter().map(|b| b.data_codewords + b.ec_codewords).sum();
        SymbolPlan {
            variant,
            version,
            ecc,
            data_bits: 8 * data_codewords,
            data_codewords,
            total_codewords,
            ec_block_layout,
        }
    }

    //  ************************************************************
    /// True if the last data codeword only carries 4 bits (Micro QR M1 and M3)
    pub fn has_half_codeword(&self) -> bool {
        self.data_bits % 8 != 0
    }

    //  ************************************************************
    /// Number of bits placed in the matrix (data and error correction)
    pub fn total_bits(&self) -> usize {
        self.data_bits + 8 * (self.total_codewords - self.data_codewords)
    }

    //  ************************************************************
    pub fn name(&self) -> String {
        self.variant.rules().version_name(self.version, self.ecc)
    }
}


//  ************************************************************
/// Per variant capacity, header and geometry rules
//  ************************************************************

pub trait VariantRules: Sync {
    /// Legal (real) version numbers
    fn versions(&self) -> RangeInclusive<u8>;

    /// ECC levels defined for `version`, weakest first
    fn ecc_levels(&self, version: u8) -> &'static [EccLevel];

    /// Capacity and block structure, `None` if the combination does not exist
    fn plan(&self, version: u8, ecc: EccLevel) -> Option<SymbolPlan>;

    /// (rows, width) in modules, without quiet zone
    fn dimensions(&self, version: u8) -> (usize, usize);

    /// Mode indicator (value, width), `None` if `mode` is not available at `version`
    fn mode_indicator(&self, version: u8, mode: Mode) -> Option<(u32, usize)>;

    /// Width of the character count indicator
    fn cci_bits(&self, version: u8, mode: Mode) -> usize;

    /// Width of the all-zero terminator
    fn terminator_bits(&self, version: u8) -> usize;

    /// Versions with the same band share header widths, and hence segmentation
    fn header_band(&self, version: u8) -> u8;

    /// FNC1 in first position indicator, `None` if GS1 data is not supported
    fn fnc1_first(&self) -> Option<(u32, usize)>;

    /// ECI mode indicator, `None` if ECI is not supported
    fn eci_indicator(&self) -> Option<(u32, usize)>;

    /// Structured Append mode indicator, `None` if not supported
    fn structured_append_indicator(&self) -> Option<(u32, usize)>;

    /// Centre coordinates of alignment patterns (rows for QR, columns for rMQR)
    fn alignment_centres(&self, version: u8) -> &'static [u8];

    /// Human readable version name, e.g. `1-M`, `M3-L`, `R11x43-H`
    fn version_name(&self, version: u8, ecc: EccLevel) -> String;
}


//  ************************************************************
impl Variant {
    //  ************************************************************
    /// Rules for the variant; UPNQR is a QR Code profile and shares its tables
    pub fn rules(self) -> &'static dyn VariantRules {
        match self {
            Variant::Qr | Variant::Upnqr => &QrRules,
            Variant::MicroQr => &MicroRules,
            Variant::Rmqr => &RmqrRules,
        }
    }

    //  ************************************************************
    pub fn quiet_zone(self) -> usize {
        match self {
            Variant::Qr | Variant::Upnqr => QUIET_ZONE,
            Variant::MicroQr | Variant::Rmqr => QUIET_ZONE_MICRO,
        }
    }
}


/* ============================================================
 * QR Code
 * ============================================================
 */

//  ************************************************************
/// QR Code model 2, versions 1 to 40
//  ************************************************************

pub struct QrRules;

//  ************************************************************
/// Error correction blocks per version, for ECC levels L, M, Q, H
///
/// Each entry is (ec codewords per block, blocks in group 1, data codewords per block in group 1,
/// blocks in group 2, data codewords per block in group 2).
/// Group 2 blocks always carry one data codeword more than group 1 blocks.
//  ************************************************************

#[rustfmt::skip]
const QR_BLOCKS: [[(u8, u8, u8, u8, u8); 4]; 40] = [
    [(7, 1, 19, 0, 0), (10, 1, 16, 0, 0), (13, 1, 13, 0, 0), (17, 1, 9, 0, 0)], // 1
    [(10, 1, 34, 0, 0), (16, 1, 28, 0, 0), (22, 1, 22, 0, 0), (28, 1, 16, 0, 0)], // 2
    [(15, 1, 55, 0, 0), (26, 1, 44, 0, 0), (18, 2, 17, 0, 0), (22, 2, 13, 0, 0)], // 3
    [(20, 1, 80, 0, 0), (18, 2, 32, 0, 0), (26, 2, 24, 0, 0), (16, 4, 9, 0, 0)], // 4
    [(26, 1, 108, 0, 0), (24, 2, 43, 0, 0), (18, 2, 15, 2, 16), (22, 2, 11, 2, 12)], // 5
    [(18, 2, 68, 0, 0), (16, 4, 27, 0, 0), (24, 4, 19, 0, 0), (28, 4, 15, 0, 0)], // 6
    [(20, 2, 78, 0, 0), (18, 4, 31, 0, 0), (18, 2, 14, 4, 15), (26, 4, 13, 1, 14)], // 7
    [(24, 2, 97, 0, 0), (22, 2, 38, 2, 39), (22, 4, 18, 2, 19), (26, 4, 14, 2, 15)], // 8
    [(30, 2, 116, 0, 0), (22, 3, 36, 2, 37), (20, 4, 16, 4, 17), (24, 4, 12, 4, 13)], // 9
    [(18, 2, 68, 2, 69), (26, 4, 43, 1, 44), (24, 6, 19, 2, 20), (28, 6, 15, 2, 16)], // 10
    [(20, 4, 81, 0, 0), (30, 1, 50, 4, 51), (28, 4, 22, 4, 23), (24, 3, 12, 8, 13)], // 11
    [(24, 2, 92, 2, 93), (22, 6, 36, 2, 37), (26, 4, 20, 6, 21), (28, 7, 14, 4, 15)], // 12
    [(26, 4, 107, 0, 0), (22, 8, 37, 1, 38), (24, 8, 20, 4, 21), (22, 12, 11, 4, 12)], // 13
    [(30, 3, 115, 1, 116), (24, 4, 40, 5, 41), (20, 11, 16, 5, 17), (24, 11, 12, 5, 13)], // 14
    [(22, 5, 87, 1, 88), (24, 5, 41, 5, 42), (30, 5, 24, 7, 25), (24, 11, 12, 7, 13)], // 15
    [(24, 5, 98, 1, 99), (28, 7, 45, 3, 46), (24, 15, 19, 2, 20), (30, 3, 15, 13, 16)], // 16
    [(28, 1, 107, 5, 108), (28, 10, 46, 1, 47), (28, 1, 22, 15, 23), (28, 2, 14, 17, 15)], // 17
    [(30, 5, 120, 1, 121), (26, 9, 43, 4, 44), (28, 17, 22, 1, 23), (28, 2, 14, 19, 15)], // 18
    [(28, 3, 113, 4, 114), (26, 3, 44, 11, 45), (26, 17, 21, 4, 22), (26, 9, 13, 16, 14)], // 19
    [(28, 3, 107, 5, 108), (26, 3, 41, 13, 42), (30, 15, 24, 5, 25), (28, 15, 15, 10, 16)], // 20
    [(28, 4, 116, 4, 117), (26, 17, 42, 0, 0), (28, 17, 22, 6, 23), (30, 19, 16, 6, 17)], // 21
    [(28, 2, 111, 7, 112), (28, 17, 46, 0, 0), (30, 7, 24, 16, 25), (24, 34, 13, 0, 0)], // 22
    [(30, 4, 121, 5, 122), (28, 4, 47, 14, 48), (30, 11, 24, 14, 25), (30, 16, 15, 14, 16)], // 23
    [(30, 6, 117, 4, 118), (28, 6, 45, 14, 46), (30, 11, 24, 16, 25), (30, 30, 16, 2, 17)], // 24
    [(26, 8, 106, 4, 107), (28, 8, 47, 13, 48), (30, 7, 24, 22, 25), (30, 22, 15, 13, 16)], // 25
    [(28, 10, 114, 2, 115), (28, 19, 46, 4, 47), (28, 28, 22, 6, 23), (30, 33, 16, 4, 17)], // 26
    [(30, 8, 122, 4, 123), (28, 22, 45, 3, 46), (30, 8, 23, 26, 24), (30, 12, 15, 28, 16)], // 27
    [(30, 3, 117, 10, 118), (28, 3, 45, 23, 46), (30, 4, 24, 31, 25), (30, 11, 15, 31, 16)], // 28
    [(30, 7, 116, 7, 117), (28, 21, 45, 7, 46), (30, 1, 23, 37, 24), (30, 19, 15, 26, 16)], // 29
    [(30, 5, 115, 10, 116), (28, 19, 47, 10, 48), (30, 15, 24, 25, 25), (30, 23, 15, 25, 16)], // 30
    [(30, 13, 115, 3, 116), (28, 2, 46, 29, 47), (30, 42, 24, 1, 25), (30, 23, 15, 28, 16)], // 31
    [(30, 17, 115, 0, 0), (28, 10, 46, 23, 47), (30, 10, 24, 35, 25), (30, 19, 15, 35, 16)], // 32
    [(30, 17, 115, 1, 116), (28, 14, 46, 21, 47), (30, 29, 24, 19, 25), (30, 11, 15, 46, 16)], // 33
    [(30, 13, 115, 6, 116), (28, 14, 46, 23, 47), (30, 44, 24, 7, 25), (30, 59, 16, 1, 17)], // 34
    [(30, 12, 121, 7, 122), (28, 12, 47, 26, 48), (30, 39, 24, 14, 25), (30, 22, 15, 41, 16)], // 35
    [(30, 6, 121, 14, 122), (28, 6, 47, 34, 48), (30, 46, 24, 10, 25), (30, 2, 15, 64, 16)], // 36
    [(30, 17, 122, 4, 123), (28, 29, 46, 14, 47), (30, 49, 24, 10, 25), (30, 24, 15, 46, 16)], // 37
    [(30, 4, 122, 18, 123), (28, 13, 46, 32, 47), (30, 48, 24, 14, 25), (30, 42, 15, 32, 16)], // 38
    [(30, 20, 117, 4, 118), (28, 40, 47, 7, 48), (30, 43, 24, 22, 25), (30, 10, 15, 67, 16)], // 39
    [(30, 19, 118, 6, 119), (28, 18, 47, 31, 48), (30, 34, 24, 34, 25), (30, 20, 15, 61, 16)], // 40
];


//  ************************************************************
/// Row/column coordinates of alignment pattern centres per version
//  ************************************************************

#[rustfmt::skip]
const QR_ALIGNMENT: [&[u8]; 40] = [
    &[],
    &[6, 18],
    &[6, 22],
    &[6, 26],
    &[6, 30],
    &[6, 34],
    &[6, 22, 38],
    &[6, 24, 42],
    &[6, 26, 46],
    &[6, 28, 50],
    &[6, 30, 54],
    &[6, 32, 58],
    &[6, 34, 62],
    &[6, 26, 46, 66],
    &[6, 26, 48, 70],
    &[6, 26, 50, 74],
    &[6, 30, 54, 78],
    &[6, 30, 56, 82],
    &[6, 30, 58, 86],
    &[6, 34, 62, 90],
    &[6, 28, 50, 72, 94],
    &[6, 26, 50, 74, 98],
    &[6, 30, 54, 78, 102],
    &[6, 28, 54, 80, 106],
    &[6, 32, 58, 84, 110],
    &[6, 30, 58, 86, 114],
    &[6, 34, 62, 90, 118],
    &[6, 26, 50, 74, 98, 122],
    &[6, 30, 54, 78, 102, 126],
    &[6, 26, 52, 78, 104, 130],
    &[6, 30, 56, 82, 108, 134],
    &[6, 34, 60, 86, 112, 138],
    &[6, 30, 58, 86, 114, 142],
    &[6, 34, 62, 90, 118, 146],
    &[6, 30, 54, 78, 102, 126, 150],
    &[6, 24, 50, 76, 102, 128, 154],
    &[6, 28, 54, 80, 106, 132, 158],
    &[6, 32, 58, 84, 110, 136, 162],
    &[6, 26, 54, 82, 110, 138, 166],
    &[6, 30, 58, 86, 114, 142, 170],
];

const ECC_ALL: [EccLevel; 4] = [EccLevel::L, EccLevel::M, EccLevel::Q, EccLevel::H];

//  ************************************************************
impl VariantRules for QrRules {
    fn versions(&self) -> RangeInclusive<u8> {
        1..=QR_VERSION_MAX
    }

    fn ecc_levels(&self, _version: u8) -> &'static [EccLevel] {
        &ECC_ALL
    }

    fn plan(&self, version: u8, ecc: EccLevel) -> Option<SymbolPlan> {
        if !self.versions().contains(&version) {
            return None;
        }
        let (ec, n1, k1, n2, k2) = QR_BLOCKS[(version - 1) as usize][ecc.index()];
        let groups = [(n1 as usize, k1 as usize), (n2 as usize, k2 as usize)];
        Some(SymbolPlan::from_groups(Variant::Qr, version, ecc, ec as usize, &groups))
    }

    fn dimensions(&self, version: u8) -> (usize, usize) {
        let n = 17 + 4 * version as usize;
        (n, n)
    }

    fn mode_indicator(&self, _version: u8, mode: Mode) -> Option<(u32, usize)> {
        let value = match mode {
            Mode::Numeric => 0b0001,
            Mode::Alphanumeric => 0b0010,
            Mode::Byte => 0b0100,
            Mode::Kanji => 0b1000,
        };
        Some((value, 4))
    }

    fn cci_bits(&self, version: u8, mode: Mode) -> usize {
        #[rustfmt::skip]
        const CCI: [[usize; 4]; 3] = [
            // N   A   B   K
            [10,  9,  8,  8],
            [12, 11, 16, 10],
            [14, 13, 16, 12],
        ];
        CCI[self.header_band(version) as usize][mode.index()]
    }

    fn terminator_bits(&self, _version: u8) -> usize {
        4
    }

    fn header_band(&self, version: u8) -> u8 {
        match version {
            0..=9 => 0,
            10..=26 => 1,
            _ => 2,
        }
    }

    fn fnc1_first(&self) -> Option<(u32, usize)> {
        Some((0b0101, 4))
    }

    fn eci_indicator(&self) -> Option<(u32, usize)> {
        Some((0b0111, 4))
    }

    fn structured_append_indicator(&self) -> Option<(u32, usize)> {
        Some((0b0011, 4))
    }

    fn alignment_centres(&self, version: u8) -> &'static [u8] {
        QR_ALIGNMENT[(version - 1) as usize]
    }

    fn version_name(&self, version: u8, ecc: EccLevel) -> String {
        format!("{}-{:?}", version, ecc)
    }
}


/* ============================================================
 * Micro QR Code
 * ============================================================
 */

//  ************************************************************
/// Micro QR Code, versions M1 to M4 (numbered 1 to 4)
//  ************************************************************

pub struct MicroRules;

//  ************************************************************
/// Data capacity in bits and error correction codewords, for ECC levels L, M, Q
//  ************************************************************

#[rustfmt::skip]
const MICRO_CAPACITY: [[(u16, u8); 3]; 4] = [
    [( 20,  2), (  0,  0), ( 0,  0)], // M1
    [( 40,  5), ( 32,  6), ( 0,  0)], // M2
    [( 84,  6), ( 68,  8), ( 0,  0)], // M3
    [(128,  8), (112, 10), (80, 14)], // M4
];

const MICRO_ECC: [&[EccLevel]; 4] = [
    &[EccLevel::L],
    &[EccLevel::L, EccLevel::M],
    &[EccLevel::L, EccLevel::M],
    &[EccLevel::L, EccLevel::M, EccLevel::Q],
];

//  ************************************************************
impl VariantRules for MicroRules {
    fn versions(&self) -> RangeInclusive<u8> {
        1..=MICRO_VERSION_MAX
    }

    fn ecc_levels(&self, version: u8) -> &'static [EccLevel] {
        match version {
            1..=4 => MICRO_ECC[(version - 1) as usize],
            _ => &[],
        }
    }

    fn plan(&self, version: u8, ecc: EccLevel) -> Option<SymbolPlan> {
        if !self.ecc_levels(version).contains(&ecc) {
            return None;
        }
        let (bits, ec) = MICRO_CAPACITY[(version - 1) as usize][ecc.index()];
        let data_bits = bits as usize;
        let data_codewords = (data_bits + 7) / 8;
        let block = EcBlock { data_codewords, ec_codewords: ec as usize };
        Some(SymbolPlan {
            variant: Variant::MicroQr,
            version,
            ecc,
            data_bits,
            data_codewords,
            total_codewords: data_codewords + ec as usize,
            ec_block_layout: vec![block],
        })
    }

    fn dimensions(&self, version: u8) -> (usize, usize) {
        let n = 9 + 2 * version as usize;
        (n, n)
    }

    fn mode_indicator(&self, version: u8, mode: Mode) -> Option<(u32, usize)> {
        // M1: numeric only, M2: numeric and alphanumeric, M3/M4: all four
        let value = match (version, mode) {
            (_, Mode::Numeric) => 0,
            (2..=4, Mode::Alphanumeric) => 1,
            (3..=4, Mode::Byte) => 2,
            (3..=4, Mode::Kanji) => 3,
            _ => return None,
        };
        Some((value, (version - 1) as usize))
    }

    fn cci_bits(&self, version: u8, mode: Mode) -> usize {
        #[rustfmt::skip]
        const CCI: [[usize; 4]; 4] = [
            // N  A  B  K
            [3, 0, 0, 0], // M1
            [4, 3, 0, 0], // M2
            [5, 4, 4, 3], // M3
            [6, 5, 5, 4], // M4
        ];
        CCI[(version - 1) as usize][mode.index()]
    }

    fn terminator_bits(&self, version: u8) -> usize {
        3 + 2 * (version as usize - 1)
    }

    fn header_band(&self, version: u8) -> u8 {
        version
    }

    fn fnc1_first(&self) -> Option<(u32, usize)> {
        None
    }

    fn eci_indicator(&self) -> Option<(u32, usize)> {
        None
    }

    fn structured_append_indicator(&self) -> Option<(u32, usize)> {
        None
    }

    fn alignment_centres(&self, _version: u8) -> &'static [u8] {
        &[]
    }

    fn version_name(&self, version: u8, ecc: EccLevel) -> String {
        format!("M{}-{:?}", version, ecc)
    }
}


/* ============================================================
 * Rectangular Micro QR Code (rMQR)
 * ============================================================
 */

//  ************************************************************
/// rMQR, versions R7x43 to R17x139 (numbered 1 to 32)
//  ************************************************************

pub struct RmqrRules;

#[rustfmt::skip]
const RMQR_HEIGHT: [u8; 32] = [
    7, 7, 7, 7, 7,
    9, 9, 9, 9, 9,
    11, 11, 11, 11, 11, 11,
    13, 13, 13, 13, 13, 13,
    15, 15, 15, 15, 15,
    17, 17, 17, 17, 17,
];

#[rustfmt::skip]
const RMQR_WIDTH: [u8; 32] = [
    43, 59, 77, 99, 139,
    43, 59, 77, 99, 139,
    27, 43, 59, 77, 99, 139,
    27, 43, 59, 77, 99, 139,
    43, 59, 77, 99, 139,
    43, 59, 77, 99, 139,
];

#[rustfmt::skip]
const RMQR_TOTAL_CODEWORDS: [u16; 32] = [
    13, 21, 32, 44, 68,
    21, 33, 49, 66, 99,
    15, 31, 47, 67, 89, 132,
    21, 41, 60, 85, 113, 166,
    51, 74, 103, 136, 199,
    61, 88, 122, 160, 232,
];

/// Data codewords and number of blocks, for ECC levels M and H
#[rustfmt::skip]
const RMQR_DATA: [[(u8, u8); 2]; 32] = [
    [(6, 1), (3, 1)], [(12, 1), (7, 1)], [(20, 1), (10, 1)], [(28, 1), (14, 1)], [(44, 1), (24, 2)],
    [(12, 1), (7, 1)], [(21, 1), (11, 1)], [(31, 1), (17, 2)], [(42, 1), (22, 2)], [(63, 2), (33, 3)],
    [(7, 1), (5, 1)], [(19, 1), (11, 1)], [(31, 1), (15, 2)], [(43, 1), (23, 2)], [(57, 2), (29, 2)], [(84, 2), (42, 3)],
    [(12, 1), (7, 1)], [(27, 1), (13, 1)], [(38, 1), (20, 2)], [(53, 2), (29, 2)], [(73, 2), (35, 3)], [(106, 3), (54, 4)],
    [(33, 1), (15, 2)], [(48, 1), (26, 2)], [(67, 2), (31, 3)], [(88, 2), (48, 4)], [(127, 3), (69, 5)],
    [(39, 1), (21, 2)], [(56, 2), (28, 2)], [(78, 2), (38, 3)], [(100, 3), (56, 4)], [(152, 4), (76, 6)],
];

/// Character count indicator widths for Numeric, Alphanumeric, Byte, Kanji
#[rustfmt::skip]
const RMQR_CCI: [[u8; 4]; 32] = [
    [4, 3, 3, 2], [5, 5, 4, 3], [6, 5, 5, 4], [7, 6, 5, 5], [7, 6, 6, 5],
    [5, 5, 4, 3], [6, 5, 5, 4], [7, 6, 5, 5], [7, 6, 6, 5], [8, 7, 6, 6],
    [4, 4, 3, 2], [6, 5, 5, 4], [7, 6, 5, 5], [7, 6, 6, 5], [8, 7, 6, 6], [8, 7, 7, 6],
    [5, 5, 4, 3], [6, 6, 5, 5], [7, 6, 6, 5], [7, 7, 6, 6], [8, 7, 7, 6], [8, 8, 7, 7],
    [7, 6, 6, 5], [7, 7, 6, 5], [8, 7, 7, 6], [8, 7, 7, 6], [9, 8, 7, 7],
    [7, 6, 6, 5], [8, 7, 6, 6], [8, 7, 7, 6], [8, 8, 7, 6], [9, 8, 8, 7],
];

/// Alignment pattern column centres per symbol width (none for width 27)
fn rmqr_alignment_columns(width: u8) -> &'static [u8] {
    match width {
        43 => &[21],
        59 => &[19, 39],
        77 => &[25, 51],
        99 => &[23, 49, 75],
        139 => &[27, 55, 83, 111],
        _ => &[],
    }
}

const RMQR_ECC: [EccLevel; 2] = [EccLevel::M, EccLevel::H];

//  ************************************************************
impl RmqrRules {
    //  ************************************************************
    /// Versions of the given height (7, 9, ..., 17), narrowest first
    pub fn versions_of_height(height: usize) -> Vec<u8> {
        (1..=RMQR_VERSION_MAX).filter(|&v| RMQR_HEIGHT[(v - 1) as usize] as usize == height).collect()
    }

    //  ************************************************************
    /// All versions, smallest area first (ties keep version order)
    pub fn versions_by_area() -> Vec<u8> {
        let mut v: Vec<u8> = (1..=RMQR_VERSION_MAX).collect();
        v.sort_by_key(|&v| RMQR_HEIGHT[(v - 1) as usize] as usize * RMQR_WIDTH[(v - 1) as usize] as usize);
        v
    }
}

//  ************************************************************
impl VariantRules for RmqrRules {
    fn versions(&self) -> RangeInclusive<u8> {
        1..=RMQR_VERSION_MAX
    }

    fn ecc_levels(&self, _version: u8) -> &'static [EccLevel] {
        &RMQR_ECC
    }

    fn plan(&self, version: u8, ecc: EccLevel) -> Option<SymbolPlan> {
        if !self.versions().contains(&version) {
            return None;
        }
        let i = (version - 1) as usize;
        let (data, blocks) = match ecc {
            EccLevel::M => RMQR_DATA[i][0],
            EccLevel::H => RMQR_DATA[i][1],
            _ => return None,
        };
        let (data, blocks) = (data as usize, blocks as usize);
        let total = RMQR_TOTAL_CODEWORDS[i] as usize;
        let ec = (total - data) / blocks;
        let short = data / blocks;
        let n_long = data % blocks;
        let groups = [(blocks - n_long, short), (n_long, short + 1)];
        Some(SymbolPlan::from_groups(Variant::Rmqr, version, ecc, ec, &groups))
    }

    fn dimensions(&self, version: u8) -> (usize, usize) {
        let i = (version - 1) as usize;
        (RMQR_HEIGHT[i] as usize, RMQR_WIDTH[i] as usize)
    }

    fn mode_indicator(&self, _version: u8, mode: Mode) -> Option<(u32, usize)> {
        let value = match mode {
            Mode::Numeric => 0b001,
            Mode::Alphanumeric => 0b010,
            Mode::Byte => 0b011,
            Mode::Kanji => 0b100,
        };
        Some((value, 3))
    }

    fn cci_bits(&self, version: u8, mode: Mode) -> usize {
        RMQR_CCI[(version - 1) as usize][mode.index()] as usize
    }

    fn terminator_bits(&self, _version: u8) -> usize {
        3
    }

    fn header_band(&self, version: u8) -> u8 {
        version
    }

    fn fnc1_first(&self) -> Option<(u32, usize)> {
        Some((0b101, 3))
    }

    fn eci_indicator(&self) -> Option<(u32, usize)> {
        None
    }

    fn structured_append_indicator(&self) -> Option<(u32, usize)> {
        None
    }

    fn alignment_centres(&self, version: u8) -> &'static [u8] {
        rmqr_alignment_columns(RMQR_WIDTH[(version - 1) as usize])
    }

    fn version_name(&self, version: u8, ecc: EccLevel) -> String {
        let (rows, width) = self.dimensions(version);
        format!("R{}x{}-{:?}", rows, width, ecc)
    }
}


//  ************************************************************

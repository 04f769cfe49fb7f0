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
//! Character sets: Extended Channel Interpretation (ECI) and Shift-JIS
//  ************************************************************
//!
//! Input is turned into a sequence of *units* before segmentation.
//! A unit up to 0xFF is one byte; a larger unit is a double byte Shift-JIS
//! value (first byte in the high half), which may go into Kanji mode.
//!
//! The character tables themselves sit behind [`CharsetLookup`].
//! [`BuiltinCharsets`] only knows the few sets the encoder needs on its own.

use crate::error::{Error, Result, Warning};
use crate::gs1;
use crate::tables::{UPNQR_ECI, VariantRules};
use crate::{InputMode, Options, Variant};


pub const ECI_ISO_8859_1: u32 = 3;
pub const ECI_ISO_8859_2: u32 = 4;
pub const ECI_UTF_8: u32 = 26;
pub const ECI_BINARY: u32 = 899;
pub const ECI_MAX: u32 = 999_999;


//  ************************************************************
/// Character set lookup, supplied by the caller for the sets it cares about
//  ************************************************************

pub trait CharsetLookup: Sync {
    /// Bytes of `c` in the character set designated by `eci`, `None` if not representable
    fn char_to_eci_bytes(&self, c: char, eci: u32) -> Option<Vec<u8>>;

    /// Shift-JIS value of `c` (one or two bytes), `None` if not representable
    fn char_to_sjis(&self, c: char) -> Option<u16>;
}


//  ************************************************************
/// ISO-8859-2 code points for bytes 0xA0..=0xFF
//  ************************************************************

#[rustfmt::skip]
const ISO_8859_2_HIGH: [u16; 96] = [
    0x00A0, 0x0104, 0x02D8, 0x0141, 0x00A4, 0x013D, 0x015A, 0x00A7, 0x00A8, 0x0160, 0x015E, 0x0164, 0x0179, 0x00AD, 0x017D, 0x017B,
    0x00B0, 0x0105, 0x02DB, 0x0142, 0x00B4, 0x013E, 0x015B, 0x02C7, 0x00B8, 0x0161, 0x015F, 0x0165, 0x017A, 0x02DD, 0x017E, 0x017C,
    0x0154, 0x00C1, 0x00C2, 0x0102, 0x00C4, 0x0139, 0x0106, 0x00C7, 0x010C, 0x00C9, 0x0118, 0x00CB, 0x011A, 0x00CD, 0x00CE, 0x010E,
    0x0110, 0x0143, 0x0147, 0x00D3, 0x00D4, 0x0150, 0x00D6, 0x00D7, 0x0158, 0x016E, 0x00DA, 0x0170, 0x00DC, 0x00DD, 0x0162, 0x00DF,
    0x0155, 0x00E1, 0x00E2, 0x0103, 0x00E4, 0x013A, 0x0107, 0x00E7, 0x010D, 0x00E9, 0x0119, 0x00EB, 0x011B, 0x00ED, 0x00EE, 0x010F,
    0x0111, 0x0144, 0x0148, 0x00F3, 0x00F4, 0x0151, 0x00F6, 0x00F7, 0x0159, 0x016F, 0x00FA, 0x0171, 0x00FC, 0x00FD, 0x0163, 0x02D9,
];


//  ************************************************************
/// Character sets that need no external table
//  ************************************************************
///
/// * ECI 3 (ISO-8859-1), ECI 4 (ISO-8859-2), ECI 26 (UTF-8), ECI 899 (8 bit binary)
/// * Shift-JIS single byte part (JIS X 0201: ASCII with Yen sign and overline, half width katakana)
///
/// Double byte Shift-JIS (Kanji) needs a real table and hence a custom [`CharsetLookup`].

#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinCharsets;

impl CharsetLookup for BuiltinCharsets {
    fn char_to_eci_bytes(&self, c: char, eci: u32) -> Option<Vec<u8>> {
        let u = c as u32;
        match eci {
            ECI_ISO_8859_1 | ECI_BINARY if u <= 0xFF => Some(vec![u as u8]),
            ECI_ISO_8859_2 if u < 0xA0 => Some(vec![u as u8]),
            ECI_ISO_8859_2 => ISO_8859_2_HIGH.iter().position(|&p| p as u32 == u).map(|i| vec![0xA0 + i as u8]),
            ECI_UTF_8 => {
                let mut buf = [0u8; 4];
                Some(c.encode_utf8(&mut buf).as_bytes().to_vec())
            }
            _ => None,
        }
    }

    fn char_to_sjis(&self, c: char) -> Option<u16> {
        match c as u32 {
            0x5C | 0x7E => None,
            u @ 0x00..=0x7F => Some(u as u16),
            0xA5 => Some(0x5C),
            0x203E => Some(0x7E),
            u @ 0xFF61..=0xFF9F => Some((u - 0xFF61 + 0xA1) as u16),
            _ => None,
        }
    }
}


//  ************************************************************
/// Double byte Shift-JIS values that may be encoded in Kanji mode
//  ************************************************************
///
/// The standard allows 0x8140..=0x9FFC and 0xE040..=0xEBBF.
/// Which trailing bytes inside these ranges count as valid has varied between encoders,
/// so both the ranges and the trailing byte rules are data, not code.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KanjiRules {
    pub ranges: Vec<(u16, u16)>,
    pub trail_min: u8,
    pub trail_max: u8,
    pub excluded_trail_bytes: Vec<u8>,
}

impl Default for KanjiRules {
    fn default() -> Self {
        KanjiRules {
            ranges: vec![(0x8140, 0x9FFC), (0xE040, 0xEBBF)],
            trail_min: 0x40,
            trail_max: 0xFC,
            excluded_trail_bytes: vec![0x7F],
        }
    }
}

impl KanjiRules {
    //  ************************************************************
    /// True if the double byte value `unit` may go into Kanji mode
    pub fn is_kanji(&self, unit: u32) -> bool {
        if unit > 0xFFFF {
            return false;
        }
        let trail = (unit & 0xFF) as u8;
        self.ranges.iter().any(|&(lo, hi)| unit >= lo as u32 && unit <= hi as u32)
            && trail >= self.trail_min
            && trail <= self.trail_max
            && !self.excluded_trail_bytes.contains(&trail)
    }

    //  ************************************************************
    /// Join byte pairs that form Kanji characters into double byte units
    pub fn join_pairs(&self, bytes: &[u8]) -> Vec<u32> {
        let mut units = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            if i + 1 < bytes.len() {
                let pair = ((bytes[i] as u32) << 8) | bytes[i + 1] as u32;
                if self.is_kanji(pair) {
                    units.push(pair);
                    i += 2;
                    continue;
                }
            }
            units.push(bytes[i] as u32);
            i += 1;
        }
        units
    }
}


//  ************************************************************
/// Input after character set conversion, ready for segmentation
//  ************************************************************

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedInput {
    pub units: Vec<u32>,
    pub eci: Option<u32>,
    pub gs1: bool,
    pub warnings: Vec<Warning>,
}


//  ************************************************************
/// Convert raw input to units according to the input mode, ECI and variant
//  ************************************************************

pub fn prepare_input(input: &[u8], options: &Options, lookup: &dyn CharsetLookup) -> Result<PreparedInput> {
    let rules = options.variant.rules();
    if options.variant == Variant::Upnqr {
        return prepare_upnqr(input, options, lookup);
    }
    match options.input_mode {
        InputMode::Gs1 { parenthesized } => {
            let elements = gs1::parse(input, parenthesized)?;
            let mut warnings = Vec::new();
            if options.eci.is_some() {
                warn!("prepare_input: ECI {:?} used with GS1 data", options.eci);
                warnings.push(Warning::UsesEci);
            }
            Ok(PreparedInput { units: gs1::to_units(&elements), eci: options.eci, gs1: true, warnings })
        }
        InputMode::Data => {
            let units = if options.full_multibyte {
                options.kanji.join_pairs(input)
            } else {
                input.iter().map(|&b| b as u32).collect()
            };
            Ok(PreparedInput { units, eci: options.eci, gs1: false, warnings: Vec::new() })
        }
        InputMode::Unicode => {
            let text = std::str::from_utf8(input).map_err(|e| Error::InvalidCharacter(format!("invalid UTF-8 ({})", e)))?;
            match options.eci {
                Some(eci) => {
                    let bytes = to_eci_bytes(text, eci, lookup)?;
                    let units = if options.full_multibyte {
                        options.kanji.join_pairs(&bytes)
                    } else {
                        bytes.iter().map(|&b| b as u32).collect()
                    };
                    Ok(PreparedInput { units, eci: Some(eci), gs1: false, warnings: Vec::new() })
                }
                None => prepare_unicode_auto(text, rules, lookup),
            }
        }
    }
}


//  ************************************************************
/// Try the default character sets in turn; fall back on UTF-8 with a warning
//  ************************************************************

fn prepare_unicode_auto(text: &str, rules: &dyn VariantRules, lookup: &dyn CharsetLookup) -> Result<PreparedInput> {
    if text.chars().all(|c| (c as u32) <= 0xFF) {
        let units = text.chars().map(|c| c as u32).collect();
        return Ok(PreparedInput { units, eci: None, gs1: false, warnings: Vec::new() });
    }
    let sjis: Option<Vec<u32>> = text.chars().map(|c| lookup.char_to_sjis(c).map(|v| v as u32)).collect();
    if let Some(units) = sjis {
        debug!("prepare_unicode_auto: converted to Shift-JIS");
        return Ok(PreparedInput { units, eci: None, gs1: false, warnings: Vec::new() });
    }
    if rules.eci_indicator().is_none() {
        let c = text.chars().find(|&c| lookup.char_to_sjis(c).is_none() && (c as u32) > 0xFF).unwrap_or('?');
        return Err(Error::InvalidCharacter(format!("character U+{:04X} not in ISO-8859-1 or Shift-JIS", c as u32)));
    }
    warn!("prepare_unicode_auto: no ECI specified, using ECI {}", ECI_UTF_8);
    let units = text.bytes().map(|b| b as u32).collect();
    Ok(PreparedInput {
        units,
        eci: Some(ECI_UTF_8),
        gs1: false,
        warnings: vec![Warning::NonCompliant { eci: ECI_UTF_8 }],
    })
}


//  ************************************************************
/// UPNQR: always ISO-8859-2, always Byte mode
//  ************************************************************

fn prepare_upnqr(input: &[u8], options: &Options, lookup: &dyn CharsetLookup) -> Result<PreparedInput> {
    let units = match options.input_mode {
        InputMode::Gs1 { .. } => return Err(Error::InvalidOption("UPNQR does not support GS1 data".to_string())),
        InputMode::Data => input.iter().map(|&b| b as u32).collect(),
        InputMode::Unicode => {
            let text = std::str::from_utf8(input)
                .map_err(|_| Error::InvalidCharacter("Invalid characters in input data".to_string()))?;
            to_eci_bytes(text, UPNQR_ECI, lookup)
                .map_err(|_| Error::InvalidCharacter("Invalid characters in input data".to_string()))?
                .iter()
                .map(|&b| b as u32)
                .collect()
        }
    };
    Ok(PreparedInput { units, eci: Some(UPNQR_ECI), gs1: false, warnings: Vec::new() })
}


//  ************************************************************
/// Convert every character of `text` through the `eci` character set
//  ************************************************************

pub fn to_eci_bytes(text: &str, eci: u32, lookup: &dyn CharsetLookup) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(text.len());
    for c in text.chars() {
        match lookup.char_to_eci_bytes(c, eci) {
            Some(b) => bytes.extend_from_slice(&b),
            None => {
                return Err(Error::InvalidCharacter(format!("character U+{:04X} not representable in ECI {}", c as u32, eci)))
            }
        }
    }
    Ok(bytes)
}


//  ************************************************************

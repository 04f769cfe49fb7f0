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
//! Encode data to a symbol of the QR Code family
//  ************************************************************

use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::bitstream::data_codewords;
use crate::eci::{prepare_input, BuiltinCharsets, CharsetLookup, ECI_MAX};
use crate::error::{Error, Result, Warning};
use crate::mask::{candidates, select_mask, Matrix};
use crate::matrix::{codeword_bits, function_patterns, place_bits};
use crate::reedsolomon::add_error_correction;
use crate::select::select;
use crate::tables::{RMQR_AUTO_WIDTH_MAX, UPNQR_ECI, UPNQR_VERSION};
use crate::{EccLevel, InputMode, Options, Variant};


//  ************************************************************
/// A finished symbol
//  ************************************************************
///
/// `modules` holds `rows * width` values, row by row, `true` for dark.
/// The quiet zone is not included.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub variant: Variant,
    pub rows: usize,
    pub width: usize,
    pub version: u8,
    pub ecc: EccLevel,
    /// Mask number as written to the format information
    pub mask: u8,
    pub eci: Option<u32>,
    pub warnings: Vec<Warning>,
    pub modules: Vec<bool>,
}

impl Symbol {
    //  ************************************************************
    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        self.modules[row * self.width + col]
    }

    //  ************************************************************
    /// Version and ECC level, e.g. `"1-M"`, `"M3-L"` or `"R11x43-H"`
    pub fn version_name(&self) -> String {
        self.variant.rules().version_name(self.version, self.ecc)
    }
}

/// Two characters per module, no quiet zone
impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.width {
                f.write_str(if self.is_dark(row, col) { "##" } else { "  " })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}


//  ************************************************************
/// Encode `input` with the built-in character sets
//  ************************************************************

pub fn encode(input: &[u8], options: &Options) -> Result<Symbol> {
    encode_with(input, options, &BuiltinCharsets)
}


//  ************************************************************
/// Encode independent requests, in parallel when the `parallel` feature is on
//  ************************************************************

pub fn encode_batch(requests: &[(&[u8], Options)]) -> Vec<Result<Symbol>> {
    log!("encode_batch: {} requests", requests.len());
    #[cfg(feature = "parallel")]
    let iter = requests.par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = requests.iter();
    iter.map(|(input, options)| encode(input, options)).collect()
}


//  ************************************************************
/// Encode `input`, converting characters through `lookup`
//  ************************************************************

pub fn encode_with(input: &[u8], options: &Options, lookup: &dyn CharsetLookup) -> Result<Symbol> {
    log!("encode: begin encoding {:?} symbol", options.variant);
    debug!("encode: input.len={} options={:?}", input.len(), options);
    validate(options)?;
    let variant = options.variant;

    let prepared = prepare_input(input, options, lookup)?;
    let selection = select(options, &prepared)?;
    let plan = &selection.plan;
    debug!("encode: segments={:?}", selection.segments);

    let data = data_codewords(plan, &selection.segments, prepared.gs1, options.structured_append)?;
    let codewords = add_error_correction(&data, plan);
    insane!("encode: codewords={:X?}", codewords);

    let mut grid = function_patterns(variant, plan.version);
    let remainder = place_bits(&mut grid, variant, &codeword_bits(&codewords, plan));
    debug!("encode: {} placed, {} remainder bits", plan.name(), remainder);

    let forced = match variant {
        Variant::Rmqr => {
            if let Some(m) = options.mask {
                log!("encode: rMQR has a single mask, ignoring mask {}", m);
            }
            None
        }
        _ => options.mask,
    };
    let matrix = Matrix::new(&grid, variant, plan.version, plan.ecc);
    let mask = select_mask(&matrix, variant, forced);
    let (rows, width) = matrix.get_dim();

    log!("encode: done encoding {} mask={}", plan.name(), mask);
    Ok(Symbol {
        variant,
        rows,
        width,
        version: plan.version,
        ecc: plan.ecc,
        mask,
        eci: prepared.eci,
        warnings: prepared.warnings,
        modules: matrix.modules(mask),
    })
}


//  ************************************************************
/// Reject option combinations the variant cannot carry
//  ************************************************************

pub fn validate(options: &Options) -> Result<()> {
    let invalid = |msg: String| Err(Error::InvalidOption(msg));
    let variant = options.variant;
    let gs1 = match options.input_mode {
        InputMode::Gs1 { .. } => true,
        _ => false,
    };

    if let Some(eci) = options.eci {
        if eci > ECI_MAX {
            return invalid(format!("ECI '{}' out of range 0 to {}", eci, ECI_MAX));
        }
    }
    if let Some(sa) = options.structured_append {
        if variant != Variant::Qr {
            return invalid("Structured Append available for QR Code only".to_string());
        }
        if sa.count < 2 || sa.count > 16 {
            return invalid(format!("Structured Append count '{}' out of range 2 to 16", sa.count));
        }
        if sa.index < 1 || sa.index > sa.count {
            return invalid(format!("Structured Append index '{}' out of range 1 to count {}", sa.index, sa.count));
        }
        if sa.id > 255 {
            return invalid(format!("Structured Append ID '{}' out of range 0 to 255", sa.id));
        }
    }

    let max_mask = if variant == Variant::MicroQr { candidates(variant).len() as u8 - 1 } else { 7 };
    if let Some(mask) = options.mask {
        if mask > max_mask && variant != Variant::Rmqr {
            return invalid(format!("Mask '{}' out of range 0 to {}", mask, max_mask));
        }
    }

    let rules = variant.rules();
    match variant {
        Variant::Qr => {
            if let Some(v) = options.version {
                if !rules.versions().contains(&v) {
                    return invalid(format!("Version '{}' out of range 1 to 40", v));
                }
            }
        }
        Variant::MicroQr => {
            if let Some(v) = options.version {
                if !rules.versions().contains(&v) {
                    return invalid(format!("Version 'M{}' out of range M1 to M4", v));
                }
            }
            match (options.ecc, options.version) {
                (Some(EccLevel::H), _) => return invalid("Error correction level H not available".to_string()),
                (Some(EccLevel::M), Some(1)) | (Some(EccLevel::Q), Some(1)) => {
                    return invalid("Version M1 supports error correction level L only".to_string())
                }
                (Some(EccLevel::Q), Some(v)) if v != 4 => {
                    return invalid("Error correction level Q requires Version M4".to_string())
                }
                _ => {}
            }
            if options.eci.is_some() {
                return invalid("ECI not supported by Micro QR".to_string());
            }
            if gs1 {
                return invalid("GS1 not supported by Micro QR".to_string());
            }
        }
        Variant::Rmqr => {
            if let Some(v) = options.version {
                if v < 1 || v > RMQR_AUTO_WIDTH_MAX {
                    return invalid(format!("Version '{}' out of range 1 to {}", v, RMQR_AUTO_WIDTH_MAX));
                }
            }
            if let Some(ecc) = options.ecc {
                if !rules.ecc_levels(1).contains(&ecc) {
                    return invalid(format!("Error correction level {:?} not available for rMQR", ecc));
                }
            }
            if options.eci.is_some() {
                return invalid("ECI not supported by rMQR".to_string());
            }
        }
        Variant::Upnqr => {
            if gs1 {
                return invalid("UPNQR does not support GS1 data".to_string());
            }
            match options.version {
                Some(v) if v != UPNQR_VERSION => return invalid(format!("UPNQR requires version {}", UPNQR_VERSION)),
                _ => {}
            }
            match options.ecc {
                Some(e) if e != EccLevel::M => return invalid("UPNQR requires error correction level M".to_string()),
                _ => {}
            }
            match options.eci {
                Some(e) if e != UPNQR_ECI => return invalid(format!("UPNQR requires ECI {}", UPNQR_ECI)),
                _ => {}
            }
            if options.mask.is_some() {
                return invalid("UPNQR selects its own mask".to_string());
            }
        }
    }
    Ok(())
}


//  ************************************************************

#[cfg(test)]
mod tests {
    use super::*;

    fn option_error(options: Options) -> String {
        match encode(b"123", &options) {
            Err(Error::InvalidOption(msg)) => msg,
            other => panic!("EXPECTED InvalidOption: {:?}", other.map(|s| s.version_name())),
        }
    }

    #[test]
    fn test_encode_qr_1m() {
        let s = encode(b"01234567", &Options::new(Variant::Qr).with_ecc(EccLevel::M)).unwrap();
        assert_eq!((s.rows, s.width), (21, 21));
        assert_eq!(s.version_name(), "1-M");
        assert_eq!(s.modules.len(), 21 * 21);
        // finder corners and the dark module
        assert!(s.is_dark(0, 0) && s.is_dark(0, 20) && s.is_dark(20, 0));
        assert!(!s.is_dark(7, 7));
        assert!(s.is_dark(13, 8), "DARK MODULE MISSING");
    }

    #[test]
    fn test_encode_variants() {
        let s = encode(b"12345", &Options::new(Variant::MicroQr)).unwrap();
        assert_eq!((s.rows, s.width), (11, 11));
        assert_eq!(s.version_name(), "M1-L");
        assert!(s.mask < 4);
        let s = encode(b"HELLO", &Options::new(Variant::Rmqr)).unwrap();
        assert_eq!(s.rows, 11);
        assert_eq!(s.mask, 0);
        let s = encode("Plačilo".as_bytes(), &Options::new(Variant::Upnqr)).unwrap();
        assert_eq!((s.rows, s.width), (77, 77));
        assert_eq!(s.eci, Some(4));
    }

    #[test]
    fn test_forced_mask() {
        for mask in 0..8 {
            let s = encode(b"FORCED", &Options::new(Variant::Qr).with_mask(mask)).unwrap();
            assert_eq!(s.mask, mask);
        }
        let s = encode(b"FORCED", &Options::new(Variant::Rmqr).with_mask(3)).unwrap();
        assert_eq!(s.mask, 0, "rMQR MASK NOT IGNORED");
    }

    #[test]
    fn test_option_errors() {
        assert_eq!(option_error(Options::new(Variant::MicroQr).with_ecc(EccLevel::H)), "Error correction level H not available");
        assert_eq!(
            option_error(Options::new(Variant::MicroQr).with_version(1).with_ecc(EccLevel::M)),
            "Version M1 supports error correction level L only"
        );
        assert_eq!(
            option_error(Options::new(Variant::MicroQr).with_version(3).with_ecc(EccLevel::Q)),
            "Error correction level Q requires Version M4"
        );
        assert_eq!(
            option_error(Options::new(Variant::Qr).with_structured_append(1, 17, 0)),
            "Structured Append count '17' out of range 2 to 16"
        );
        assert_eq!(
            option_error(Options::new(Variant::Qr).with_structured_append(5, 4, 0)),
            "Structured Append index '5' out of range 1 to count 4"
        );
        assert_eq!(option_error(Options::new(Variant::Qr).with_version(41)), "Version '41' out of range 1 to 40");
        assert_eq!(option_error(Options::new(Variant::MicroQr).with_mask(4)), "Mask '4' out of range 0 to 3");
        assert_eq!(option_error(Options::new(Variant::Rmqr).with_eci(26)), "ECI not supported by rMQR");
        assert_eq!(option_error(Options::new(Variant::Upnqr).with_version(10)), "UPNQR requires version 15");
        let gs1 = Options::new(Variant::Upnqr).with_input_mode(InputMode::Gs1 { parenthesized: false });
        assert_eq!(option_error(gs1), "UPNQR does not support GS1 data");
    }

    #[test]
    fn test_display() {
        let s = encode(b"1", &Options::new(Variant::MicroQr)).unwrap();
        let text = s.to_string();
        assert_eq!(text.lines().count(), 11);
        assert!(text.lines().all(|l| l.len() == 22));
        assert!(text.starts_with("##############"), "FINDER ROW: {:?}", text.lines().next());
    }

    #[test]
    fn test_batch() {
        let requests: Vec<(&[u8], Options)> = vec![
            (&b"ONE"[..], Options::new(Variant::Qr)),
            (&b"2"[..], Options::new(Variant::MicroQr)),
            (&b""[..], Options::new(Variant::Qr).with_version(41)),
        ];
        let results = encode_batch(&requests);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().width, 21);
        assert_eq!(results[1].as_ref().unwrap().width, 11);
        assert!(results[2].is_err());
    }
}

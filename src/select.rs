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
//! Version and size selection
//  ************************************************************
//!
//! Candidates are tried smallest first. For each candidate the input is
//! segmented for that version's header widths, and the exact bit length
//! decides whether it fits:
//!
//! ```text
//! Candidate --> Evaluate --> Accept
//!    ^             |
//!    +-- Grow <----+--> (out of candidates) Fail
//! ```
//!
//! Versions sharing a header band share their segmentation, so the
//! dynamic programming runs once per band, not once per version.

use crate::bitstream::stream_bits;
use crate::eci::{KanjiRules, PreparedInput};
use crate::error::{Error, Result};
use crate::segment::{Segment, Segmenter};
use crate::tables::{RmqrRules, SymbolPlan, VariantRules, RMQR_AUTO_WIDTH_MIN, UPNQR_VERSION};
use crate::{EccLevel, Mode, Options, StructuredAppend, Variant};


//  ************************************************************
/// Outcome of selection: the symbol to build and what goes into it
//  ************************************************************

#[derive(Clone, Debug)]
pub struct Selection {
    pub plan: SymbolPlan,
    pub segments: Vec<Segment>,
    /// Bits before terminator and padding
    pub bits: usize,
}


//  ************************************************************
/// Versions to try, in order
//  ************************************************************

pub fn candidate_versions(variant: Variant, version: Option<u8>) -> Vec<u8> {
    match (variant, version) {
        (Variant::Upnqr, _) => vec![UPNQR_VERSION],
        (Variant::Rmqr, None) => RmqrRules::versions_by_area(),
        (Variant::Rmqr, Some(v)) if v >= RMQR_AUTO_WIDTH_MIN => {
            RmqrRules::versions_of_height(7 + 2 * (v - RMQR_AUTO_WIDTH_MIN) as usize)
        }
        (_, Some(v)) => vec![v],
        (_, None) => variant.rules().versions().collect(),
    }
}


//  ************************************************************
/// ECC level to start from when none is requested
//  ************************************************************

pub fn default_ecc(variant: Variant) -> EccLevel {
    match variant {
        Variant::Qr | Variant::MicroQr => EccLevel::L,
        Variant::Rmqr | Variant::Upnqr => EccLevel::M,
    }
}


enum State {
    Candidate(usize),
    Evaluate(usize, SymbolPlan),
    Grow(usize),
    Accept(Selection),
    Fail,
}


//  ************************************************************
/// Selection state machine
//  ************************************************************

struct Selector<'a> {
    rules: &'a dyn VariantRules,
    candidates: Vec<u8>,
    ecc: EccLevel,
    input: &'a PreparedInput,
    kanji: &'a KanjiRules,
    /// UPNQR carries everything in one Byte segment
    byte_only: bool,
    structured_append: Option<StructuredAppend>,
    /// Segmentation per header band, `None` if the input cannot be encoded there
    cache: Vec<(u8, Option<Vec<Segment>>)>,
    /// (required, maximum) codewords of the last candidate that was too small
    too_long: Option<(usize, usize)>,
}

impl<'a> Selector<'a> {
    //  ************************************************************
    fn segments(&mut self, version: u8) -> Option<Vec<Segment>> {
        if self.byte_only {
            let data = self.input.units.iter().map(|&u| u as u8).collect();
            return Some(vec![Segment { mode: Mode::Byte, eci: self.input.eci, data }]);
        }
        let band = self.rules.header_band(version);
        if let Some((_, segs)) = self.cache.iter().find(|(b, _)| *b == band) {
            return segs.clone();
        }
        let segs = Segmenter::new(self.rules, version, self.input.gs1, self.kanji).segment(&self.input.units, self.input.eci);
        self.cache.push((band, segs.clone()));
        segs
    }

    //  ************************************************************
    fn step(&mut self, state: State) -> State {
        match state {
            State::Candidate(i) => {
                if i >= self.candidates.len() {
                    return State::Fail;
                }
                match self.rules.plan(self.candidates[i], self.ecc) {
                    Some(plan) => State::Evaluate(i, plan),
                    None => State::Grow(i),
                }
            }
            State::Evaluate(i, plan) => {
                let segments = match self.segments(plan.version) {
                    Some(s) => s,
                    None => return State::Grow(i),
                };
                let bits = stream_bits(self.rules, plan.version, &segments, self.input.gs1, self.structured_append);
                trace!("select: {} bits={} capacity={}", plan.name(), bits, plan.data_bits);
                if bits <= plan.data_bits {
                    State::Accept(Selection { plan, segments, bits })
                } else {
                    self.too_long = Some(((bits + 7) / 8, plan.data_codewords));
                    State::Grow(i)
                }
            }
            State::Grow(i) => State::Candidate(i + 1),
            s => s,
        }
    }
}


//  ************************************************************
/// Choose version and ECC level for `input`
//  ************************************************************
///
/// Options are expected to be validated already.
/// Without a requested ECC level the level is raised as long as the data still fits.

pub fn select(options: &Options, input: &PreparedInput) -> Result<Selection> {
    let variant = options.variant;
    let candidates = candidate_versions(variant, options.version);
    let mut selector = Selector {
        rules: variant.rules(),
        candidates,
        ecc: options.ecc.unwrap_or_else(|| default_ecc(variant)),
        input,
        kanji: &options.kanji,
        byte_only: variant == Variant::Upnqr,
        structured_append: options.structured_append,
        cache: Vec::new(),
        too_long: None,
    };

    // Every step either finishes or moves to a later candidate
    let mut state = State::Candidate(0);
    for _ in 0..=3 * selector.candidates.len() {
        state = selector.step(state);
        if let State::Accept(_) | State::Fail = state {
            break;
        }
    }

    let mut selection = match state {
        State::Accept(s) => s,
        _ => {
            return Err(match selector.too_long {
                Some((required, maximum)) => Error::TooLong { required, maximum },
                None => Error::InvalidCharacter(format!(
                    "Input contains characters that cannot be encoded in {}",
                    match (variant, options.version) {
                        (Variant::MicroQr, Some(v)) => format!("version M{}", v),
                        _ => "any available mode".to_string(),
                    }
                )),
            });
        }
    };

    if options.ecc.is_none() && variant != Variant::Upnqr {
        let rules = variant.rules();
        let (version, base) = (selection.plan.version, selection.plan.ecc);
        for &ecc in rules.ecc_levels(version).iter().filter(|&&e| e > base) {
            match rules.plan(version, ecc) {
                Some(plan) if selection.bits <= plan.data_bits => selection.plan = plan,
                _ => break,
            }
        }
    }
    debug!("select: {} bits={} segments={}", selection.plan.name(), selection.bits, selection.segments.len());
    Ok(selection)
}


//  ************************************************************

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Warning;
    use crate::prng::Rng;

    fn prepared(s: &[u8]) -> PreparedInput {
        PreparedInput { units: s.iter().map(|&b| b as u32).collect(), eci: None, gs1: false, warnings: Vec::<Warning>::new() }
    }

    #[test]
    fn test_micro_m1() {
        let s = select(&Options::new(Variant::MicroQr), &prepared(b"12345")).unwrap();
        assert_eq!((s.plan.version, s.plan.ecc), (1, EccLevel::L));
        // letters need M2
        let s = select(&Options::new(Variant::MicroQr), &prepared(b"AB")).unwrap();
        assert_eq!(s.plan.version, 2);
    }

    #[test]
    fn test_micro_fixed_version_invalid_character() {
        let r = select(&Options::new(Variant::MicroQr).with_version(1), &prepared(b"A"));
        match r {
            Err(Error::InvalidCharacter(_)) => {}
            other => panic!("EXPECTED InvalidCharacter: {:?}", other.map(|s| s.plan.name())),
        }
    }

    #[test]
    fn test_qr_capacity_limit() {
        let options = Options::new(Variant::Qr).with_ecc(EccLevel::L);
        let s = select(&options, &prepared(&[b'A'; 4296])).unwrap();
        assert_eq!(s.plan.version, 40);
        match select(&options, &prepared(&[b'A'; 4297])) {
            Err(e) => assert_eq!(e.to_string(), "Input too long, requires 2957 codewords (maximum 2956)"),
            Ok(s) => panic!("4297 CHARACTERS ACCEPTED: {}", s.plan.name()),
        }
    }

    #[test]
    fn test_ecc_boost() {
        // "01234567" fits 1-H, so without a requested level it gets the strongest one
        let s = select(&Options::new(Variant::Qr), &prepared(b"01234567")).unwrap();
        assert_eq!((s.plan.version, s.plan.ecc), (1, EccLevel::H));
        let s = select(&Options::new(Variant::Qr).with_ecc(EccLevel::M), &prepared(b"01234567")).unwrap();
        assert_eq!(s.plan.ecc, EccLevel::M);
        // rMQR only has M and H
        let s = select(&Options::new(Variant::Rmqr), &prepared(b"1")).unwrap();
        assert_eq!(s.plan.ecc, EccLevel::H);
    }

    #[test]
    fn test_version_monotonic() {
        let mut rng = Rng::new(4711);
        let mut text = Vec::new();
        let mut last = 0;
        for _ in 0..600 {
            text.push(rng.get_unit_with_mode(Mode::Alphanumeric) as u8);
            let s = select(&Options::new(Variant::Qr).with_ecc(EccLevel::M), &prepared(&text)).unwrap();
            assert!(s.plan.version >= last, "VERSION SHRANK: len={} {} < {}", text.len(), s.plan.version, last);
            last = s.plan.version;
        }
    }

    #[test]
    fn test_rmqr_candidates() {
        assert_eq!(candidate_versions(Variant::Rmqr, Some(35)), vec![11, 12, 13, 14, 15, 16]);
        assert_eq!(candidate_versions(Variant::Rmqr, Some(5)), vec![5]);
        assert_eq!(candidate_versions(Variant::Upnqr, None), vec![15]);
        let s = select(&Options::new(Variant::Rmqr), &prepared(b"123456")).unwrap();
        assert_eq!(s.plan.version, 11, "SMALLEST AREA NOT CHOSEN");
        let s = select(&Options::new(Variant::Rmqr).with_version(33), &prepared(b"123456")).unwrap();
        assert_eq!(RmqrRules.dimensions(s.plan.version).0, 7);
    }

    #[test]
    fn test_upnqr_byte_only() {
        let mut input = prepared(b"0123456789");
        input.eci = Some(4);
        let s = select(&Options::new(Variant::Upnqr), &input).unwrap();
        assert_eq!((s.plan.version, s.plan.ecc), (15, EccLevel::M));
        assert_eq!(s.segments.len(), 1);
        assert_eq!(s.segments[0].mode, Mode::Byte);
        // ECI 4, Byte mode with 16 bit count, 10 bytes
        assert_eq!(s.bits, 12 + 20 + 80);
        // with the ECI header, 411 bytes is the most 15-M holds
        let mut input = prepared(&[b'a'; 411]);
        input.eci = Some(4);
        assert!(select(&Options::new(Variant::Upnqr), &input).is_ok());
        input.units.push(u32::from(b'a'));
        match select(&Options::new(Variant::Upnqr), &input) {
            Err(Error::TooLong { required, maximum }) => assert_eq!((required, maximum), (416, 415)),
            other => panic!("EXPECTED TooLong: {:?}", other.map(|s| s.plan.name())),
        }
    }

    #[test]
    fn test_segmentation_per_band() {
        // one numeric segment, whatever band the version lands in
        let s = select(&Options::new(Variant::Qr).with_ecc(EccLevel::H), &prepared(&[b'7'; 300])).unwrap();
        assert_eq!(s.segments.len(), 1);
        assert_eq!(s.segments[0].mode, Mode::Numeric);
        assert_eq!(s.bits, 4 + Variant::Qr.rules().cci_bits(s.plan.version, Mode::Numeric) + 1000);
    }
}

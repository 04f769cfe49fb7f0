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
//! Mode segmentation with minimal bit length
//  ************************************************************
//!
//! Dynamic programming over the input units.
//! The state after a unit is the mode of the current segment,
//! refined by how far the last Numeric (3 digits) or Alphanumeric (2 characters)
//! group is filled. With that refinement every step adds an exact number of bits:
//!
//! | Step | Bits |
//! | ---- | ---- |
//! | 1st, 2nd, 3rd digit of a group | 4, 3, 3 |
//! | 1st, 2nd character of a pair | 6, 5 |
//! | Byte | 8 (16 for a double byte unit) |
//! | Kanji | 13 |
//! | New segment | mode indicator + character count indicator |
//!
//! so the cheapest path is the shortest bit stream for the given version.
//! Header widths differ between versions, which is why segmentation
//! is always done for one particular version.

use crate::eci::KanjiRules;
use crate::gs1::FNC1;
use crate::tables::{alnum_value, VariantRules};
use crate::Mode;


//  ************************************************************
/// A run of input in one mode
//  ************************************************************
///
/// `data` holds one byte per character, except Kanji and double byte units in Byte mode,
/// which take two bytes (first byte first).
/// In GS1 data, 0x1D in `data` is FNC1.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub mode: Mode,
    /// ECI designator emitted in front of this segment
    pub eci: Option<u32>,
    pub data: Vec<u8>,
}

impl Segment {
    //  ************************************************************
    /// Value of the character count indicator
    pub fn char_count(&self, gs1: bool) -> usize {
        match self.mode {
            Mode::Kanji => self.data.len() / 2,
            Mode::Alphanumeric if gs1 => self.data.iter().map(|&b| if b == b'%' { 2 } else { 1 }).sum(),
            _ => self.data.len(),
        }
    }
}


// States of the dynamic programming
const N1: usize = 0; // numeric, group holds 1 digit
const N2: usize = 1; // numeric, group holds 2 digits
const N0: usize = 2; // numeric, group complete
const A1: usize = 3; // alphanumeric, pair holds 1 character
const A0: usize = 4; // alphanumeric, pair complete
const B: usize = 5;
const K: usize = 6;
const N_STATES: usize = 7;

const START: u8 = 0xFF;
const INF: u32 = u32::max_value();

fn state_mode(s: usize) -> Mode {
    match s {
        N1 | N2 | N0 => Mode::Numeric,
        A1 | A0 => Mode::Alphanumeric,
        B => Mode::Byte,
        _ => Mode::Kanji,
    }
}

/// State of a fresh segment, before its first character
fn start_state(m: Mode) -> usize {
    match m {
        Mode::Numeric => N0,
        Mode::Alphanumeric => A0,
        Mode::Byte => B,
        Mode::Kanji => K,
    }
}


//  ************************************************************
/// What each mode can make of one unit
//  ************************************************************

#[derive(Clone, Copy, Debug)]
struct UnitClass {
    digit: bool,
    /// Number of alphanumeric values (GS1 `%` is doubled), 0 if not alphanumeric
    alnum: u8,
    byte_bits: u32,
    kanji: bool,
}


//  ************************************************************
/// Segmenter for one (variant, version)
//  ************************************************************

pub struct Segmenter<'a> {
    rules: &'a dyn VariantRules,
    version: u8,
    gs1: bool,
    kanji: &'a KanjiRules,
}

impl<'a> Segmenter<'a> {
    //  ************************************************************
    pub fn new(rules: &'a dyn VariantRules, version: u8, gs1: bool, kanji: &'a KanjiRules) -> Self {
        Segmenter { rules, version, gs1, kanji }
    }

    //  ************************************************************
    fn classify(&self, unit: u32) -> UnitClass {
        let alnum = if self.gs1 && unit == FNC1 {
            1
        } else if self.gs1 && unit == u32::from(b'%') {
            2
        } else if alnum_value(unit).is_some() {
            1
        } else {
            0
        };
        UnitClass {
            digit: unit >= 0x30 && unit <= 0x39,
            alnum,
            byte_bits: if unit > 0xFF { 16 } else { 8 },
            kanji: unit > 0xFF && self.kanji.is_kanji(unit),
        }
    }

    //  ************************************************************
    /// Header bits for a new segment in mode `m`, `None` if `m` is not available
    fn header_bits(&self, m: Mode) -> Option<u32> {
        self.rules
            .mode_indicator(self.version, m)
            .map(|(_, width)| (width + self.rules.cci_bits(self.version, m)) as u32)
    }

    //  ************************************************************
    /// Add one unit to a segment in state `s`: next state and bits spent
    fn advance(s: usize, c: &UnitClass) -> Option<(usize, u32)> {
        match s {
            N0 if c.digit => Some((N1, 4)),
            N1 if c.digit => Some((N2, 3)),
            N2 if c.digit => Some((N0, 3)),
            A0 if c.alnum == 1 => Some((A1, 6)),
            A1 if c.alnum == 1 => Some((A0, 5)),
            A0 | A1 if c.alnum == 2 => Some((s, 11)),
            B => Some((B, c.byte_bits)),
            K if c.kanji => Some((K, 13)),
            _ => None,
        }
    }

    //  ************************************************************
    /// Split `units` into segments with the fewest bits; `None` if some unit
    /// cannot be encoded in any mode available at this version
    pub fn segment(&self, units: &[u32], eci: Option<u32>) -> Option<Vec<Segment>> {
        let n = units.len();
        if n == 0 {
            return Some(Vec::new());
        }
        let headers: Vec<Option<u32>> = Mode::ALL.iter().map(|&m| self.header_bits(m)).collect();
        let mut cost = vec![[INF; N_STATES]; n + 1];
        let mut back = vec![[START; N_STATES]; n + 1];

        for i in 0..n {
            let c = self.classify(units[i]);
            let (prev, next) = cost.split_at_mut(i + 1);
            let (prev, next) = (&prev[i], &mut next[0]);

            // Continue the current segment
            if i > 0 {
                for s in 0..N_STATES {
                    if prev[s] == INF {
                        continue;
                    }
                    if let Some((t, bits)) = Self::advance(s, &c) {
                        if prev[s] + bits < next[t] {
                            next[t] = prev[s] + bits;
                            back[i + 1][t] = s as u8;
                        }
                    }
                }
            }

            // Start a new segment in another mode
            for &m in Mode::ALL.iter() {
                let header = match headers[m.index()] {
                    Some(h) => h,
                    None => continue,
                };
                let (t, bits) = match Self::advance(start_state(m), &c) {
                    Some(tb) => tb,
                    None => continue,
                };
                let (from_cost, from) = if i == 0 {
                    (0, START)
                } else {
                    let mut best = (INF, START);
                    for s in 0..N_STATES {
                        if state_mode(s) != m && prev[s] < best.0 {
                            best = (prev[s], s as u8);
                        }
                    }
                    best
                };
                if from_cost == INF {
                    continue;
                }
                if from_cost + header + bits < next[t] {
                    next[t] = from_cost + header + bits;
                    back[i + 1][t] = from;
                }
            }
        }

        let (mut s, total) = (0..N_STATES).map(|s| (s, cost[n][s])).min_by_key(|&(_, c)| c)?;
        if total == INF {
            trace!("segment: version={} no encodable path", self.version);
            return None;
        }

        let mut modes = vec![Mode::Byte; n];
        for i in (1..=n).rev() {
            modes[i - 1] = state_mode(s);
            s = back[i][s] as usize;
        }

        let mut segments: Vec<Segment> = Vec::new();
        for (i, &unit) in units.iter().enumerate() {
            if segments.last().map_or(true, |seg| seg.mode != modes[i]) {
                segments.push(Segment { mode: modes[i], eci: None, data: Vec::new() });
            }
            if let Some(seg) = segments.last_mut() {
                if unit > 0xFF {
                    seg.data.push((unit >> 8) as u8);
                    seg.data.push(unit as u8);
                } else {
                    seg.data.push(unit as u8);
                }
            }
        }
        if let Some(first) = segments.first_mut() {
            first.eci = eci;
        }
        debug!(
            "segment: version={} bits={} modes={:?}",
            self.version,
            total,
            segments.iter().map(|s| (s.mode, s.data.len())).collect::<Vec<_>>()
        );
        Some(segments)
    }
}


//  ************************************************************

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream::segments_bits;
    use crate::prng::Rng;
    use crate::tables::{MicroRules, QrRules, RmqrRules};

    fn units(s: &str) -> Vec<u32> {
        s.bytes().map(|b| b as u32).collect()
    }

    fn modes(segments: &[Segment]) -> Vec<Mode> {
        segments.iter().map(|s| s.mode).collect()
    }

    #[test]
    fn test_numeric_only() {
        let k = KanjiRules::default();
        let seg = Segmenter::new(&QrRules, 1, false, &k).segment(&units("01234567"), None).unwrap();
        assert_eq!(modes(&seg), vec![Mode::Numeric]);
        assert_eq!(seg[0].data, b"01234567".to_vec());
    }

    #[test]
    fn test_mixed() {
        let k = KanjiRules::default();
        let s = Segmenter::new(&QrRules, 1, false, &k);
        let seg = s.segment(&units("abcdef0123456789012345"), None).unwrap();
        assert_eq!(modes(&seg), vec![Mode::Byte, Mode::Numeric]);
        let seg = s.segment(&units("a1"), None).unwrap();
        assert_eq!(modes(&seg), vec![Mode::Byte]);
        let seg = s.segment(&units("HELLO WORLD"), None).unwrap();
        assert_eq!(modes(&seg), vec![Mode::Alphanumeric]);
    }

    #[test]
    fn test_micro_restrictions() {
        let k = KanjiRules::default();
        assert!(Segmenter::new(&MicroRules, 1, false, &k).segment(&units("12345"), None).is_some());
        assert!(Segmenter::new(&MicroRules, 1, false, &k).segment(&units("12A"), None).is_none());
        let seg = Segmenter::new(&MicroRules, 2, false, &k).segment(&units("12A"), None).unwrap();
        assert_eq!(modes(&seg), vec![Mode::Alphanumeric]);
        assert!(Segmenter::new(&MicroRules, 2, false, &k).segment(&units("a"), None).is_none());
        assert!(Segmenter::new(&MicroRules, 3, false, &k).segment(&units("a"), None).is_some());
    }

    #[test]
    fn test_kanji() {
        let k = KanjiRules::default();
        let seg = Segmenter::new(&QrRules, 1, false, &k).segment(&[0x935F, 0xE4AA], None).unwrap();
        assert_eq!(modes(&seg), vec![Mode::Kanji]);
        assert_eq!(seg[0].data, vec![0x93, 0x5F, 0xE4, 0xAA]);
        assert_eq!(seg[0].char_count(false), 2);
        // outside the Kanji ranges the double byte unit has to go into Byte mode
        let seg = Segmenter::new(&QrRules, 1, false, &k).segment(&[0xA0A1], None).unwrap();
        assert_eq!(modes(&seg), vec![Mode::Byte]);
        assert_eq!(seg[0].char_count(false), 2);
    }

    #[test]
    fn test_gs1_percent() {
        let k = KanjiRules::default();
        let mut u = units("10AB%C");
        u.push(FNC1);
        u.extend(units("21ABC"));
        let seg = Segmenter::new(&QrRules, 1, true, &k).segment(&u, None).unwrap();
        assert_eq!(modes(&seg), vec![Mode::Alphanumeric]);
        assert_eq!(seg[0].char_count(true), 13);
    }

    #[test]
    fn test_eci_on_first_segment() {
        let k = KanjiRules::default();
        let seg = Segmenter::new(&QrRules, 1, false, &k).segment(&units("ab12345678"), Some(26)).unwrap();
        assert_eq!(seg[0].eci, Some(26));
        assert!(seg[1..].iter().all(|s| s.eci.is_none()));
    }

    #[test]
    fn test_never_worse_than_single_mode() {
        let k = KanjiRules::default();
        let mut rng = Rng::new(0x1234_5678);
        let alphabets: [&[u8]; 3] = [b"0123456789", b"0123456789ABCXYZ $%", b"0123456789ABCabc!"];
        for round in 0..200 {
            let alphabet = alphabets[round % 3];
            let len = rng.get_usize_clamped(1, 60);
            let u: Vec<u32> = (0..len).map(|_| alphabet[rng.get_usize_clamped(0, alphabet.len())] as u32).collect();
            for &(rules, version) in [(&QrRules as &dyn VariantRules, 1u8), (&QrRules, 10), (&QrRules, 27), (&RmqrRules, 5)].iter() {
                let s = Segmenter::new(rules, version, false, &k);
                let seg = s.segment(&u, None).unwrap();
                let best = segments_bits(rules, version, &seg, false);
                for &m in [Mode::Numeric, Mode::Alphanumeric, Mode::Byte].iter() {
                    let single = Segment { mode: m, eci: None, data: u.iter().map(|&x| x as u8).collect() };
                    let representable = match m {
                        Mode::Numeric => u.iter().all(|&x| x >= 0x30 && x <= 0x39),
                        Mode::Alphanumeric => u.iter().all(|&x| alnum_value(x).is_some()),
                        _ => true,
                    };
                    if representable {
                        let bits = segments_bits(rules, version, &[single], false);
                        assert!(best <= bits, "SEGMENTATION WORSE THAN {:?}: best={} single={} version={}", m, best, bits, version);
                    }
                }
                if u.iter().all(|&x| x >= 0x30 && x <= 0x39) {
                    assert_eq!(modes(&seg), vec![Mode::Numeric], "NUMERIC INPUT NOT NUMERIC");
                }
            }
        }
    }
}

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
//! Bit stream: headers, segments, terminator and padding
//  ************************************************************
//!
//! Layout of the data bit stream:
//!
//! 1. Structured Append header (QR Code only)
//! 2. FNC1 in first position (GS1)
//! 3. Per segment: ECI designator (if any), mode indicator, character count, data
//! 4. Terminator (truncated when the symbol is full)
//! 5. Zero bits to the next codeword boundary, then pad codewords 0xEC, 0x11, ...
//!
//! For Micro QR M1 and M3 the last data codeword only has 4 bits.
//! It is kept in the high nibble of the last byte.

use crate::error::{Error, Result};
use crate::gs1::FNC1;
use crate::segment::Segment;
use crate::tables::{alnum_value, SymbolPlan, VariantRules};
use crate::{Mode, StructuredAppend};


//  ************************************************************
/// Sequence of bits stored in a byte vector
//  ************************************************************
///
/// Bits are appended most significant first, and the vector grows as needed.

#[derive(Clone, Debug, Default)]
pub struct BitSeq {
    data: Vec<u8>,
    idx: usize,
}

//  ************************************************************
impl BitSeq {
    //  ************************************************************
    pub fn new() -> Self {
        BitSeq { data: Vec::new(), idx: 0 }
    }

    //  ************************************************************
    pub fn with_capacity(n_bytes: usize) -> Self {
        BitSeq { data: Vec::with_capacity(n_bytes), idx: 0 }
    }

    //  ************************************************************
    /// Number of bits
    pub fn len(&self) -> usize {
        self.idx
    }

    //  ************************************************************
    pub fn is_empty(&self) -> bool {
        self.idx == 0
    }

    //  ************************************************************
    pub fn push_bit(&mut self, set: bool) {
        let byte = self.idx / 8;
        if byte >= self.data.len() {
            self.data.push(0);
        }
        if set {
            self.data[byte] |= 1 << (7 - self.idx % 8);
        }
        self.idx += 1;
    }

    //  ************************************************************
    /// Append the `n_bits` least significant bits of `bits`
    pub fn append_bits(&mut self, bits: u32, n_bits: usize) {
        insane!("BitSeq::append_bits: idx={} bits={:#x} n_bits={}", self.idx, bits, n_bits);
        for i in (0..n_bits).rev() {
            self.push_bit((bits >> i) & 1 == 1);
        }
    }

    //  ************************************************************
    pub fn append_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes.iter() {
            self.append_bits(u32::from(b), 8);
        }
    }

    //  ************************************************************
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}


//  ************************************************************
impl From<Vec<u8>> for BitSeq {
    fn from(data: Vec<u8>) -> Self {
        let idx = 8 * data.len();
        BitSeq { data, idx }
    }
}


//  ************************************************************
impl<'a> IntoIterator for &'a BitSeq {
    type Item = bool;
    type IntoIter = BitSeqIterator<'a>;
    fn into_iter(self) -> Self::IntoIter {
        BitSeqIterator { bits: self, pos: 0 }
    }
}


//  ************************************************************
/// Iterator over bits in a `BitSeq`
//  ************************************************************

pub struct BitSeqIterator<'a> {
    bits: &'a BitSeq,
    pos: usize,
}

//  ************************************************************
impl<'a> Iterator for BitSeqIterator<'a> {
    type Item = bool;
    fn next(&mut self) -> Option<bool> {
        if self.pos >= self.bits.idx {
            return None;
        }
        let res = self.bits.data[self.pos / 8] & (1 << (7 - self.pos % 8)) != 0;
        self.pos += 1;
        Some(res)
    }
}


//  ************************************************************
/// Split a segment's data into chunks whose character count fits `max_count`
//  ************************************************************

fn chunks(segment: &Segment, max_count: usize, gs1: bool) -> Vec<&[u8]> {
    let step = if segment.mode == Mode::Kanji { 2 } else { 1 };
    let mut res = Vec::new();
    let (mut start, mut count) = (0, 0);
    let mut i = 0;
    while i < segment.data.len() {
        let weight = if gs1 && segment.mode == Mode::Alphanumeric && segment.data[i] == b'%' { 2 } else { 1 };
        if count + weight > max_count {
            res.push(&segment.data[start..i]);
            start = i;
            count = 0;
        }
        count += weight;
        i += step;
    }
    if start < segment.data.len() || res.is_empty() {
        res.push(&segment.data[start..]);
    }
    res
}


//  ************************************************************
/// Bits needed for the ECI designator of `eci`
//  ************************************************************

fn eci_bits(rules: &dyn VariantRules, eci: u32) -> usize {
    let designator = match eci {
        0..=127 => 8,
        128..=16383 => 16,
        _ => 24,
    };
    rules.eci_indicator().map_or(0, |(_, w)| w + designator)
}


//  ************************************************************
/// Bits of the character data alone (no headers)
//  ************************************************************

fn payload_bits(mode: Mode, data: &[u8], gs1: bool) -> usize {
    match mode {
        Mode::Numeric => 10 * (data.len() / 3) + [0, 4, 7][data.len() % 3],
        Mode::Alphanumeric => {
            let n = alnum_values(data, gs1).len();
            11 * (n / 2) + 6 * (n % 2)
        }
        Mode::Byte => 8 * data.len(),
        Mode::Kanji => 13 * (data.len() / 2),
    }
}


//  ************************************************************
/// Exact number of bits for `segments` at `version`, headers and ECI included
//  ************************************************************
///
/// Segments too long for the character count indicator are counted as
/// several segments, the way they will be written.

pub fn segments_bits(rules: &dyn VariantRules, version: u8, segments: &[Segment], gs1: bool) -> usize {
    let mut bits = 0;
    for seg in segments.iter() {
        if let Some(eci) = seg.eci {
            bits += eci_bits(rules, eci);
        }
        let header = rules.mode_indicator(version, seg.mode).map_or(0, |(_, w)| w) + rules.cci_bits(version, seg.mode);
        let max_count = (1usize << rules.cci_bits(version, seg.mode)) - 1;
        for chunk in chunks(seg, max_count, gs1) {
            bits += header + payload_bits(seg.mode, chunk, gs1);
        }
    }
    bits
}


//  ************************************************************
/// Bits in front of the first segment: Structured Append and FNC1 in first position
//  ************************************************************

pub fn header_bits(rules: &dyn VariantRules, gs1: bool, structured_append: Option<StructuredAppend>) -> usize {
    let mut bits = 0;
    if structured_append.is_some() {
        bits += rules.structured_append_indicator().map_or(0, |(_, w)| w + 16);
    }
    if gs1 {
        bits += rules.fnc1_first().map_or(0, |(_, w)| w);
    }
    bits
}


//  ************************************************************
/// Total bits of the stream before terminator and padding
//  ************************************************************

pub fn stream_bits(
    rules: &dyn VariantRules,
    version: u8,
    segments: &[Segment],
    gs1: bool,
    structured_append: Option<StructuredAppend>,
) -> usize {
    header_bits(rules, gs1, structured_append) + segments_bits(rules, version, segments, gs1)
}


//  ************************************************************
/// Alphanumeric values of `data`; in GS1 data FNC1 is `%` and a literal `%` is doubled
//  ************************************************************

fn alnum_values(data: &[u8], gs1: bool) -> Vec<u16> {
    let mut values = Vec::with_capacity(data.len());
    for &b in data.iter() {
        if gs1 && u32::from(b) == FNC1 {
            values.push(38);
        } else if gs1 && b == b'%' {
            values.push(38);
            values.push(38);
        } else if let Some(v) = alnum_value(u32::from(b)) {
            values.push(u16::from(v));
        }
    }
    values
}


//  ************************************************************
fn encode_numeric(bits: &mut BitSeq, text: &[u8]) {
    for group in text.chunks(3) {
        let val = group.iter().fold(0u32, |acc, &c| 10 * acc + u32::from(c - b'0'));
        bits.append_bits(val, [0, 4, 7, 10][group.len()]);
    }
}

//  ************************************************************
fn encode_alpha_numeric(bits: &mut BitSeq, text: &[u8], gs1: bool) {
    for pair in alnum_values(text, gs1).chunks(2) {
        match *pair {
            [a, b] => bits.append_bits(45 * u32::from(a) + u32::from(b), 11),
            [a] => bits.append_bits(u32::from(a), 6),
            _ => {}
        }
    }
}

//  ************************************************************
/// Shift-JIS double byte to the 13 bit Kanji mode value
pub fn kanji_value(hi: u8, lo: u8) -> u32 {
    let sjis = (u32::from(hi) << 8) | u32::from(lo);
    let v = if sjis <= 0x9FFC { sjis - 0x8140 } else { sjis - 0xC140 };
    (v >> 8) * 0xC0 + (v & 0xFF)
}

//  ************************************************************
fn encode_kanji(bits: &mut BitSeq, text: &[u8]) {
    for pair in text.chunks(2) {
        if let [hi, lo] = *pair {
            bits.append_bits(kanji_value(hi, lo), 13);
        }
    }
}


//  ************************************************************
/// Write `segments` with their headers into `bits`
//  ************************************************************
///
/// Fails with [`Error::InvalidCharacter`] if a segment's mode does not exist at `version`.

pub fn append_segments(bits: &mut BitSeq, rules: &dyn VariantRules, version: u8, segments: &[Segment], gs1: bool) -> Result<()> {
    for seg in segments.iter() {
        if let (Some(eci), Some((indicator, width))) = (seg.eci, rules.eci_indicator()) {
            bits.append_bits(indicator, width);
            match eci {
                0..=127 => bits.append_bits(eci, 8),
                128..=16383 => bits.append_bits(0x8000 | eci, 16),
                _ => bits.append_bits(0xC0_0000 | eci, 24),
            }
        }
        let (indicator, width) = match rules.mode_indicator(version, seg.mode) {
            Some(mi) => mi,
            None => {
                return Err(Error::InvalidCharacter(format!("{:?} mode not available in version {}", seg.mode, version)));
            }
        };
        let cci = rules.cci_bits(version, seg.mode);
        for chunk in chunks(seg, (1usize << cci) - 1, gs1) {
            let part = Segment { mode: seg.mode, eci: None, data: chunk.to_vec() };
            trace!("append_segments: mode={:?} count={}", seg.mode, part.char_count(gs1));
            bits.append_bits(indicator, width);
            bits.append_bits(part.char_count(gs1) as u32, cci);
            match seg.mode {
                Mode::Numeric => encode_numeric(bits, chunk),
                Mode::Alphanumeric => encode_alpha_numeric(bits, chunk, gs1),
                Mode::Byte => bits.append_bytes(chunk),
                Mode::Kanji => encode_kanji(bits, chunk),
            }
        }
    }
    Ok(())
}


//  ************************************************************
/// Build the data codewords for `plan`
//  ************************************************************
///
/// Fails with [`Error::TooLong`] if the stream does not fit.

pub fn data_codewords(
    plan: &SymbolPlan,
    segments: &[Segment],
    gs1: bool,
    structured_append: Option<StructuredAppend>,
) -> Result<Vec<u8>> {
    let rules = plan.variant.rules();
    let mut bits = BitSeq::with_capacity(plan.data_codewords);

    if let (Some(sa), Some((indicator, width))) = (structured_append, rules.structured_append_indicator()) {
        bits.append_bits(indicator, width);
        bits.append_bits(sa.index - 1, 4);
        bits.append_bits(sa.count - 1, 4);
        bits.append_bits(sa.id, 8);
    }
    if gs1 {
        if let Some((indicator, width)) = rules.fnc1_first() {
            bits.append_bits(indicator, width);
        }
    }
    append_segments(&mut bits, rules, plan.version, segments, gs1)?;

    if bits.len() > plan.data_bits {
        return Err(Error::TooLong { required: (bits.len() + 7) / 8, maximum: plan.data_codewords });
    }

    // Terminator, as much of it as fits
    let terminator = rules.terminator_bits(plan.version).min(plan.data_bits - bits.len());
    bits.append_bits(0, terminator);

    // Pad codewords fill the full 8 bit codewords, a trailing half codeword stays zero
    let full = if plan.has_half_codeword() { 8 * (plan.data_codewords - 1) } else { 8 * plan.data_codewords };
    if bits.len() < full {
        while bits.len() % 8 != 0 {
            bits.push_bit(false);
        }
        let pad: [u32; 2] = [0xEC, 0x11];
        let mut pi = 0;
        while bits.len() < full {
            bits.append_bits(pad[pi], 8);
            pi = 1 - pi;
        }
    }
    while bits.len() < plan.data_bits {
        bits.push_bit(false);
    }
    let data = bits.into_bytes();
    debug!("data_codewords: {} len={} {:X?}", plan.name(), data.len(), data);
    Ok(data)
}


//  ************************************************************

//  ************************************************************
//  Read finished symbols back to codewords and data
//  ************************************************************

#![allow(dead_code)]

use qrfamily_wasm::bitstream::kanji_value;
use qrfamily_wasm::mask::{candidates, mask_bit};
use qrfamily_wasm::matrix::{function_patterns, Module};
use qrfamily_wasm::tables::{SymbolPlan, ALPHANUMERIC};
use qrfamily_wasm::{Mode, Symbol, Variant};


//  ************************************************************

pub fn plan_of(symbol: &Symbol) -> SymbolPlan {
    symbol.variant.rules().plan(symbol.version, symbol.ecc).unwrap()
}


//  ************************************************************
/// Unmask the data modules and collect them in placement order
//  ************************************************************

pub fn read_bits(symbol: &Symbol) -> Vec<bool> {
    let grid = function_patterns(symbol.variant, symbol.version);
    let pattern = candidates(symbol.variant)[symbol.mask as usize];
    let (rows, width) = (symbol.rows as isize, symbol.width as isize);
    let mut bits = Vec::new();
    let mut right = if symbol.variant == Variant::Rmqr { width - 2 } else { width - 1 };
    let mut upward = true;
    while right >= 0 {
        if right == 6 && (symbol.variant == Variant::Qr || symbol.variant == Variant::Upnqr) {
            right -= 1;
        }
        for k in 0..rows {
            let row = (if upward { rows - 1 - k } else { k }) as usize;
            for &col in [right, right - 1].iter() {
                if col >= 0 && grid.get(row, col as usize) == Module::Empty {
                    let col = col as usize;
                    bits.push(symbol.is_dark(row, col) != mask_bit(pattern, row, col));
                }
            }
        }
        upward = !upward;
        right -= 2;
    }
    bits
}


//  ************************************************************
/// All codewords in symbol order; a half codeword is returned in the high nibble
//  ************************************************************

pub fn read_codewords(symbol: &Symbol) -> Vec<u8> {
    let plan = plan_of(symbol);
    let bits = read_bits(symbol);
    let half = if plan.has_half_codeword() { Some(plan.data_codewords - 1) } else { None };
    let mut pos = 0;
    let mut codewords = Vec::with_capacity(plan.total_codewords);
    for i in 0..plan.total_codewords {
        let n = if Some(i) == half { 4 } else { 8 };
        let mut cw = 0u8;
        for k in 0..n {
            if bits[pos + k] {
                cw |= 0x80 >> k;
            }
        }
        pos += n;
        codewords.push(cw);
    }
    codewords
}


//  ************************************************************
/// Undo the interleaving: (data, ec) per block
//  ************************************************************

pub fn deinterleave(codewords: &[u8], plan: &SymbolPlan) -> Vec<(Vec<u8>, Vec<u8>)> {
    let layout = &plan.ec_block_layout;
    let mut blocks: Vec<(Vec<u8>, Vec<u8>)> = layout.iter().map(|_| (Vec::new(), Vec::new())).collect();
    let mut it = codewords.iter();
    let max_data = layout.iter().map(|b| b.data_codewords).max().unwrap_or(0);
    for i in 0..max_data {
        for (b, block) in layout.iter().enumerate() {
            if i < block.data_codewords {
                blocks[b].0.push(*it.next().unwrap());
            }
        }
    }
    let ec = layout.first().map(|b| b.ec_codewords).unwrap_or(0);
    for _ in 0..ec {
        for block in blocks.iter_mut() {
            block.1.push(*it.next().unwrap());
        }
    }
    blocks
}


//  ************************************************************
/// Data codewords of a symbol, blocks joined again
//  ************************************************************

pub fn read_data_codewords(symbol: &Symbol) -> Vec<u8> {
    let plan = plan_of(symbol);
    deinterleave(&read_codewords(symbol), &plan).into_iter().flat_map(|(d, _)| d).collect()
}


//  ************************************************************
/// What a reader gets out of the data bit stream
//  ************************************************************

#[derive(Debug, Default, PartialEq)]
pub struct Decoded {
    pub eci: Option<u32>,
    pub gs1: bool,
    /// (index, count, id)
    pub structured_append: Option<(u32, u32, u32)>,
    pub modes: Vec<Mode>,
    pub bytes: Vec<u8>,
}

struct BitReader {
    bits: Vec<bool>,
    pos: usize,
}

impl BitReader {
    fn remaining(&self) -> usize {
        self.bits.len() - self.pos
    }
    fn peek_zero(&self, n: usize) -> bool {
        self.bits[self.pos..(self.pos + n).min(self.bits.len())].iter().all(|b| !b)
    }
    fn read(&mut self, n: usize) -> u32 {
        let mut v = 0;
        for _ in 0..n {
            v = (v << 1) | self.bits[self.pos] as u32;
            self.pos += 1;
        }
        v
    }
}


//  ************************************************************
/// Parse the data bit stream of `symbol`
//  ************************************************************

pub fn decode(symbol: &Symbol) -> Decoded {
    let plan = plan_of(symbol);
    let rules = symbol.variant.rules();
    let version = symbol.version;
    let data = read_data_codewords(symbol);
    let mut bits = Vec::with_capacity(plan.data_bits);
    for cw in data.iter() {
        for k in 0..8 {
            bits.push(cw & (0x80 >> k) != 0);
        }
    }
    bits.truncate(plan.data_bits);
    let mut r = BitReader { bits, pos: 0 };
    let mut out = Decoded::default();
    let width = rules.mode_indicator(version, Mode::Numeric).unwrap().1;

    while r.remaining() >= width && !r.peek_zero(rules.terminator_bits(version)) {
        let indicator = r.read(width);
        if rules.eci_indicator() == Some((indicator, width)) {
            let first = r.read(8);
            out.eci = Some(if first & 0x80 == 0 {
                first
            } else if first & 0xC0 == 0x80 {
                ((first & 0x3F) << 8) | r.read(8)
            } else {
                ((first & 0x1F) << 16) | r.read(16)
            });
            continue;
        }
        if rules.fnc1_first() == Some((indicator, width)) {
            out.gs1 = true;
            continue;
        }
        if rules.structured_append_indicator() == Some((indicator, width)) {
            let index = r.read(4) + 1;
            let count = r.read(4) + 1;
            out.structured_append = Some((index, count, r.read(8)));
            continue;
        }
        let mode = *Mode::ALL
            .iter()
            .find(|&&m| rules.mode_indicator(version, m) == Some((indicator, width)))
            .unwrap_or_else(|| panic!("UNKNOWN MODE INDICATOR {:b} AT BIT {}", indicator, r.pos));
        let count = r.read(rules.cci_bits(version, mode)) as usize;
        out.modes.push(mode);
        match mode {
            Mode::Numeric => {
                let mut n = count;
                while n > 0 {
                    let (digits, nbits) = match n {
                        1 => (1, 4),
                        2 => (2, 7),
                        _ => (3, 10),
                    };
                    let v = r.read(nbits);
                    out.bytes.extend(format!("{:0width$}", v, width = digits).bytes());
                    n -= digits;
                }
            }
            Mode::Alphanumeric => {
                for _ in 0..count / 2 {
                    let v = r.read(11) as usize;
                    out.bytes.push(ALPHANUMERIC[v / 45]);
                    out.bytes.push(ALPHANUMERIC[v % 45]);
                }
                if count % 2 == 1 {
                    out.bytes.push(ALPHANUMERIC[r.read(6) as usize]);
                }
            }
            Mode::Byte => {
                for _ in 0..count {
                    out.bytes.push(r.read(8) as u8);
                }
            }
            Mode::Kanji => {
                for _ in 0..count {
                    let v = r.read(13);
                    let w = ((v / 0xC0) << 8) | (v % 0xC0);
                    let sjis = if w + 0x8140 <= 0x9FFC { w + 0x8140 } else { w + 0xC140 };
                    assert_eq!(kanji_value((sjis >> 8) as u8, sjis as u8), v, "KANJI VALUE MISMATCH");
                    out.bytes.push((sjis >> 8) as u8);
                    out.bytes.push(sjis as u8);
                }
            }
        }
        if width == 0 {
            break;
        }
    }
    out
}

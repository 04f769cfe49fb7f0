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
//! Pseudo random number generator
//  ************************************************************

use crate::tables::ALPHANUMERIC;
use crate::Mode;

//  ************************************************************
/// Very simple XORSHIFT pseudo random number generator
///
/// # References
///
/// - <https://en.wikipedia.org/wiki/Xorshift>
/// - <http://www.jstatsoft.org/v08/i14/paper>
///
/// The `Rng` is only used for generating testdata.
/// The seed must not be zero.
//  ************************************************************

pub struct Rng {
    state: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Rng { state: seed }
    }
    pub fn get_u32(&mut self) -> u32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state.wrapping_sub(1)
    }
    pub fn get_u8(&mut self) -> u8 {
        self.get_u32() as u8
    }
    pub fn get_u8_vec(&mut self, len: usize) -> Vec<u8> {
        (0..len).map(|_| self.get_u8()).collect()
    }
    /// Value in `min..max`, or `min` if the range is empty
    pub fn get_usize_clamped(&mut self, min: usize, max: usize) -> usize {
        if max <= min {
            min
        } else {
            min + (self.get_u32() as usize) % (max - min)
        }
    }
    //  ************************************************************
    /// One input unit that can be encoded in `mode`
    ///
    /// Kanji units are Shift JIS double bytes `hi << 8 | lo`.
    pub fn get_unit_with_mode(&mut self, mode: Mode) -> u32 {
        let u = self.get_u32();
        match mode {
            Mode::Numeric => 0x30 + u % 10,
            Mode::Alphanumeric => ALPHANUMERIC[(u % 45) as usize] as u32,
            Mode::Byte => u & 0xFF,
            Mode::Kanji => {
                let hi = match (u >> 8) % 43 {
                    h if h < 31 => 0x81 + h,
                    h => 0xE0 + h - 31,
                };
                // the last lead byte stops at trail 0xBF
                let span = if hi == 0xEB { 127 } else { 188 };
                let lo = match 0x40 + (u >> 16) % span {
                    l if l >= 0x7F => l + 1,
                    l => l,
                };
                (hi << 8) | lo
            }
        }
    }
}


//  ************************************************************

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eci::KanjiRules;

    #[test]
    fn test_units_with_mode() {
        let mut rng = Rng::new(0xC0FFEE);
        let kanji = KanjiRules::default();
        for _ in 0..2000 {
            let n = rng.get_unit_with_mode(Mode::Numeric);
            assert!((0x30..=0x39).contains(&n), "NOT A DIGIT: {:#x}", n);
            let a = rng.get_unit_with_mode(Mode::Alphanumeric);
            assert!(ALPHANUMERIC.contains(&(a as u8)), "NOT ALPHANUMERIC: {:#x}", a);
            let k = rng.get_unit_with_mode(Mode::Kanji);
            assert!(kanji.is_kanji(k), "NOT KANJI: {:#06x}", k);
        }
    }

    #[test]
    fn test_clamped() {
        let mut rng = Rng::new(17);
        for _ in 0..1000 {
            let x = rng.get_usize_clamped(3, 9);
            assert!((3..9).contains(&x), "OUT OF RANGE: {}", x);
        }
        assert_eq!(rng.get_usize_clamped(5, 5), 5);
    }
}

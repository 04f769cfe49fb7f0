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
//! Encoder for the QR Code family: QR Code, Micro QR Code, rMQR and UPNQR
//  ************************************************************
//!
//! The pipeline runs in stages, each in its own module:
//!
//! | Stage | Module |
//! | ----- | ------ |
//! | Input conversion (ECI, Shift-JIS, GS1) | [`eci`], [`gs1`] |
//! | Mode segmentation | [`segment`] |
//! | Bit stream | [`bitstream`] |
//! | Version/size selection | [`select`] |
//! | Reed-Solomon | [`reedsolomon`] |
//! | Module placement, format and version info | [`matrix`] |
//! | Mask evaluation | [`mask`] |
//!
//! [`qrencode::encode`] drives them all.
//!
//! ```
//! use qrfamily_wasm::{encode, Options, Variant};
//!
//! let symbol = encode(b"01234567", &Options::new(Variant::Qr)).unwrap();
//! assert_eq!(symbol.width, 21);
//! ```

use std::convert::TryFrom;

use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

#[macro_use]
pub mod logging;
pub mod bitstream;
pub mod eci;
pub mod error;
pub mod gs1;
pub mod mask;
pub mod matrix;
pub mod prng;
pub mod qrencode;
pub mod reedsolomon;
pub mod segment;
pub mod select;
pub mod tables;
pub mod web_sys_fallback;

pub use eci::{BuiltinCharsets, CharsetLookup, KanjiRules};
pub use error::{Error, Result, Warning};
pub use qrencode::{encode, encode_batch, encode_with, Symbol};


//  ************************************************************
/// Member of the QR Code family to produce
//  ************************************************************

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    /// QR Code model 2, versions 1 to 40 (ISO/IEC 18004)
    Qr,
    /// Micro QR Code, versions M1 to M4 (ISO/IEC 18004)
    MicroQr,
    /// Rectangular Micro QR Code, R7x43 to R17x139 (ISO/IEC 23941)
    Rmqr,
    /// QR Code profile for Slovenian UPN payment slips
    Upnqr,
}


//  ************************************************************
/// Error Correction Level (L/M/Q/H) as defined by ISO 18004
//  ************************************************************
///
/// The declaration order is the order of increasing strength,
/// so levels can be compared with `<`.

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EccLevel {
    /// ~ 7% error correction capability
    L,
    /// ~ 15% error correction capability
    M,
    /// ~ 25% error correction capability
    Q,
    /// ~ 30% error correction capability
    H,
}

impl EccLevel {
    /// Index in tables ordered L, M, Q, H
    pub fn index(self) -> usize {
        self as usize
    }

    /// The two bit indicator used in QR Code format information
    pub fn format_bits(self) -> u16 {
        match self {
            EccLevel::L => 0b01,
            EccLevel::M => 0b00,
            EccLevel::Q => 0b11,
            EccLevel::H => 0b10,
        }
    }
}


//  ************************************************************
/// Mode (Numeric, Alphanumeric, Byte, Kanji) as defined by ISO 18004
//  ************************************************************
///
/// Defines how a run of characters is turned into bits

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    Numeric,
    Alphanumeric,
    Byte,
    Kanji,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Numeric, Mode::Alphanumeric, Mode::Byte, Mode::Kanji];

    /// Index in tables ordered N, A, B, K
    pub fn index(self) -> usize {
        self as usize
    }
}


//  ************************************************************
/// How the input bytes are to be interpreted
//  ************************************************************

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    /// UTF-8 text, converted to the symbol's character set
    Unicode,
    /// Raw bytes, no character set conversion
    Data,
    /// GS1 element string, `[AI]value` or (if `parenthesized`) `(AI)value`
    Gs1 { parenthesized: bool },
}


//  ************************************************************
/// Position of one symbol in a Structured Append sequence
//  ************************************************************

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StructuredAppend {
    /// Position in the sequence, 1 based
    pub index: u32,
    /// Number of symbols in the sequence (2 to 16)
    pub count: u32,
    /// Parity/ID shared by all symbols of the sequence (0 to 255)
    pub id: u32,
}


//  ************************************************************
/// Encoding request
//  ************************************************************
///
/// Every field except `variant` is optional; `None` lets the encoder choose.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub variant: Variant,
    pub input_mode: InputMode,
    pub eci: Option<u32>,
    pub ecc: Option<EccLevel>,
    /// QR 1..=40, Micro QR 1..=4 (M1..M4), rMQR 1..=32, or 33..=38 for rMQR fixed height, automatic width
    pub version: Option<u8>,
    pub mask: Option<u8>,
    pub full_multibyte: bool,
    pub structured_append: Option<StructuredAppend>,
    pub kanji: KanjiRules,
}

impl Options {
    pub fn new(variant: Variant) -> Self {
        Options {
            variant,
            input_mode: InputMode::Unicode,
            eci: None,
            ecc: None,
            version: None,
            mask: None,
            full_multibyte: false,
            structured_append: None,
            kanji: KanjiRules::default(),
        }
    }

    pub fn with_input_mode(mut self, input_mode: InputMode) -> Self {
        self.input_mode = input_mode;
        self
    }

    pub fn with_eci(mut self, eci: u32) -> Self {
        self.eci = Some(eci);
        self
    }

    pub fn with_ecc(mut self, ecc: EccLevel) -> Self {
        self.ecc = Some(ecc);
        self
    }

    pub fn with_version(mut self, version: u8) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_mask(mut self, mask: u8) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_full_multibyte(mut self, full_multibyte: bool) -> Self {
        self.full_multibyte = full_multibyte;
        self
    }

    pub fn with_structured_append(mut self, index: u32, count: u32, id: u32) -> Self {
        self.structured_append = Some(StructuredAppend { index, count, id });
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Options::new(Variant::Qr)
    }
}


/* ============================================================
 * Web Assembly (wasm) interface
 * ============================================================
 */

//  ************************************************************
/// Set logging level
//  ************************************************************

#[wasm_bindgen]
pub fn set_loglevel(lvl: usize) {
    logging::set_loglevel(lvl);
}


//  ************************************************************
/// Encode text into a symbol
//  ************************************************************
///
/// Numeric arguments use 0 for "choose automatically":
///
/// * `variant`: 0 = QR, 1 = Micro QR, 2 = rMQR, 3 = UPNQR
/// * `ecc`: 0 = auto, 1 = L, 2 = M, 3 = Q, 4 = H
/// * `version`: 0 = auto, otherwise as in [`Options::version`]
/// * `mask`: negative = auto, otherwise 0..=7
///
/// The returned object has either an `err` field,
/// or `rows`, `width`, `version`, `ecc`, `mask`, `eci`, `modules` (one byte per module, row by row)
/// and `warnings`.

#[wasm_bindgen]
pub fn encode_symbol(txt: &str, variant: u8, ecc: u8, version: u8, mask: i32) -> Object {
    let result_out: JsValue = Object::new().into();
    let variant = match variant {
        0 => Variant::Qr,
        1 => Variant::MicroQr,
        2 => Variant::Rmqr,
        3 => Variant::Upnqr,
        _ => {
            set_value(&result_out, "err", "unknown variant");
            return result_out.into();
        }
    };
    let mut options = Options::new(variant);
    options.ecc = match ecc {
        1 => Some(EccLevel::L),
        2 => Some(EccLevel::M),
        3 => Some(EccLevel::Q),
        4 => Some(EccLevel::H),
        _ => None,
    };
    if version > 0 {
        options.version = Some(version);
    }
    options.mask = match mask_option(variant, mask) {
        Ok(m) => m,
        Err(e) => {
            set_value(&result_out, "err", e.to_string());
            return result_out.into();
        }
    };
    match qrencode::encode(txt.as_bytes(), &options) {
        Err(e) => set_value(&result_out, "err", e.to_string()),
        Ok(symbol) => {
            set_value(&result_out, "rows", symbol.rows as u32);
            set_value(&result_out, "width", symbol.width as u32);
            set_value(&result_out, "version", symbol.version_name());
            set_value(&result_out, "ecc", format!("{:?}", symbol.ecc));
            set_value(&result_out, "mask", symbol.mask);
            set_optional(&result_out, "eci", symbol.eci);
            let modules: Vec<u8> = symbol.modules.iter().map(|&d| d as u8).collect();
            set_value(&result_out, "modules", Uint8Array::from(&modules[..]));
            let warnings = Array::new();
            for w in symbol.warnings.iter() {
                warnings.push(&JsValue::from(w.to_string()));
            }
            set_value(&result_out, "warnings", warnings);
        }
    }
    result_out.into()
}


//  ************************************************************
/// Mask argument from JavaScript: negative is automatic, anything beyond `u8` is rejected
//  ************************************************************

fn mask_option(variant: Variant, mask: i32) -> Result<Option<u8>> {
    if mask < 0 {
        return Ok(None);
    }
    match u8::try_from(mask) {
        Ok(m) => Ok(Some(m)),
        Err(_) => Err(Error::InvalidOption(format!(
            "Mask '{}' out of range 0 to {}",
            mask,
            crate::mask::candidates(variant).len() - 1
        ))),
    }
}


//  ************************************************************
/// Helper function to assign a value to a field in a JsValue object
//  ************************************************************

fn set_value<F: Into<JsValue>>(object: &JsValue, field: &str, value: F) {
    let _ = Reflect::set(object, &JsValue::from(field), &value.into());
}


//  ************************************************************
/// Helper function to assign an optional value to a field in a JsValue object, if the optional value is not None
//  ************************************************************

fn set_optional<F: Into<JsValue>>(object: &JsValue, field: &str, value: Option<F>) {
    if let Some(v) = value {
        set_value(object, field, v);
    }
}


//  ************************************************************

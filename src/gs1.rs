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
//! GS1 element strings
//  ************************************************************
//!
//! Input looks like `[01]09501101530003[17]140704[10]AB-123`
//! (or with parentheses instead of brackets).
//! It is checked and flattened into AI digits and values,
//! with FNC1 separating a variable length value from the next AI.
//!
//! # References
//!
//! - GS1 General Specifications, section 7.8 (predefined length AIs)
//! - ISO/IEC 18004:2015 section 7.4.8

use crate::error::{Error, Result};


//  ************************************************************
/// Unit standing for FNC1 in GS1 data
//  ************************************************************
///
/// In Byte mode FNC1 is written as the GS control character,
/// so the same value serves both as unit and as byte.

pub const FNC1: u32 = 0x1D;

/// Longest value allowed after an AI
pub const MAX_VALUE_LEN: usize = 90;


//  ************************************************************
/// One application identifier with its value
//  ************************************************************

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub ai: String,
    pub value: String,
}


//  ************************************************************
/// AIs with a predefined total length (AI digits plus value), keyed by their first two digits
//  ************************************************************

#[rustfmt::skip]
const PREDEFINED_LENGTH: [(&str, usize, usize); 22] = [
    // (prefix, AI digits, total length)
    ("00", 2, 20), ("01", 2, 16), ("02", 2, 16), ("03", 2, 16), ("04", 2, 18),
    ("11", 2, 8), ("12", 2, 8), ("13", 2, 8), ("14", 2, 8), ("15", 2, 8), ("16", 2, 8), ("17", 2, 8),
    ("18", 2, 8), ("19", 2, 8), ("20", 2, 4),
    ("31", 4, 10), ("32", 4, 10), ("33", 4, 10), ("34", 4, 10), ("35", 4, 10), ("36", 4, 10),
    ("41", 3, 16),
];


//  ************************************************************
/// (AI digits, total length) if the AI has a predefined length
//  ************************************************************

fn predefined_length(ai: &str) -> Option<(usize, usize)> {
    PREDEFINED_LENGTH.iter().find(|(p, _, _)| ai.starts_with(p)).map(|&(_, digits, total)| (digits, total))
}


//  ************************************************************
/// True for the 82 characters GS1 allows in values
//  ************************************************************

fn is_gs1_char(c: u8) -> bool {
    match c {
        b'!' | b'"' | b'%' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b'-' | b'.' | b'/' => true,
        b'0'..=b'9' | b':' | b';' | b'<' | b'=' | b'>' | b'?' => true,
        b'A'..=b'Z' | b'_' | b'a'..=b'z' => true,
        _ => false,
    }
}


//  ************************************************************
/// GS1 modulo 10 check digit over `digits` (without the check digit)
//  ************************************************************

pub fn check_digit(digits: &[u8]) -> u8 {
    let mut sum = 0u32;
    for (i, &d) in digits.iter().rev().enumerate() {
        let w = if i % 2 == 0 { 3 } else { 1 };
        sum += w * (d - b'0') as u32;
    }
    ((10 - sum % 10) % 10) as u8 + b'0'
}


//  ************************************************************
/// Parse and verify a GS1 element string
//  ************************************************************

pub fn parse(input: &[u8], parenthesized: bool) -> Result<Vec<Element>> {
    let (open, close) = if parenthesized { (b'(', b')') } else { (b'[', b']') };
    if input.is_empty() {
        return Err(Error::Gs1Syntax("No input data".to_string()));
    }
    if input[0] != open {
        return Err(Error::Gs1Syntax("Data does not start with an AI".to_string()));
    }
    let mut elements = Vec::new();
    let mut i = 0;
    while i < input.len() {
        // input[i] == open here
        let ai_end = match input[i + 1..].iter().position(|&c| c == close) {
            Some(p) => i + 1 + p,
            None => return Err(Error::Gs1Syntax("Malformed AI, missing closing bracket".to_string())),
        };
        let ai = &input[i + 1..ai_end];
        if ai.len() < 2 || ai.len() > 4 || !ai.iter().all(|c| c.is_ascii_digit()) {
            return Err(Error::Gs1Syntax(format!("Invalid AI '{}'", String::from_utf8_lossy(ai))));
        }
        let value_end = input[ai_end + 1..].iter().position(|&c| c == open).map_or(input.len(), |p| ai_end + 1 + p);
        let value = &input[ai_end + 1..value_end];
        // ai and value are pure ASCII from here on
        let ai = String::from_utf8_lossy(ai).into_owned();
        verify_value(&ai, value, close)?;
        elements.push(Element { ai, value: String::from_utf8_lossy(value).into_owned() });
        i = value_end;
    }
    debug!("gs1::parse: {} elements", elements.len());
    Ok(elements)
}


//  ************************************************************
fn verify_value(ai: &str, value: &[u8], close: u8) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Gs1Syntax(format!("Empty data field for AI ({})", ai)));
    }
    if value.len() > MAX_VALUE_LEN {
        return Err(Error::Gs1Syntax(format!("Data field for AI ({}) too long", ai)));
    }
    if let Some(&c) = value.iter().find(|&&c| c == close || !is_gs1_char(c)) {
        return Err(Error::Gs1Syntax(format!("Invalid character '{}' in data field for AI ({})", c as char, ai)));
    }
    if let Some((digits, total)) = predefined_length(ai) {
        if ai.len() != digits {
            return Err(Error::Gs1Syntax(format!("Invalid AI ({})", ai)));
        }
        if ai.len() + value.len() != total {
            return Err(Error::Gs1Syntax(format!("Invalid data length for AI ({})", ai)));
        }
        if !value.iter().all(|c| c.is_ascii_digit()) {
            return Err(Error::Gs1Syntax(format!("Data field for AI ({}) must be numeric", ai)));
        }
    }
    let has_check_digit = match ai {
        "00" | "01" | "02" => true,
        _ => ai.len() == 3 && ai >= "410" && ai <= "417",
    };
    if has_check_digit {
        let (body, check) = value.split_at(value.len() - 1);
        let expected = check_digit(body);
        if check[0] != expected {
            return Err(Error::Gs1Syntax(format!(
                "Bad checksum '{}' in AI ({}), expected '{}'",
                check[0] as char, ai, expected as char
            )));
        }
    }
    Ok(())
}


//  ************************************************************
/// Flatten elements to units: AI digits, value, FNC1 after variable length values except the last
//  ************************************************************

pub fn to_units(elements: &[Element]) -> Vec<u32> {
    let mut units = Vec::new();
    for (n, e) in elements.iter().enumerate() {
        units.extend(e.ai.bytes().map(|b| b as u32));
        units.extend(e.value.bytes().map(|b| b as u32));
        if n + 1 < elements.len() && predefined_length(&e.ai).is_none() {
            units.push(FNC1);
        }
    }
    units
}


//  ************************************************************

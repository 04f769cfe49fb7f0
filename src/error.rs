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
//! Errors and warnings reported by the encoder
//  ************************************************************
//!
//! Errors abort the encoding; no partial symbol is ever returned.
//! Warnings accompany a finished symbol and are left to the caller to judge.

use thiserror::Error;


//  ************************************************************
/// Reasons an encoding request fails
//  ************************************************************

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A character cannot be represented in any permitted mode or character set
    #[error("Invalid character in input data: {0}")]
    InvalidCharacter(String),

    /// The data does not fit the largest allowed symbol
    #[error("Input too long, requires {required} codewords (maximum {maximum})")]
    TooLong { required: usize, maximum: usize },

    /// The option combination is not valid for the variant
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Malformed GS1 element string
    #[error("GS1 syntax error: {0}")]
    Gs1Syntax(String),
}


//  ************************************************************
/// Shorthand used by every stage of the pipeline
//  ************************************************************

pub type Result<T> = std::result::Result<T, Error>;


//  ************************************************************
/// Non fatal conditions attached to a finished symbol
//  ************************************************************

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Warning {
    /// No ECI was given, and the data needed one
    #[error("Non-compliant: ECI {eci} selected because ECI was not specified before converting to a region-specific encoding")]
    NonCompliant { eci: u32 },

    /// GS1 data carries an ECI designator
    #[error("Using ECI in GS1 mode is not supported by GS1 standards")]
    UsesEci,
}


//  ************************************************************

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

extern crate clap;
extern crate image;
extern crate qrfamily_wasm;

use clap::{App, Arg, Error, ErrorKind};
use qrfamily_wasm::{encode, logging, EccLevel, InputMode, Options, Symbol, Variant};
use std::io::{self, Write};


//  ************************************************************

const ABOUT: &str = "Encode data into a symbol of the QR Code family

The <DATA> provided is encoded into a QR Code, Micro QR Code, rMQR or UPNQR symbol.

By default the symbol is output as text to stdout.
By specifying --ansi the output to stdout uses ANSI escape codes on stdout.
By specifying --file <FILE> the output will be written to the <FILE> specified.
The file type (eg .png, or .jpg) determines the format of the <FILE>.
";


//  ************************************************************

const ARG_DEBUG: &str = "DEBUG";
const ARG_VARIANT: &str = "VARIANT";
const ARG_EC: &str = "EC";
const ARG_VERSION: &str = "VERSION";
const ARG_MASK: &str = "MASK";
const ARG_ECI: &str = "ECI";
const ARG_GS1: &str = "GS1";
const ARG_BINARY: &str = "BINARY";
const ARG_ANSI: &str = "ANSI";
const ARG_PPM: &str = "PPM";
const ARG_FILE: &str = "FILE";
const ARG_DATA: &str = "DATA";


//  ************************************************************

fn main() {
    let matches = App::new("QR Code family encoder")
        .version("0.1")
        .author("Henrik <henrik@kaarposoft.dk>")
        .about(ABOUT)
        .arg(
            Arg::with_name(ARG_DEBUG)
                .short("d")
                .long("debug")
                .help("Specify -d/--debug one or more times to increase debug level")
                .multiple(true),
        ).arg(
            Arg::with_name(ARG_VARIANT)
                .short("t")
                .long("type")
                .help("Symbol type")
                .value_name(ARG_VARIANT)
                .possible_values(&["qr", "micro", "rmqr", "upnqr"]),
        ).arg(
            Arg::with_name(ARG_VERSION)
                .short("v")
                .long("version")
                .help("Version [QR: 1-40, Micro QR: 1-4, rMQR: 1-32, or 33-38 for a fixed height]")
                .value_name(ARG_VERSION)
                .takes_value(true),
        ).arg(
            Arg::with_name(ARG_EC)
                .short("e")
                .long("error-correction-level")
                .help("Error correction level (chosen automatically if not given)")
                .value_name(ARG_EC)
                .possible_values(&["L", "l", "M", "m", "Q", "q", "H", "h"]),
        ).arg(
            Arg::with_name(ARG_MASK)
                .short("k")
                .long("mask")
                .help("Mask pattern number")
                .value_name(ARG_MASK)
                .takes_value(true),
        ).arg(
            Arg::with_name(ARG_ECI)
                .long("eci")
                .help("ECI designator for the character set")
                .value_name(ARG_ECI)
                .takes_value(true),
        ).arg(Arg::with_name(ARG_GS1).long("gs1").help("Data is a GS1 element string, [AI]value or (AI)value"))
        .arg(Arg::with_name(ARG_BINARY).short("b").long("binary").help("Encode data bytes as is").conflicts_with(ARG_GS1))
        .arg(Arg::with_name(ARG_ANSI).short("a").long("ansi").help("Output ansi control codes (when encoding to stdout)"))
        .arg(
            Arg::with_name(ARG_PPM)
                .short("p")
                .long("pixels-per-module")
                .help("Image pixels per module (when encoding to file) [possible values: 1-16]")
                .takes_value(true)
                .requires(ARG_FILE),
        ).arg(
            Arg::with_name(ARG_FILE)
                .short("f")
                .long("file")
                .help("File (path) to write the symbol image to")
                .value_name(ARG_FILE)
                .takes_value(true)
                .conflicts_with(ARG_ANSI),
        ).arg(Arg::with_name(ARG_DATA).value_name("DATA").help("Data to be encoded").required(true))
        .get_matches();

    let debug_level = matches.occurrences_of(ARG_DEBUG);
    logging::set_loglevel(debug_level as usize);

    let data = matches.value_of(ARG_DATA).unwrap_or_default();

    let variant = match matches.value_of(ARG_VARIANT) {
        Some("micro") => Variant::MicroQr,
        Some("rmqr") => Variant::Rmqr,
        Some("upnqr") => Variant::Upnqr,
        _ => Variant::Qr,
    };
    let mut options = Options::new(variant);

    options.ecc = match matches.value_of(ARG_EC) {
        Some("L") | Some("l") => Some(EccLevel::L),
        Some("M") | Some("m") => Some(EccLevel::M),
        Some("Q") | Some("q") => Some(EccLevel::Q),
        Some("H") | Some("h") => Some(EccLevel::H),
        _ => None,
    };
    options.version = matches.value_of(ARG_VERSION).map(|v| parse_or_exit(v, "invalid version"));
    options.mask = matches.value_of(ARG_MASK).map(|m| parse_or_exit(m, "invalid mask"));
    options.eci = matches.value_of(ARG_ECI).map(|e| parse_or_exit(e, "invalid ECI"));
    if matches.is_present(ARG_GS1) {
        options.input_mode = InputMode::Gs1 { parenthesized: data.starts_with('(') };
    } else if matches.is_present(ARG_BINARY) {
        options.input_mode = InputMode::Data;
    }

    let ppm = match matches.value_of(ARG_PPM) {
        Some(p) => {
            let p: usize = parse_or_exit(p, "invalid pixels-per-module [possible values 1-16]");
            if p < 1 || p > 16 {
                invalid_exit("pixels-per-module must be 1 to 16");
            }
            p
        }
        None => 4,
    };

    let symbol = match encode(data.as_bytes(), &options) {
        Ok(s) => s,
        Err(e) => invalid_exit(&e.to_string()),
    };
    for w in symbol.warnings.iter() {
        eprintln!("warning: {}", w);
    }
    eprintln!("{} {}x{} mask {}", symbol.version_name(), symbol.rows, symbol.width, symbol.mask);

    let border = variant.quiet_zone();
    let result = match matches.value_of(ARG_FILE) {
        None if matches.is_present(ARG_ANSI) => write_to_stdout_ansi(&symbol, border),
        None => write_to_stdout(&symbol),
        Some(f) => write_to_path(&symbol, border, ppm, f),
    };
    if let Err(e) = result {
        invalid_exit(&e);
    }
}


//  ************************************************************

fn write_to_stdout(symbol: &Symbol) -> Result<(), String> {
    let mut out = io::stdout();
    for row in 0..symbol.rows {
        let mut s = String::with_capacity(symbol.width + 1);
        for col in 0..symbol.width {
            s.push(if symbol.is_dark(row, col) { '@' } else { '.' });
        }
        s.push('\n');
        out.write_all(s.as_bytes()).map_err(|e| e.to_string())?;
    }
    Ok(())
}


//  ************************************************************

fn write_to_stdout_ansi(symbol: &Symbol, border: usize) -> Result<(), String> {
    let mut out = io::stdout();
    let border_lines = "\n".repeat(border / 2);
    out.write_all(border_lines.as_bytes()).map_err(|e| e.to_string())?;
    for row in 0..symbol.rows {
        let mut s = " ".repeat(border);
        for col in 0..symbol.width {
            if symbol.is_dark(row, col) {
                s.push_str("\x1B[40m  ");
            } else {
                s.push_str("\x1B[107m  ");
            }
        }
        s.push_str("\x1B[0m\n");
        out.write_all(s.as_bytes()).map_err(|e| e.to_string())?;
    }
    out.write_all(border_lines.as_bytes()).map_err(|e| e.to_string())
}


//  ************************************************************

fn write_to_path(symbol: &Symbol, border: usize, ppm: usize, path: &str) -> Result<(), String> {
    let dark = 48;
    let light = 240;
    let w = ppm * (symbol.width + 2 * border);
    let h = ppm * (symbol.rows + 2 * border);
    let mut img_data = vec![light; w * h];
    for row in 0..symbol.rows {
        for col in 0..symbol.width {
            if !symbol.is_dark(row, col) {
                continue;
            }
            for y in ppm * (row + border)..ppm * (row + border + 1) {
                for x in ppm * (col + border)..ppm * (col + border + 1) {
                    img_data[y * w + x] = dark;
                }
            }
        }
    }
    image::save_buffer(path, &img_data, w as u32, h as u32, image::ColorType::L8).map_err(|e| e.to_string())
}


//  ************************************************************

fn parse_or_exit<T: std::str::FromStr>(s: &str, msg: &str) -> T {
    match s.parse::<T>() {
        Ok(v) => v,
        Err(_) => invalid_exit(msg),
    }
}


//  ************************************************************

fn invalid_exit(msg: &str) -> ! {
    let err = Error::with_description(msg, ErrorKind::InvalidValue);
    err.exit()
}

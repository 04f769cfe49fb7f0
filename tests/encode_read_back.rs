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
//! Test encoding symbols and reading them back
//  ************************************************************

extern crate qrfamily_wasm;

use qrfamily_wasm::matrix::format_modules;
use qrfamily_wasm::prng::Rng;
use qrfamily_wasm::reedsolomon::encode_block;
use qrfamily_wasm::{encode, EccLevel, Error, InputMode, Mode, Options, Symbol, Variant, Warning};

mod common;
use common::{decode, deinterleave, plan_of, read_codewords};


//  ************************************************************
//  Helpers
//  ************************************************************

fn check_symbol(symbol: &Symbol) {
    let plan = plan_of(symbol);
    assert_eq!(symbol.modules.len(), symbol.rows * symbol.width);
    for (i, (data, ec)) in deinterleave(&read_codewords(symbol), &plan).iter().enumerate() {
        assert_eq!(&encode_block(data, ec.len()), ec, "{} BLOCK {} EC MISMATCH", symbol.version_name(), i);
    }
    for (row, col, dark) in format_modules(symbol.variant, symbol.version, symbol.ecc, symbol.mask) {
        assert_eq!(symbol.is_dark(row, col), dark, "{} FORMAT MODULE ({}, {})", symbol.version_name(), row, col);
    }
}

fn random_data(rng: &mut Rng, len: usize, modes: &[Mode]) -> Vec<u8> {
    let mut v = Vec::with_capacity(len);
    while v.len() < len {
        // runs of one mode, so the segmentation has something to do
        let mode = modes[rng.get_usize_clamped(0, modes.len())];
        for _ in 0..rng.get_usize_clamped(1, 12) {
            v.push(rng.get_unit_with_mode(mode) as u8);
        }
    }
    v.truncate(len);
    v
}

fn data_options(variant: Variant) -> Options {
    Options::new(variant).with_input_mode(InputMode::Data)
}

fn matrix_rows(symbol: &Symbol) -> Vec<String> {
    (0..symbol.rows).map(|r| (0..symbol.width).map(|c| if symbol.is_dark(r, c) { '#' } else { '.' }).collect()).collect()
}

fn assert_matrix(symbol: &Symbol, expected: &[&str]) {
    let rows = matrix_rows(symbol);
    assert_eq!(rows.len(), expected.len(), "{} ROWS", symbol.version_name());
    for (r, (got, want)) in rows.iter().zip(expected.iter()).enumerate() {
        assert_eq!(got.as_str(), *want, "{} ROW {}", symbol.version_name(), r);
    }
}


//  ************************************************************
//  QR Code
//  ************************************************************

#[test]
fn read_back_annex_i() {
    let symbol = encode(b"01234567", &Options::new(Variant::Qr).with_ecc(EccLevel::M)).unwrap();
    assert_eq!(symbol.version_name(), "1-M");
    #[rustfmt::skip]
    let expected = [
        0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11,
        0xA5, 0x24, 0xD4, 0xC1, 0xED, 0x36, 0xC7, 0x87, 0x2C, 0x55,
    ];
    assert_eq!(read_codewords(&symbol), expected.to_vec());
    check_symbol(&symbol);
}

#[test]
fn reference_matrix_annex_i() {
    // ISO/IEC 18004 Annex I with mask 0, module by module
    let symbol = encode(b"01234567", &Options::new(Variant::Qr).with_ecc(EccLevel::M).with_mask(0)).unwrap();
    #[rustfmt::skip]
    let expected = [
        "#######...###.#######",
        "#.....#.###...#.....#",
        "#.###.#..##...#.###.#",
        "#.###.#..#.##.#.###.#",
        "#.###.#.##.##.#.###.#",
        "#.....#....#..#.....#",
        "#######.#.#.#.#######",
        ".....................",
        "#.#.#.#...#.#...#..#.",
        "##.#....#.##.#.#...#.",
        "...##.###.##.###.###.",
        "##..##.#.#.###.##..#.",
        "..#..###.###.###....#",
        "........#.#...#....#.",
        "#######.....#...#...#",
        "#.....#...#...#..#.##",
        "#.###.#.###.#.#.###.#",
        "#.###.#..#.#.#.#.###.",
        "#.###.#.##.#.###..#.#",
        "#.....#....###.###...",
        "#######.#..#.###..#.#",
    ];
    assert_matrix(&symbol, &expected);
}

#[test]
fn read_back_qr_random() {
    let mut rng = Rng::new(0x5EED_0001);
    let eccs = [EccLevel::L, EccLevel::M, EccLevel::Q, EccLevel::H];
    for _ in 0..40 {
        let len = rng.get_usize_clamped(1, 400);
        let data = random_data(&mut rng, len, &[Mode::Numeric, Mode::Alphanumeric, Mode::Byte]);
        let ecc = eccs[rng.get_usize_clamped(0, 4)];
        let symbol = encode(&data, &data_options(Variant::Qr).with_ecc(ecc)).unwrap();
        check_symbol(&symbol);
        assert_eq!(decode(&symbol).bytes, data, "{} ROUND TRIP", symbol.version_name());
    }
}

#[test]
fn read_back_qr_large_versions() {
    let mut rng = Rng::new(0x5EED_0002);
    for &len in [1000, 1800, 2900].iter() {
        let data = random_data(&mut rng, len, &[Mode::Alphanumeric, Mode::Byte]);
        let symbol = encode(&data, &data_options(Variant::Qr).with_ecc(EccLevel::L)).unwrap();
        assert!(symbol.version >= 7, "VERSION INFORMATION NOT EXERCISED");
        check_symbol(&symbol);
        assert_eq!(decode(&symbol).bytes, data);
    }
}

#[test]
fn read_back_mask_consistency() {
    let options = Options::new(Variant::Qr).with_ecc(EccLevel::Q);
    let auto = encode(b"MASK CONSISTENCY 123", &options).unwrap();
    let codewords = read_codewords(&auto);
    for mask in 0..8 {
        let forced = encode(b"MASK CONSISTENCY 123", &options.clone().with_mask(mask)).unwrap();
        assert_eq!(read_codewords(&forced), codewords, "MASK {} CHANGED THE DATA", mask);
        check_symbol(&forced);
        if mask == auto.mask {
            assert_eq!(forced, auto);
        }
    }
}

#[test]
fn read_back_eci_utf8() {
    let symbol = encode("Ωmega".as_bytes(), &Options::new(Variant::Qr)).unwrap();
    assert_eq!(symbol.eci, Some(26));
    assert_eq!(symbol.warnings, vec![Warning::NonCompliant { eci: 26 }]);
    let decoded = decode(&symbol);
    assert_eq!(decoded.eci, Some(26));
    assert_eq!(decoded.bytes, "Ωmega".as_bytes().to_vec());
}

#[test]
fn read_back_kanji() {
    let options = data_options(Variant::Qr).with_full_multibyte(true);
    let symbol = encode(&[0x93, 0x5F, 0xE4, 0xAA], &options).unwrap();
    let decoded = decode(&symbol);
    assert_eq!(decoded.modes, vec![Mode::Kanji]);
    assert_eq!(decoded.bytes, vec![0x93, 0x5F, 0xE4, 0xAA]);
    // without full multibyte the same bytes go in Byte mode
    let symbol = encode(&[0x93, 0x5F, 0xE4, 0xAA], &data_options(Variant::Qr)).unwrap();
    assert_eq!(decode(&symbol).modes, vec![Mode::Byte]);
}

#[test]
fn read_back_structured_append() {
    let symbol = encode(b"PART TWO", &Options::new(Variant::Qr).with_structured_append(2, 3, 77)).unwrap();
    let decoded = decode(&symbol);
    assert_eq!(decoded.structured_append, Some((2, 3, 77)));
    assert_eq!(decoded.bytes, b"PART TWO".to_vec());
}

#[test]
fn read_back_gs1() {
    let gs1 = Options::new(Variant::Qr).with_input_mode(InputMode::Gs1 { parenthesized: false });
    let symbol = encode(b"[01]09501101530003[3103]000123", &gs1).unwrap();
    let decoded = decode(&symbol);
    assert!(decoded.gs1, "FNC1 FIRST POSITION MISSING");
    assert_eq!(decoded.bytes, b"01095011015300033103000123".to_vec());

    // a variable length value is followed by FNC1, written as '%' in Alphanumeric mode
    let symbol = encode(b"[10]ABC123[11]991231", &gs1).unwrap();
    let bytes: Vec<u8> = decode(&symbol).bytes.iter().map(|&b| if b == b'%' { 0x1D } else { b }).collect();
    assert_eq!(bytes, b"10ABC123\x1D11991231".to_vec());
}


//  ************************************************************
//  Micro QR Code, rMQR, UPNQR
//  ************************************************************

#[test]
fn read_back_micro() {
    let mut rng = Rng::new(0x5EED_0003);
    let mut seen = [false; 4];
    for _ in 0..60 {
        let len = rng.get_usize_clamped(1, 13);
        let data = random_data(&mut rng, len, &[Mode::Numeric, Mode::Alphanumeric, Mode::Byte]);
        let symbol = encode(&data, &data_options(Variant::MicroQr)).unwrap();
        seen[symbol.version as usize - 1] = true;
        assert!(symbol.mask < 4);
        check_symbol(&symbol);
        assert_eq!(decode(&symbol).bytes, data, "{} ROUND TRIP", symbol.version_name());
    }
    for &(text, name) in [(&b"12345"[..], "M1-L"), (&b"1234567890"[..], "M2-L"), (&b"HELLO WORLD"[..], "M3-L")].iter() {
        let symbol = encode(text, &Options::new(Variant::MicroQr).with_ecc(EccLevel::L)).unwrap();
        assert_eq!(symbol.version_name(), name);
        check_symbol(&symbol);
        assert_eq!(decode(&symbol).bytes, text.to_vec());
    }
    assert!(seen.iter().any(|&s| s), "NO MICRO SYMBOLS");
}

#[test]
fn read_back_rmqr_all_versions() {
    for version in 1..=32 {
        for &ecc in [EccLevel::M, EccLevel::H].iter() {
            let options = Options::new(Variant::Rmqr).with_version(version).with_ecc(ecc);
            let symbol = encode(b"12345", &options).unwrap();
            assert_eq!(symbol.version, version);
            assert_eq!(symbol.mask, 0);
            check_symbol(&symbol);
            assert_eq!(decode(&symbol).bytes, b"12345".to_vec(), "{} ROUND TRIP", symbol.version_name());
        }
    }
}

#[test]
fn read_back_rmqr_fixed_height() {
    let mut rng = Rng::new(0x5EED_0004);
    let data = random_data(&mut rng, 60, &[Mode::Alphanumeric]);
    for height_version in 33..=38 {
        let symbol = encode(&data, &Options::new(Variant::Rmqr).with_version(height_version)).unwrap();
        assert_eq!(symbol.rows, 7 + 2 * (height_version as usize - 33));
        check_symbol(&symbol);
        assert_eq!(decode(&symbol).bytes, data);
    }
}

#[test]
fn reference_matrix_micro_m2() {
    let symbol = encode(b"01234567", &Options::new(Variant::MicroQr).with_version(2).with_ecc(EccLevel::L)).unwrap();
    assert_eq!(symbol.mask, 1);
    #[rustfmt::skip]
    let expected = [
        "#######.#.#.#",
        "#.....#.###.#",
        "#.###.#..##.#",
        "#.###.#..####",
        "#.###.#.###..",
        "#.....#.#...#",
        "#######..####",
        ".........##..",
        "##.#....#...#",
        ".##.#.#.#.#.#",
        "###..#######.",
        "...#.#....##.",
        "###.#..##.###",
    ];
    assert_matrix(&symbol, &expected);
}

#[test]
fn reference_matrix_rmqr_r7x43() {
    let symbol = encode(b"123", &Options::new(Variant::Rmqr).with_version(1).with_ecc(EccLevel::M)).unwrap();
    assert_eq!(symbol.version_name(), "R7x43-M");
    #[rustfmt::skip]
    let expected = [
        "#######.#.#.#.#.#.#.#.#.#.#.#.#.#.#.#.#.###",
        "#.....#..#.######.##..##.###....##.##...#.#",
        "#.###.#.#.##...####...####.###..#.#########",
        "#.###.#..##....###.#......#.#...##....#...#",
        "#.###.#...#.##.......#..##.##.###..#..#.#.#",
        "#.....#.###.###.###.##..#...##.#.#.##.#...#",
        "#######.#.#.#.#.#.#.#.#.#.#.#.#.#.#.#.#####",
    ];
    assert_matrix(&symbol, &expected);
}

#[test]
fn read_back_upnqr() {
    let text = "UPNQR\nPlačilo položnice\nŠtevilka 12345";
    let symbol = encode(text.as_bytes(), &Options::new(Variant::Upnqr)).unwrap();
    assert_eq!(symbol.version_name(), "15-M");
    check_symbol(&symbol);
    let decoded = decode(&symbol);
    assert_eq!(decoded.eci, Some(4));
    assert_eq!(decoded.modes, vec![Mode::Byte]);
    assert_eq!(decoded.bytes.len(), text.chars().count());
    assert_eq!(decoded.bytes[9], 0xE8, "č NOT IN ISO-8859-2");
}


//  ************************************************************
//  Capacity limits and errors
//  ************************************************************

fn too_long(result: Result<Symbol, Error>) -> (usize, usize) {
    match result {
        Err(Error::TooLong { required, maximum }) => (required, maximum),
        Err(e) => panic!("EXPECTED TooLong, GOT {}", e),
        Ok(s) => panic!("EXPECTED TooLong, GOT {}", s.version_name()),
    }
}

#[test]
fn capacity_limits() {
    let qr = Options::new(Variant::Qr).with_ecc(EccLevel::L);
    assert_eq!(encode(&[b'9'; 7089], &qr).unwrap().version_name(), "40-L");
    assert_eq!(too_long(encode(&[b'9'; 7090], &qr)), (2957, 2956));

    let micro = Options::new(Variant::MicroQr).with_ecc(EccLevel::L);
    assert_eq!(encode(&[b'9'; 35], &micro).unwrap().version_name(), "M4-L");
    assert_eq!(too_long(encode(&[b'9'; 36], &micro)), (17, 16));

    let rmqr = Options::new(Variant::Rmqr).with_ecc(EccLevel::M);
    assert_eq!(encode(&[b'9'; 361], &rmqr).unwrap().version_name(), "R17x139-M");
    assert_eq!(too_long(encode(&[b'9'; 362], &rmqr)).1, 152);

    let upnqr = Options::new(Variant::Upnqr);
    assert!(encode(&[b'a'; 411], &upnqr).is_ok());
    assert_eq!(too_long(encode(&[b'a'; 412], &upnqr)), (416, 415));
}

#[test]
fn invalid_characters() {
    let r = encode(b"ABC", &Options::new(Variant::MicroQr).with_version(1));
    assert!(matches!(r, Err(Error::InvalidCharacter(_))), "M1 ACCEPTED LETTERS");
    let r = encode("Ω".as_bytes(), &Options::new(Variant::MicroQr));
    assert!(matches!(r, Err(Error::InvalidCharacter(_))), "MICRO QR ACCEPTED UTF-8 WITHOUT ECI");
    let r = encode("€".as_bytes(), &Options::new(Variant::Upnqr));
    assert!(matches!(r, Err(Error::InvalidCharacter(_))), "UPNQR ACCEPTED €");
    let r = encode("x".as_bytes(), &Options::new(Variant::Qr).with_input_mode(InputMode::Gs1 { parenthesized: false }));
    assert!(matches!(r, Err(Error::Gs1Syntax(_))), "GS1 ACCEPTED DATA WITHOUT AI");
}

#[test]
fn empty_input() {
    for &variant in [Variant::Qr, Variant::MicroQr, Variant::Rmqr].iter() {
        let symbol = encode(b"", &Options::new(variant)).unwrap();
        check_symbol(&symbol);
        assert!(decode(&symbol).bytes.is_empty());
    }
}

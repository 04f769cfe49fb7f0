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
//! Minimal bindings for the browser `console`
//  ************************************************************
//!
//! The encoder never touches the DOM, so the only Web API needed
//! is the console used by the logging macros when running as wasm.
//! Pulling in all of `web-sys` for three functions is not worth it.
//!
//  ************************************************************


//  ************************************************************
//  console
//  ************************************************************
///
/// The `console` object provides access to the browser's debugging console.
///
/// * <https://developer.mozilla.org/en-US/docs/Web/API/Console>
/// * <https://console.spec.whatwg.org/>
///
//  ************************************************************

pub mod console {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {

        #[wasm_bindgen(js_namespace = console, js_name = error)]
        pub fn error_with_str(s: &str);

        #[wasm_bindgen(js_namespace = console, js_name = log)]
        pub fn log_with_str(s: &str);

        #[wasm_bindgen(js_namespace = console, js_name = warn)]
        pub fn warn_with_str(s: &str);
    }
}

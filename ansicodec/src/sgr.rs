//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Select Graphic Rendition interpreter.
//!
//! Folds the parameter list of one `ESC [ … m` sequence into an
//! [`AnsiState`]. Interpretation never fails: anything that is not a
//! recognized, well-formed parameter is skipped.

use crate::consts::ESC;
use crate::{AnsiState, Attributes, Color};

/// Fold the parameters of one SGR sequence into `prev`.
///
/// `params` is the text between `ESC [` and `m`, e.g. `b"1;38;5;208"`.
/// `None` for `prev` starts from the default state.
///
/// | Code            | Effect                                      |
/// |-----------------|---------------------------------------------|
/// | `0` or empty    | Reset everything                            |
/// | `1`-`9`         | Set bold, dim, italic, underline, blink (`5`, `6`), reverse, concealed, strikethrough |
/// | `22`-`29`       | Clear the matching attribute, `22` clears bold and dim |
/// | `30`-`37`       | Foreground palette 0-7                      |
/// | `90`-`97`       | Foreground palette 8-15                     |
/// | `38;5;n`        | Foreground palette `n`                      |
/// | `38;2;r;g;b`    | Foreground RGB                              |
/// | `39`            | Default foreground                          |
/// | `40`-`49`, `100`-`107`, `48;…` | Same for the background      |
///
/// # Examples
///
/// ```
/// use tintline_ansicodec::{interpret, Attributes, Color};
///
/// let state = interpret(b"1;38;5;208", None);
/// assert_eq!(state.fg, Color::Fixed(208));
/// assert_eq!(state.attr, Attributes::BOLD);
///
/// let state = interpret(b"22;44", Some(&state));
/// assert_eq!(state.attr, Attributes::empty());
/// assert_eq!(state.bg, Color::Fixed(4));
/// ```
pub fn interpret(params: &[u8], prev: Option<&AnsiState>) -> AnsiState {
    let mut state = prev.copied().unwrap_or_default();
    let mut params = params.split(|&b| b == b';').map(parse_parameter);

    while let Some(param) = params.next() {
        let Some(code) = param else {
            continue;
        };
        match code {
            0 => {
                state.fg = Color::Default;
                state.bg = Color::Default;
                state.attr = Attributes::empty();
                state.bg_explicit_default = true;
            }
            1..=9 => {
                if let Some(flag) = Attributes::from_set_code(code) {
                    state.attr.insert(flag);
                }
            }
            22..=29 => {
                if let Some(flags) = Attributes::from_clear_code(code) {
                    state.attr.remove(flags);
                }
            }
            30..=37 => state.fg = Color::Fixed((code - 30) as u8),
            90..=97 => state.fg = Color::Fixed((code - 90 + 8) as u8),
            39 => state.fg = Color::Default,
            40..=47 => set_background(&mut state, Color::Fixed((code - 40) as u8)),
            100..=107 => set_background(&mut state, Color::Fixed((code - 100 + 8) as u8)),
            49 => set_background(&mut state, Color::Default),
            38 => {
                if let Some(color) = extended_color(&mut params) {
                    state.fg = color;
                }
            }
            48 => {
                if let Some(color) = extended_color(&mut params) {
                    set_background(&mut state, color);
                }
            }
            _ => {}
        }
    }
    state
}

/// Fold a complete sequence such as `b"\x1b[1;31m"` into `prev`.
///
/// Returns `prev` (or the default state) unchanged when `sequence` is not an
/// SGR sequence.
pub fn interpret_sequence(sequence: &[u8], prev: Option<&AnsiState>) -> AnsiState {
    match sgr_parameters(sequence) {
        Some(params) => interpret(params, prev),
        None => prev.copied().unwrap_or_default(),
    }
}

/// The parameter bytes of an `ESC [ … m` sequence.
fn sgr_parameters(sequence: &[u8]) -> Option<&[u8]> {
    match sequence {
        [ESC, b'[', params @ .., b'm'] => Some(params),
        _ => None,
    }
}

fn set_background(state: &mut AnsiState, color: Color) {
    state.bg = color;
    state.bg_explicit_default = true;
}

/// Consume the selector and arguments following `38` or `48`.
///
/// `5;n` selects a palette entry and `2;r;g;b` an RGB color. Any other
/// selector is consumed alone. A group that runs out of parameters, or holds
/// an unparsable or out of range value, yields `None`.
fn extended_color<I>(params: &mut I) -> Option<Color>
where
    I: Iterator<Item = Option<u16>>,
{
    match params.next()?? {
        5 => {
            let index = params.next()??;
            Some(Color::Fixed(u8::try_from(index).ok()?))
        }
        2 => {
            // Always take all three components so a bad one doesn't leak
            // the rest into the main loop.
            let r = params.next()?;
            let g = params.next()?;
            let b = params.next()?;
            Some(Color::RGB(component(r)?, component(g)?, component(b)?))
        }
        _ => None,
    }
}

fn component(value: Option<u16>) -> Option<u8> {
    u8::try_from(value?).ok()
}

/// Decimal value of one parameter. Empty means `0`; anything else that
/// isn't a base ten number fitting in a `u16` is `None`.
fn parse_parameter(bytes: &[u8]) -> Option<u16> {
    bytes.iter().try_fold(0u16, |value, &b| {
        if b.is_ascii_digit() {
            value.checked_mul(10)?.checked_add((b - b'0') as u16)
        } else {
            None
        }
    })
}

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

use crate::{AnsiCodecResult, ColorMode};
use bitflags::bitflags;
use bytes::BufMut;
use std::fmt::Write;
use std::hash::{Hash, Hasher};

/// The effective colors and attributes at a point in a colored stream.
///
/// `AnsiState` is a small `Copy` value. Every SGR sequence folded into it
/// by [`interpret`](crate::interpret) produces a new state; the previous one
/// is left untouched, so the caller decides what gets carried forward.
///
/// # Equality
///
/// Two states are equal when they render identically: same foreground, same
/// background, same attributes. `bg_explicit_default` records whether a
/// sequence ever addressed the background, and is left out of
/// equality, hashing, [`is_default`](Self::is_default) and serialization.
///
/// # ANSI Escape Codes
///
/// [`to_ansi_string`](Self::to_ansi_string) produces one canonical sequence:
///
/// - Attributes first, ascending: `1` bold, `2` dim, `3` italic,
///   `4` underline, `5` blink, `7` reverse, `8` concealed, `9` strikethrough
/// - Then the foreground: `30-37`, `90-97`, `38;5;<n>`, `38;2;<r>;<g>;<b>` or `39`
/// - Then the background: `40-47`, `100-107`, `48;5;<n>`, `48;2;<r>;<g>;<b>` or `49`
///
/// Both channels are always present. A default state serializes to `""`.
///
/// # Examples
///
/// ```rust
/// use tintline_ansicodec::{AnsiState, Attributes, Color};
///
/// let state = AnsiState {
///     fg: Color::Fixed(1),
///     attr: Attributes::BOLD,
///     ..Default::default()
/// };
/// assert_eq!(state.to_ansi_string(), "\x1b[1;31;49m");
/// assert_eq!(AnsiState::default().to_ansi_string(), "");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct AnsiState {
    /// Foreground color.
    pub fg: Color,
    /// Background color.
    pub bg: Color,
    /// Text attributes.
    pub attr: Attributes,
    /// Set once any sequence has assigned the background, including a reset.
    pub bg_explicit_default: bool,
}

impl AnsiState {
    /// Returns `true` when this state renders as plain terminal text.
    pub fn is_default(&self) -> bool {
        self.fg == Color::Default && self.bg == Color::Default && self.attr.is_empty()
    }

    /// Render the canonical SGR sequence into a new string.
    pub fn to_ansi_string(&self) -> String {
        let mut output = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_str(&mut output);
        output
    }

    /// Write the canonical, lossless SGR sequence.
    pub fn write_str<W: Write>(&self, writer: &mut W) -> std::fmt::Result {
        self.write_codes(writer, self.fg, self.bg)
    }

    /// Write the SGR sequence for a terminal limited to `color_mode`.
    ///
    /// Colors deeper than the mode allows are downsampled with
    /// [`Color::to_basic`] or [`Color::to_fixed`]. [`ColorMode::None`]
    /// writes nothing.
    pub fn write_with_mode<W: Write>(
        &self,
        writer: &mut W,
        color_mode: ColorMode,
    ) -> std::fmt::Result {
        match color_mode {
            ColorMode::None => Ok(()),
            ColorMode::Basic => self.write_codes(writer, self.fg.to_basic(), self.bg.to_basic()),
            ColorMode::FixedColor => {
                self.write_codes(writer, self.fg.to_fixed(), self.bg.to_fixed())
            }
            ColorMode::TrueColor => self.write_str(writer),
        }
    }

    /// Append the SGR sequence for `color_mode` to a byte buffer and return
    /// the number of bytes written.
    pub fn encode<T: BufMut>(&self, dst: &mut T, color_mode: ColorMode) -> AnsiCodecResult<usize> {
        let mut sequence = String::new();
        self.write_with_mode(&mut sequence, color_mode)?;
        dst.put_slice(sequence.as_bytes());
        Ok(sequence.len())
    }

    fn write_codes<W: Write>(&self, writer: &mut W, fg: Color, bg: Color) -> std::fmt::Result {
        if self.is_default() {
            return Ok(());
        }
        writer.write_str("\x1b[")?;
        for (flag, code) in ATTRIBUTE_CODES {
            if self.attr.contains(flag) {
                write!(writer, "{code};")?;
            }
        }
        fg.write_channel(writer, 30)?;
        writer.write_char(';')?;
        bg.write_channel(writer, 40)?;
        writer.write_char('m')
    }
}

impl PartialEq for AnsiState {
    fn eq(&self, other: &Self) -> bool {
        self.fg == other.fg && self.bg == other.bg && self.attr == other.attr
    }
}

impl Eq for AnsiState {}

impl Hash for AnsiState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fg.hash(state);
        self.bg.hash(state);
        self.attr.hash(state);
    }
}

impl std::fmt::Display for AnsiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        AnsiState::write_str(self, f)
    }
}

bitflags! {
    /// SGR text attributes.
    ///
    /// Declared in the order of their SGR codes, which is also the order
    /// they serialize in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attributes: u8 {
        /// Bold / increased intensity (`1`).
        const BOLD          = 1 << 0;
        /// Dim / decreased intensity (`2`).
        const DIM           = 1 << 1;
        /// Italic (`3`).
        const ITALIC        = 1 << 2;
        /// Single underline (`4`).
        const UNDERLINE     = 1 << 3;
        /// Blink, slow or rapid (`5`, `6`).
        const BLINK         = 1 << 4;
        /// Reverse video (`7`).
        const REVERSE       = 1 << 5;
        /// Concealed / hidden (`8`).
        const CONCEALED     = 1 << 6;
        /// Crossed out (`9`).
        const STRIKETHROUGH = 1 << 7;
    }
}

/// Each attribute and the code it serializes as.
const ATTRIBUTE_CODES: [(Attributes, u8); 8] = [
    (Attributes::BOLD, 1),
    (Attributes::DIM, 2),
    (Attributes::ITALIC, 3),
    (Attributes::UNDERLINE, 4),
    (Attributes::BLINK, 5),
    (Attributes::REVERSE, 7),
    (Attributes::CONCEALED, 8),
    (Attributes::STRIKETHROUGH, 9),
];

impl Attributes {
    /// The attribute set by SGR `code`, for codes `1` through `9`.
    pub fn from_set_code(code: u16) -> Option<Attributes> {
        match code {
            1 => Some(Attributes::BOLD),
            2 => Some(Attributes::DIM),
            3 => Some(Attributes::ITALIC),
            4 => Some(Attributes::UNDERLINE),
            5 | 6 => Some(Attributes::BLINK),
            7 => Some(Attributes::REVERSE),
            8 => Some(Attributes::CONCEALED),
            9 => Some(Attributes::STRIKETHROUGH),
            _ => None,
        }
    }

    /// The attributes cleared by SGR `code`, for codes `22` through `29`.
    ///
    /// `22` is "normal intensity" and clears both bold and dim. `26` is
    /// reserved and clears nothing.
    pub fn from_clear_code(code: u16) -> Option<Attributes> {
        match code {
            22 => Some(Attributes::BOLD | Attributes::DIM),
            23 => Some(Attributes::ITALIC),
            24 => Some(Attributes::UNDERLINE),
            25 => Some(Attributes::BLINK),
            27 => Some(Attributes::REVERSE),
            28 => Some(Attributes::CONCEALED),
            29 => Some(Attributes::STRIKETHROUGH),
            _ => None,
        }
    }
}

/// A terminal color for either channel.
///
/// # 256-Color Palette Structure
///
/// The palette addressed by [`Fixed`](Color::Fixed) is structured as:
///
/// - **0-7**: Standard colors (`30-37` / `40-47`)
/// - **8-15**: Bright colors (`90-97` / `100-107`)
/// - **16-231**: 6×6×6 RGB cube, `16 + 36×r + 6×g + b` where r, g, b ∈ [0, 5]
/// - **232-255**: Grayscale ramp (24 shades from dark to light)
///
/// # Examples
///
/// ```
/// use tintline_ansicodec::Color;
///
/// let true_color = Color::RGB(255, 0, 0);
/// assert_eq!(true_color.to_fixed(), Color::Fixed(196));
/// assert_eq!(true_color.to_basic(), Color::Fixed(1));
/// assert_eq!(Color::Fixed(1).to_truecolor(), Color::RGB(205, 0, 0));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub enum Color {
    /// The terminal's own default color (`39` / `49`).
    #[default]
    Default,

    /// A color number from 0 to 255, for use in 256-color terminal environments.
    ///
    /// - Colours 0 to 7 are the basic colors set by `30-37`. These can usually be
    ///   changed in the terminal emulator.
    /// - Colours 8 to 15 are their bright versions, set by `90-97`.
    /// - Colours 16 to 231 form a six by six by six color cube.
    /// - Colours 232 to 255 are shades of gray from black to white.
    Fixed(u8),

    /// A 24-bit RGB color, as specified by ISO-8613-3.
    RGB(u8, u8, u8),
}

impl Color {
    /// Converts this color to its nearest equivalent in the basic 16-color palette.
    ///
    /// - [`Default`](Color::Default) and palette colors 0-15 are returned unchanged
    /// - Palette colors 16-255 and [`RGB`](Color::RGB) colors map to the basic
    ///   color whose hue dominates, bright when the perceived brightness is high
    pub fn to_basic(&self) -> Color {
        match *self {
            Color::Default => Color::Default,
            Color::Fixed(n) if n < 16 => Color::Fixed(n),
            Color::Fixed(n) => {
                let (r, g, b) = palette_rgb(n);
                Color::Fixed(Self::rgb_to_basic_index(r, g, b))
            }
            Color::RGB(r, g, b) => Color::Fixed(Self::rgb_to_basic_index(r, g, b)),
        }
    }

    /// Converts this color to the 256-color fixed palette format.
    ///
    /// RGB colors map to the nearest cube or grayscale ramp entry.
    pub fn to_fixed(&self) -> Color {
        match *self {
            Color::Default => Color::Default,
            Color::Fixed(n) => Color::Fixed(n),
            Color::RGB(r, g, b) => Color::Fixed(Self::rgb_to_fixed_index(r, g, b)),
        }
    }

    /// Converts this color to 24-bit RGB, using xterm's default palette for
    /// the first 16 colors. [`Default`](Color::Default) has no RGB value and
    /// is returned unchanged.
    pub fn to_truecolor(&self) -> Color {
        match *self {
            Color::Default => Color::Default,
            Color::Fixed(n) => {
                let (r, g, b) = palette_rgb(n);
                Color::RGB(r, g, b)
            }
            Color::RGB(r, g, b) => Color::RGB(r, g, b),
        }
    }

    /// Write this color's SGR code group. `base` is 30 for the foreground
    /// and 40 for the background.
    fn write_channel<W: Write>(&self, writer: &mut W, base: u8) -> std::fmt::Result {
        match *self {
            Color::Default => write!(writer, "{}", base + 9),
            Color::Fixed(n) if n < 8 => write!(writer, "{}", base + n),
            Color::Fixed(n) if n < 16 => write!(writer, "{}", base + 60 + n - 8),
            Color::Fixed(n) => write!(writer, "{};5;{}", base + 8, n),
            Color::RGB(r, g, b) => write!(writer, "{};2;{};{};{}", base + 8, r, g, b),
        }
    }

    /// Palette index 0-15 of the basic color closest to an RGB value.
    fn rgb_to_basic_index(r: u8, g: u8, b: u8) -> u8 {
        // Perceived brightness
        let brightness = (r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);

        // Saturation below 25% reads as gray.
        if (max as u32 - min as u32) * 4 < max as u32 || max == 0 {
            return if brightness > 127 {
                15
            } else if brightness > 64 {
                7
            } else if brightness > 32 {
                8
            } else {
                0
            };
        }

        let bright = if brightness > 127 { 8 } else { 0 };
        let hue = if r > g && r > b {
            1
        } else if g > r && g > b {
            2
        } else if b > r && b > g {
            4
        } else if r > 0 && g > 0 && b == min {
            3
        } else if r > 0 && b > 0 && g == min {
            5
        } else if g > 0 && b > 0 && r == min {
            6
        } else {
            return if bright > 0 { 15 } else { 0 };
        };
        hue + bright
    }

    /// Palette index 16-255 closest to an RGB value.
    ///
    /// Picks the nearer of the closest cube entry and the closest gray ramp
    /// entry, by squared distance against [`palette_rgb`]. Ties go to the cube.
    fn rgb_to_fixed_index(r: u8, g: u8, b: u8) -> u8 {
        // Cube levels are multiples of 51.
        let level = |c: u8| (c as u16 + 25) / 51;
        let cube = (16 + 36 * level(r) + 6 * level(g) + level(b)) as u8;

        // Ramp entry k is 8 + 10k, for k in 0..24.
        let mean = (r as u16 + g as u16 + b as u16) / 3;
        let step = (mean.saturating_sub(3) / 10).min(23);
        let gray = (232 + step) as u8;

        if distance(palette_rgb(gray), (r, g, b)) < distance(palette_rgb(cube), (r, g, b)) {
            gray
        } else {
            cube
        }
    }
}

fn distance((r1, g1, b1): (u8, u8, u8), (r2, g2, b2): (u8, u8, u8)) -> u32 {
    let dr = r1.abs_diff(r2) as u32;
    let dg = g1.abs_diff(g2) as u32;
    let db = b1.abs_diff(b2) as u32;
    dr * dr + dg * dg + db * db
}

/// RGB value of a palette entry.
fn palette_rgb(n: u8) -> (u8, u8, u8) {
    const BASIC: [(u8, u8, u8); 16] = [
        (0, 0, 0),
        (205, 0, 0),
        (0, 205, 0),
        (205, 205, 0),
        (0, 0, 238),
        (205, 0, 205),
        (0, 205, 205),
        (229, 229, 229),
        (127, 127, 127),
        (255, 0, 0),
        (0, 255, 0),
        (255, 255, 0),
        (92, 92, 255),
        (255, 0, 255),
        (0, 255, 255),
        (255, 255, 255),
    ];
    match n {
        0..=15 => BASIC[n as usize],
        16..=231 => {
            let idx = n as u16 - 16;
            let r = ((idx / 36) * 51) as u8;
            let g = (((idx % 36) / 6) * 51) as u8;
            let b = ((idx % 6) * 51) as u8;
            (r, g, b)
        }
        _ => {
            let gray = ((n as u16 - 232) * 10 + 8) as u8;
            (gray, gray, gray)
        }
    }
}

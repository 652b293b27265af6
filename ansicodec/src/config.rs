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

use crate::consts::MAX_LINE_LENGTH;

/// Settings for the line codec and for re-rendering extracted text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AnsiConfig {
    /// SGR color depth used when serializing color state.
    pub color_mode: ColorMode,
    /// Longest line, in bytes and excluding the newline, the codec will buffer.
    pub max_line_length: usize,
    /// What the codec does with a line longer than `max_line_length`.
    pub overlong_lines: OverlongLines,
}

impl AnsiConfig {
    /// Strip all color, emitting plain text only.
    pub fn strip_all() -> AnsiConfig {
        AnsiConfig {
            color_mode: ColorMode::None,
            max_line_length: MAX_LINE_LENGTH,
            overlong_lines: OverlongLines::Skip,
        }
    }
    /// Downsample every color to the 16 color palette.
    pub fn basic_color_only() -> AnsiConfig {
        AnsiConfig {
            color_mode: ColorMode::Basic,
            max_line_length: MAX_LINE_LENGTH,
            overlong_lines: OverlongLines::Skip,
        }
    }
    /// Downsample truecolor to the 256 color palette.
    pub fn fixed_color_only() -> AnsiConfig {
        AnsiConfig {
            color_mode: ColorMode::FixedColor,
            max_line_length: MAX_LINE_LENGTH,
            overlong_lines: OverlongLines::Skip,
        }
    }
    /// Keep every color as parsed.
    pub fn true_color_only() -> AnsiConfig {
        AnsiConfig {
            color_mode: ColorMode::TrueColor,
            max_line_length: MAX_LINE_LENGTH,
            overlong_lines: OverlongLines::Skip,
        }
    }
    /// Lossless output, the same as [`true_color_only`](Self::true_color_only).
    pub fn enabled() -> AnsiConfig {
        Self::true_color_only()
    }
    /// Use the color mode detected from the process environment.
    pub fn from_env() -> AnsiConfig {
        AnsiConfig {
            color_mode: ColorMode::detect(),
            max_line_length: MAX_LINE_LENGTH,
            overlong_lines: OverlongLines::Skip,
        }
    }

    /// Replace the line length limit.
    pub fn with_max_line_length(mut self, max_line_length: usize) -> AnsiConfig {
        self.max_line_length = max_line_length;
        self
    }

    /// Replace the overlong line policy.
    pub fn with_overlong_lines(mut self, overlong_lines: OverlongLines) -> AnsiConfig {
        self.overlong_lines = overlong_lines;
        self
    }
}

impl Default for AnsiConfig {
    fn default() -> Self {
        Self::enabled()
    }
}

/// How the line codec treats a line that exceeds the length limit.
///
/// Either way the line is discarded up to and including its newline, and
/// decoding resumes with the next line.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum OverlongLines {
    /// Log a warning and continue with the next line.
    #[default]
    Skip,
    /// Return [`AnsiCodecError::LineTooLong`](crate::AnsiCodecError::LineTooLong).
    ///
    /// `FramedRead` ends the stream after a decoder error, so this suits
    /// callers that drive the codec directly.
    Error,
}

/// Represents the color capabilities of a terminal.
///
/// `ColorMode` selects how much of a color state survives serialization.
/// Colors parsed at a higher depth than the mode allows are downsampled;
/// attributes are kept in every mode except [`ColorMode::None`].
///
/// - **None**: No ANSI codes are generated, resulting in plain text output
/// - **Basic**: 4-bit color supporting 16 colors (8 basic + 8 bright variants)
/// - **FixedColor**: 8-bit color supporting 256 colors
/// - **TrueColor**: 24-bit RGB color supporting 16.7 million colors
///
/// # Examples
///
/// ```
/// use tintline_ansicodec::ColorMode;
///
/// assert_eq!(
///     ColorMode::from_env_values(None, Some("truecolor"), Some("xterm")),
///     ColorMode::TrueColor
/// );
/// assert_eq!(
///     ColorMode::from_env_values(Some("1"), Some("truecolor"), None),
///     ColorMode::None
/// );
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// No ANSI color codes are generated.
    ///
    /// Use this mode when writing to files or pipes, or when `NO_COLOR` is set.
    None,

    /// 4-bit color mode supporting 16 colors.
    Basic,

    /// 8-bit color mode supporting 256 colors.
    ///
    /// This mode includes the 16 basic colors plus a 216-color RGB cube and a
    /// 24-shade grayscale ramp.
    FixedColor,

    /// 24-bit true color mode. Serialization is lossless.
    #[default]
    TrueColor,
}

impl ColorMode {
    /// Returns `true` if this color mode supports ANSI escape codes.
    ///
    /// ```
    /// use tintline_ansicodec::ColorMode;
    ///
    /// assert!(!ColorMode::None.is_ansi());
    /// assert!(ColorMode::Basic.is_ansi());
    /// ```
    pub fn is_ansi(&self) -> bool {
        match self {
            ColorMode::None => false,
            ColorMode::Basic | ColorMode::FixedColor | ColorMode::TrueColor => true,
        }
    }

    /// Returns `true` if this color mode is [`ColorMode::TrueColor`].
    pub fn is_true_color(&self) -> bool {
        matches!(self, ColorMode::TrueColor)
    }

    /// Detect the color mode from `NO_COLOR`, `COLORTERM` and `TERM`.
    pub fn detect() -> ColorMode {
        let no_color = std::env::var("NO_COLOR").ok();
        let colorterm = std::env::var("COLORTERM").ok();
        let term = std::env::var("TERM").ok();
        Self::from_env_values(no_color.as_deref(), colorterm.as_deref(), term.as_deref())
    }

    /// Decide the color mode from already read environment values.
    ///
    /// - `NO_COLOR` set to anything non-empty disables color.
    /// - `COLORTERM` containing `truecolor` or `24bit` selects truecolor.
    /// - `TERM` of `dumb` disables color, `TERM` containing `256` selects the
    ///   256 color palette.
    /// - Everything else gets the 16 color palette.
    pub fn from_env_values(
        no_color: Option<&str>,
        colorterm: Option<&str>,
        term: Option<&str>,
    ) -> ColorMode {
        if no_color.is_some_and(|value| !value.is_empty()) {
            return ColorMode::None;
        }
        if let Some(colorterm) = colorterm {
            if colorterm.contains("truecolor") || colorterm.contains("24bit") {
                return ColorMode::TrueColor;
            }
        }
        match term {
            Some("dumb") => ColorMode::None,
            Some(term) if term.contains("256") => ColorMode::FixedColor,
            _ => ColorMode::Basic,
        }
    }
}

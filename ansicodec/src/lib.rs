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

//! Escape sequence scanning and color extraction for terminal text.
//!
//! - [`next_sequence`] / [`AnsiSequences`] locate escape and control sequences
//! - [`interpret`] folds one SGR parameter list into an [`AnsiState`]
//! - [`extract_color`] strips sequences and describes the colors of the
//!   remaining text as [`ColorSpan`]s, carrying state from call to call
//! - [`ColorLineCodec`] does the same over a newline delimited byte stream

mod codec;
mod config;
pub mod consts;
mod extract;
mod result;
mod scanner;
mod sgr;
mod strip;
mod style;

pub use self::codec::ColorLineCodec;
pub use self::config::{AnsiConfig, ColorMode, OverlongLines};
pub use self::extract::{
    ColorContext, ColorSpan, Extraction, extract_color, extract_color_into, for_each_fragment,
};
pub use self::result::{AnsiCodecError, AnsiCodecResult};
pub use self::scanner::{AnsiMatch, AnsiSequences, SequenceKind, next_sequence};
pub use self::sgr::{interpret, interpret_sequence};
pub use self::strip::strip_ansi_codes;
pub use self::style::{AnsiState, Attributes, Color};

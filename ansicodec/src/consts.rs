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

/// Bell, terminates an OSC sequence.
pub const BEL: u8 = 0x07;
/// Backspace, second half of an overstrike erase pair.
pub const BS: u8 = 0x08;
/// Line feed. Never part of a generic escape or backspace pair.
pub const LF: u8 = 0x0A;
/// Shift Out.
pub const SO: u8 = 0x0E;
/// Shift In.
pub const SI: u8 = 0x0F;
/// Escape, introduces every multi-byte sequence.
pub const ESC: u8 = 0x1B;

/// The canonical SGR reset sequence.
pub const SGR_RESET: &str = "\x1b[0m";

/// Initial span capacity reserved by the extractor.
///
/// Colored listings rarely carry more than a few dozen color changes per
/// line, so this avoids regrowth in the common case.
pub const INITIAL_SPAN_CAPACITY: usize = 32;

/// Default upper bound on a single line accepted by the line codec.
///
/// Lines longer than this without a newline are dropped rather than
/// buffered without limit.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

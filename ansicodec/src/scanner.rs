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

//! Single pass scanner for ANSI escape and control sequences.
//!
//! The scanner recognizes exactly the sequences matched by the grammar
//!
//! ```text
//! \x1b[\[()][0-9;]*[a-zA-Z@]                  CSI and charset designation
//! | \x1b\][0-9];[[:print:]]+(?:\x1b\\|\x07)    OSC
//! | \x1b.                                     generic two character escape
//! | [\x0e\x0f]                                shift out / shift in
//! | .\x08                                     backspace overstrike
//! ```
//!
//! with leftmost-first semantics, where `.` is one valid UTF-8 code point
//! other than `\n`, or a single byte that does not begin a valid code point.
//! It does so without backtracking or allocation.

use crate::consts::{BEL, BS, ESC, LF, SI, SO};
use std::ops::Range;

/// The kind of sequence recognized by [`next_sequence`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    /// `ESC [ <digits and semicolons> <final>`.
    ///
    /// SGR sequences are the control sequences whose final byte is `m`.
    ControlSequence {
        /// The terminating byte, an ASCII letter or `@`.
        final_byte: u8,
    },
    /// `ESC (` or `ESC )` followed by the same parameter grammar as CSI,
    /// e.g. `ESC ( B` to select the US-ASCII character set.
    CharsetDesignation,
    /// `ESC ] <digit> ; <printable> (ESC \ | BEL)`.
    OperatingSystemCommand,
    /// `ESC` followed by any single character except a line feed.
    Escape,
    /// A bare Shift Out (`0x0E`) or Shift In (`0x0F`).
    ShiftControl,
    /// Any character except a line feed followed by a backspace.
    BackspaceErase,
}

/// A recognized sequence: its byte range in the scanned input and its kind.
///
/// `start < end` always holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnsiMatch {
    /// Offset of the first byte of the sequence.
    pub start: usize,
    /// Offset one past the last byte of the sequence.
    pub end: usize,
    /// What was matched.
    pub kind: SequenceKind,
}

impl AnsiMatch {
    fn new(start: usize, end: usize, kind: SequenceKind) -> Self {
        debug_assert!(start < end);
        Self { start, end, kind }
    }

    /// The matched byte range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Number of bytes matched.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Shift both offsets forward by `offset`.
    pub fn offset_by(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
            kind: self.kind,
        }
    }

    /// Returns `true` for a Select Graphic Rendition sequence (`ESC [ … m`).
    pub fn is_sgr(&self) -> bool {
        matches!(self.kind, SequenceKind::ControlSequence { final_byte: b'm' })
    }

    /// Returns the parameter bytes of an SGR sequence, the part between
    /// `ESC [` and `m`, or `None` when this match is not SGR.
    ///
    /// `input` must be the slice this match was produced from.
    pub fn sgr_parameters<'a>(&self, input: &'a [u8]) -> Option<&'a [u8]> {
        if self.is_sgr() {
            Some(&input[self.start + 2..self.end - 1])
        } else {
            None
        }
    }
}

/// Find the first recognized sequence in `input`.
///
/// Returns `None` when the remainder of the input holds no complete
/// sequence. Incomplete sequences at the end of input are not matched; an
/// `ESC [` that is never terminated degrades to a two byte generic escape.
///
/// # Examples
///
/// ```
/// use tintline_ansicodec::{next_sequence, SequenceKind};
///
/// let found = next_sequence(b"hello \x1b[1mworld").unwrap();
/// assert_eq!(found.range(), 6..10);
/// assert_eq!(found.kind, SequenceKind::ControlSequence { final_byte: b'm' });
///
/// assert_eq!(next_sequence(b"plain text"), None);
/// ```
pub fn next_sequence(input: &[u8]) -> Option<AnsiMatch> {
    // Nothing can match before the first interesting byte. A backspace at
    // offset zero cannot match either, but the loop below handles that.
    let mut i = input
        .iter()
        .position(|&b| matches!(b, ESC | BS | SO | SI))?;

    while i < input.len() {
        match input[i] {
            BS => {
                if i > 0 && input[i - 1] != LF {
                    let width = last_char_width(&input[..i]);
                    return Some(AnsiMatch::new(
                        i - width,
                        i + 1,
                        SequenceKind::BackspaceErase,
                    ));
                }
            }
            ESC => {
                if let Some(found) = match_escape(&input[i..]) {
                    return Some(found.offset_by(i));
                }
            }
            SO | SI => return Some(AnsiMatch::new(i, i + 1, SequenceKind::ShiftControl)),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Match the alternatives that start with `ESC`, in grammar order.
/// `input[0]` is `ESC`.
fn match_escape(input: &[u8]) -> Option<AnsiMatch> {
    let len = input.len();

    if len > 2 && is_control_sequence_start(input[1]) {
        if let Some(end) = match_control_sequence(input) {
            let kind = if input[1] == b'[' {
                SequenceKind::ControlSequence {
                    final_byte: input[end - 1],
                }
            } else {
                SequenceKind::CharsetDesignation
            };
            return Some(AnsiMatch::new(0, end, kind));
        }
    }

    if len > 5
        && input[1] == b']'
        && input[2].is_ascii_digit()
        && input[3] == b';'
        && is_print(input[4])
    {
        if let Some(end) = match_operating_system_command(input) {
            return Some(AnsiMatch::new(0, end, SequenceKind::OperatingSystemCommand));
        }
    }

    if len > 1 && input[1] != LF {
        let width = first_char_width(&input[1..]);
        return Some(AnsiMatch::new(0, 1 + width, SequenceKind::Escape));
    }

    None
}

/// `[0-9;]*[a-zA-Z@]` after the two byte prefix. Returns the end offset.
fn match_control_sequence(input: &[u8]) -> Option<usize> {
    let mut i = 2;
    while i < input.len() && (input[i].is_ascii_digit() || input[i] == b';') {
        i += 1;
    }
    match input.get(i) {
        Some(&b) if b.is_ascii_alphabetic() || b == b'@' => Some(i + 1),
        _ => None,
    }
}

/// `[[:print:]]*(?:ESC \ | BEL)` after the five byte prefix, whose last byte
/// is already known to be printable. Returns the end offset.
fn match_operating_system_command(input: &[u8]) -> Option<usize> {
    let mut i = 5;
    while i < input.len() && is_print(input[i]) {
        i += 1;
    }
    match input.get(i) {
        Some(&BEL) => Some(i + 1),
        Some(&ESC) if input.get(i + 1) == Some(&b'\\') => Some(i + 2),
        _ => None,
    }
}

fn is_control_sequence_start(b: u8) -> bool {
    matches!(b, b'[' | b'(' | b')')
}

fn is_print(b: u8) -> bool {
    (0x20..=0x7E).contains(&b)
}

/// Width in bytes of the character starting `bytes`, which must not be
/// empty: the encoded length of a valid code point, or 1 for a byte that
/// does not begin one.
pub(crate) fn first_char_width(bytes: &[u8]) -> usize {
    if bytes[0] < 0x80 {
        return 1;
    }
    let window = &bytes[..bytes.len().min(4)];
    let valid = match std::str::from_utf8(window) {
        Ok(text) => text,
        // `valid_up_to` is a char boundary, so this cannot fail.
        Err(error) => std::str::from_utf8(&window[..error.valid_up_to()]).unwrap_or_default(),
    };
    valid.chars().next().map_or(1, char::len_utf8)
}

/// Width in bytes of the character ending `bytes`, which must not be empty:
/// the encoded length of a valid code point that ends exactly at the end of
/// the slice, or 1 otherwise.
pub(crate) fn last_char_width(bytes: &[u8]) -> usize {
    let len = bytes.len();
    if bytes[len - 1] < 0x80 {
        return 1;
    }
    for width in 1..=len.min(4) {
        let candidate = &bytes[len - width..];
        if !is_continuation(candidate[0]) {
            return match std::str::from_utf8(candidate) {
                Ok(text) if text.chars().count() == 1 => width,
                _ => 1,
            };
        }
    }
    1
}

fn is_continuation(b: u8) -> bool {
    b & 0xC0 == 0x80
}

/// Iterator over every sequence in a byte slice, in order.
///
/// Each match is found by scanning the remainder after the previous match,
/// so the sequence of matches is the same as repeatedly calling
/// [`next_sequence`] on the unconsumed suffix. Offsets are relative to the
/// full input.
///
/// # Examples
///
/// ```
/// use tintline_ansicodec::AnsiSequences;
///
/// let input = b"\x1b[1mbold\x1b[0m plain\x1b7";
/// let ranges: Vec<_> = AnsiSequences::new(input).map(|m| m.range()).collect();
/// assert_eq!(ranges, vec![0..4, 8..12, 18..20]);
/// ```
#[derive(Clone, Debug)]
pub struct AnsiSequences<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> AnsiSequences<'a> {
    /// Scan `input` from the beginning.
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }

    /// Offset just past the last match returned, or 0 before the first.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Iterator for AnsiSequences<'_> {
    type Item = AnsiMatch;

    fn next(&mut self) -> Option<Self::Item> {
        let found = next_sequence(&self.input[self.offset..])?.offset_by(self.offset);
        self.offset = found.end;
        Some(found)
    }
}

impl std::iter::FusedIterator for AnsiSequences<'_> {}

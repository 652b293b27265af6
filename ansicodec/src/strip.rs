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

use crate::AnsiSequences;
use std::borrow::Cow;

/// Removes ANSI escape sequences from a string.
///
/// Every sequence the [scanner](crate::next_sequence) recognizes is removed:
/// CSI and SGR sequences, charset designations, OSC commands, two character
/// escapes, shift controls and backspace overstrikes. Colors are discarded;
/// use [`extract_color`](crate::extract_color) to keep them.
///
/// # Performance
///
/// If no sequence is found the input is returned borrowed (zero-copy).
/// Otherwise a new `String` is allocated with the sequences removed.
///
/// # Examples
///
/// ```
/// use std::borrow::Cow;
/// # use tintline_ansicodec::strip_ansi_codes;
///
/// let colored = "\x1b[1;31mRed Text\x1b[0m";
/// assert_eq!(strip_ansi_codes(colored), "Red Text");
///
/// let plain = "Plain Text";
/// assert!(matches!(strip_ansi_codes(plain), Cow::Borrowed(_)));
///
/// let titled = "\x1b]0;window title\x07prompt$ ";
/// assert_eq!(strip_ansi_codes(titled), "prompt$ ");
/// ```
pub fn strip_ansi_codes(str: &str) -> Cow<'_, str> {
    let mut sequences = AnsiSequences::new(str.as_bytes());
    let Some(first) = sequences.next() else {
        return Cow::Borrowed(str);
    };

    let mut result = String::with_capacity(str.len());
    result.push_str(&str[..first.start]);
    let mut cursor = first.end;
    for found in sequences {
        result.push_str(&str[cursor..found.start]);
        cursor = found.end;
    }
    result.push_str(&str[cursor..]);
    Cow::Owned(result)
}

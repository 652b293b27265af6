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

//! Error types for the ansicodec crate.
//!
//! Scanning, interpretation and extraction never fail: malformed input is
//! simply not a match, or an ignored parameter. Errors only arise at the
//! I/O edge, in the line codec and the byte encoders.

/// Result type alias for operations that may fail with an [`AnsiCodecError`].
pub type AnsiCodecResult<T> = Result<T, AnsiCodecError>;

/// Errors raised while framing or writing colored text.
#[derive(Debug, thiserror::Error)]
pub enum AnsiCodecError {
    /// Underlying transport error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line grew past the configured limit before a newline arrived.
    ///
    /// Only raised under [`OverlongLines::Error`](crate::OverlongLines::Error).
    /// The codec discards input up to the next newline after reporting this.
    #[error("line exceeds maximum of {max} bytes ({length} bytes read without a newline)")]
    LineTooLong {
        /// Bytes of the line searched before giving up
        length: usize,
        /// The configured maximum
        max: usize,
    },

    /// A formatter rejected the output.
    #[error("formatting error")]
    Format(#[from] std::fmt::Error),
}

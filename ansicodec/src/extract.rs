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

//! Color extraction: plain text plus colored spans.
//!
//! Extraction removes every recognized sequence from the input, folds the
//! SGR ones into a running [`AnsiState`], and describes the colors of the
//! resulting plain text as a list of spans. The state at the end of one
//! call is meant to be passed into the next, so a color set on one line
//! keeps applying to the lines that follow until reset.

use crate::consts::{INITIAL_SPAN_CAPACITY, SGR_RESET};
use crate::{AnsiSequences, AnsiState, ColorMode, interpret};
use std::fmt::Write;
use std::ops::{ControlFlow, Range};

/// A run of plain text drawn in one non-default color state.
///
/// Offsets are byte offsets into [`Extraction::text`], half open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorSpan {
    /// First byte of the run.
    pub start: usize,
    /// One past the last byte of the run.
    pub end: usize,
    /// The state the run is drawn in. Never the default state.
    pub color: AnsiState,
}

impl ColorSpan {
    /// The covered byte range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Covered length in bytes, always greater than zero.
    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

/// The result of extracting one input.
///
/// Spans are sorted, non-overlapping, never empty and never carry the
/// default state. Consecutive text drawn in the same rendition is always a
/// single span.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extraction {
    /// The input with every recognized sequence removed.
    pub text: String,
    /// Colored runs over `text`.
    pub spans: Vec<ColorSpan>,
    /// The state in effect after the last byte of input.
    pub state: AnsiState,
}

impl Extraction {
    /// The plain text covered by `span`.
    pub fn fragment(&self, span: &ColorSpan) -> &str {
        &self.text[span.range()]
    }

    /// Render the text back into escaped form.
    ///
    /// Each span is written as its serialized state, its text and a reset,
    /// so every colored run stands on its own. Uncolored text is written as
    /// is. Under [`ColorMode::None`] only the plain text is written.
    pub fn render(&self, color_mode: ColorMode) -> String {
        let mut output = String::with_capacity(self.text.len() + self.spans.len() * 16);
        // Writing into a String cannot fail.
        let _ = self.render_into(&mut output, color_mode);
        output
    }

    /// [`render`](Self::render) into any writer.
    pub fn render_into<W: Write>(&self, writer: &mut W, color_mode: ColorMode) -> std::fmt::Result {
        let mut cursor = 0;
        for span in &self.spans {
            writer.write_str(&self.text[cursor..span.start])?;
            span.color.write_with_mode(writer, color_mode)?;
            writer.write_str(self.fragment(span))?;
            if color_mode.is_ansi() {
                writer.write_str(SGR_RESET)?;
            }
            cursor = span.end;
        }
        writer.write_str(&self.text[cursor..])
    }
}

/// Extract `input`, starting from `state` (the default state when `None`).
///
/// # Examples
///
/// ```
/// use tintline_ansicodec::{extract_color, Attributes, Color};
///
/// let extraction = extract_color("hello \x1b[34;45;1mworld", None);
/// assert_eq!(extraction.text, "hello world");
/// assert_eq!(extraction.spans.len(), 1);
///
/// let span = extraction.spans[0];
/// assert_eq!(span.range(), 6..11);
/// assert_eq!(span.color.fg, Color::Fixed(4));
/// assert_eq!(span.color.bg, Color::Fixed(5));
/// assert_eq!(span.color.attr, Attributes::BOLD);
/// ```
pub fn extract_color(input: &str, state: Option<AnsiState>) -> Extraction {
    let mut text = String::with_capacity(input.len());
    let mut spans = Vec::new();
    let state = extract_color_into(input, state, &mut text, &mut spans);
    Extraction { text, spans, state }
}

/// Extract `input` into caller owned buffers, which are cleared first, and
/// return the final state.
///
/// Reusing the same buffers across calls avoids an allocation per line.
pub fn extract_color_into(
    input: &str,
    state: Option<AnsiState>,
    text: &mut String,
    spans: &mut Vec<ColorSpan>,
) -> AnsiState {
    text.clear();
    spans.clear();

    let bytes = input.as_bytes();
    let mut builder = SpanBuilder::new(spans, state.unwrap_or_default());
    let mut cursor = 0;
    for found in AnsiSequences::new(bytes) {
        text.push_str(&input[cursor..found.start]);
        if let Some(params) = found.sgr_parameters(bytes) {
            let next = interpret(params, Some(&builder.state));
            builder.transition(next, text.len());
        }
        cursor = found.end;
    }
    text.push_str(&input[cursor..]);
    builder.finish(text.len())
}

/// Walk the plain text fragments of `input` with the state in effect for
/// each, without allocating.
///
/// Fragments are the non-empty runs of text between sequences; two
/// neighbours may share a state when only a non-SGR sequence separated them.
/// The walk stops early when `visitor` returns [`ControlFlow::Break`].
/// Returns the state in effect where the walk ended.
///
/// ```
/// use std::ops::ControlFlow;
/// use tintline_ansicodec::for_each_fragment;
///
/// let mut plain = Vec::new();
/// for_each_fragment("a\x1b[1mb\x1b[0mc", None, |fragment, state| {
///     if state.is_default() {
///         plain.push(fragment.to_string());
///     }
///     ControlFlow::Continue(())
/// });
/// assert_eq!(plain, ["a", "c"]);
/// ```
pub fn for_each_fragment<F>(input: &str, state: Option<AnsiState>, mut visitor: F) -> AnsiState
where
    F: FnMut(&str, &AnsiState) -> ControlFlow<()>,
{
    let bytes = input.as_bytes();
    let mut state = state.unwrap_or_default();
    let mut cursor = 0;
    for found in AnsiSequences::new(bytes) {
        if cursor < found.start && visitor(&input[cursor..found.start], &state).is_break() {
            return state;
        }
        if let Some(params) = found.sgr_parameters(bytes) {
            state = interpret(params, Some(&state));
        }
        cursor = found.end;
    }
    if cursor < input.len() {
        let _ = visitor(&input[cursor..], &state);
    }
    state
}

/// Tracks the open span while extraction advances through the input.
struct SpanBuilder<'a> {
    spans: &'a mut Vec<ColorSpan>,
    state: AnsiState,
    open: Option<usize>,
}

impl<'a> SpanBuilder<'a> {
    fn new(spans: &'a mut Vec<ColorSpan>, state: AnsiState) -> Self {
        let open = (!state.is_default()).then_some(0);
        Self { spans, state, open }
    }

    /// Move to `next` with `at` bytes of plain text emitted so far.
    fn transition(&mut self, next: AnsiState, at: usize) {
        if next == self.state {
            // Same rendition, but keep the newer background flag.
            self.state = next;
            return;
        }
        self.close(at);
        self.state = next;
        if next.is_default() {
            return;
        }
        let reopen = self
            .spans
            .last()
            .filter(|last| last.end == at && last.color == next)
            .map(|last| last.start);
        match reopen {
            Some(start) => {
                self.spans.pop();
                self.open = Some(start);
            }
            None => self.open = Some(at),
        }
    }

    fn close(&mut self, at: usize) {
        if let Some(start) = self.open.take() {
            if start < at {
                if self.spans.capacity() == 0 {
                    self.spans.reserve(INITIAL_SPAN_CAPACITY);
                }
                self.spans.push(ColorSpan {
                    start,
                    end: at,
                    color: self.state,
                });
            }
        }
    }

    fn finish(mut self, at: usize) -> AnsiState {
        self.close(at);
        self.state
    }
}

/// Owns the color state carried across the inputs of one logical stream.
///
/// ```
/// use tintline_ansicodec::ColorContext;
///
/// let mut context = ColorContext::new();
/// let first = context.extract("\x1b[31mred");
/// let second = context.extract("still red\x1b[0m");
/// assert_eq!(first.spans[0].color, second.spans[0].color);
/// assert!(context.state().is_default());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ColorContext {
    state: AnsiState,
}

impl ColorContext {
    /// Start from the default state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a previously saved state.
    pub fn with_state(state: AnsiState) -> Self {
        Self { state }
    }

    /// The state that the next input starts in.
    pub fn state(&self) -> AnsiState {
        self.state
    }

    /// Forget the carried state.
    pub fn reset(&mut self) {
        self.state = AnsiState::default();
    }

    /// Extract the next input of the stream.
    pub fn extract(&mut self, input: &str) -> Extraction {
        let extraction = extract_color(input, Some(self.state));
        self.state = extraction.state;
        extraction
    }

    /// Extract the next input of the stream into reusable buffers.
    pub fn extract_into(&mut self, input: &str, text: &mut String, spans: &mut Vec<ColorSpan>) {
        self.state = extract_color_into(input, Some(self.state), text, spans);
    }
}

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

use crate::{
    AnsiCodecError, AnsiCodecResult, AnsiConfig, AnsiState, ColorContext, Extraction, OverlongLines,
};
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{instrument, trace, warn};

/// Line codec that extracts colors from newline delimited text.
///
/// Each decoded frame is one line, without its `\n` or `\r\n`, run through
/// [`extract_color`](crate::extract_color). The color state left at the end
/// of a line carries into the next, the way a terminal would draw it.
/// Invalid UTF-8 is replaced with `U+FFFD`. Lines longer than
/// [`AnsiConfig::max_line_length`] are dropped according to
/// [`AnsiConfig::overlong_lines`].
///
/// Encoding renders an [`Extraction`] back to escaped text under the
/// configured [`ColorMode`](crate::ColorMode), followed by `\n`.
#[derive(Debug)]
pub struct ColorLineCodec {
    config: AnsiConfig,
    context: ColorContext,
    /// Bytes of the buffered partial line already searched for a newline.
    next_index: usize,
    /// Set on an overlong line until the next newline is consumed.
    discarding: bool,
    skipped_lines: u64,
}

impl ColorLineCodec {
    /// Creates a new line codec with the given configuration.
    pub fn new(config: AnsiConfig) -> Self {
        Self {
            config,
            context: ColorContext::new(),
            next_index: 0,
            discarding: false,
            skipped_lines: 0,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &AnsiConfig {
        &self.config
    }

    /// The color state the next decoded line starts in.
    pub fn state(&self) -> AnsiState {
        self.context.state()
    }

    /// Number of lines dropped for exceeding the length limit.
    pub fn skipped_lines(&self) -> u64 {
        self.skipped_lines
    }

    /// Forget the carried color state.
    pub fn reset(&mut self) {
        self.context.reset();
    }

    fn extract_line(&mut self, line: &[u8]) -> Extraction {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let text = String::from_utf8_lossy(line);
        let extraction = self.context.extract(&text);
        trace!(
            bytes = line.len(),
            spans = extraction.spans.len(),
            "decoded line"
        );
        extraction
    }
}

impl Default for ColorLineCodec {
    fn default() -> Self {
        Self::new(AnsiConfig::default())
    }
}

impl Decoder for ColorLineCodec {
    type Item = Extraction;
    type Error = AnsiCodecError;

    #[instrument(skip_all, fields(buffered = src.len()))]
    fn decode(&mut self, src: &mut BytesMut) -> AnsiCodecResult<Option<Self::Item>> {
        let max = self.config.max_line_length;
        loop {
            // Never look further than one byte past the limit.
            let read_to = src.len().min(max.saturating_add(1));
            let newline = src[self.next_index..read_to]
                .iter()
                .position(|&b| b == b'\n')
                .map(|offset| offset + self.next_index);

            match (self.discarding, newline) {
                (true, Some(offset)) => {
                    src.advance(offset + 1);
                    self.discarding = false;
                    self.next_index = 0;
                    trace!("resynchronized after overlong line");
                }
                (true, None) => {
                    src.advance(read_to);
                    self.next_index = 0;
                    if src.is_empty() {
                        return Ok(None);
                    }
                }
                (false, Some(offset)) => {
                    let line = src.split_to(offset + 1);
                    self.next_index = 0;
                    return Ok(Some(self.extract_line(&line[..offset])));
                }
                (false, None) if src.len() > max => {
                    self.discarding = true;
                    self.next_index = 0;
                    // Only `read_to` bytes were searched; later lines may be buffered.
                    warn!(length = read_to, max, "line exceeds maximum length");
                    self.skipped_lines += 1;
                    if self.config.overlong_lines == OverlongLines::Error {
                        return Err(AnsiCodecError::LineTooLong {
                            length: read_to,
                            max,
                        });
                    }
                }
                (false, None) => {
                    self.next_index = read_to;
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> AnsiCodecResult<Option<Self::Item>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let line = src.split_to(src.len());
        self.next_index = 0;
        Ok(Some(self.extract_line(&line)))
    }
}

impl Encoder<&Extraction> for ColorLineCodec {
    type Error = AnsiCodecError;

    fn encode(&mut self, item: &Extraction, dst: &mut BytesMut) -> AnsiCodecResult<()> {
        let rendered = item.render(self.config.color_mode);
        dst.reserve(rendered.len() + 1);
        dst.put_slice(rendered.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}

impl Encoder<Extraction> for ColorLineCodec {
    type Error = AnsiCodecError;

    fn encode(&mut self, item: Extraction, dst: &mut BytesMut) -> AnsiCodecResult<()> {
        <Self as Encoder<&Extraction>>::encode(self, &item, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attributes, Color, ColorMode};

    fn codec(max_line_length: usize) -> ColorLineCodec {
        ColorLineCodec::new(AnsiConfig::enabled().with_max_line_length(max_line_length))
    }

    fn strict_codec(max_line_length: usize) -> ColorLineCodec {
        ColorLineCodec::new(
            AnsiConfig::enabled()
                .with_max_line_length(max_line_length)
                .with_overlong_lines(OverlongLines::Error),
        )
    }

    #[test]
    fn test_decode_lines_carry_color() {
        let mut codec = ColorLineCodec::default();
        let mut src = BytesMut::from(&b"plain\n\x1b[31mred\ncontinued\x1b[0m\nafter\n"[..]);

        let first = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(first.text, "plain");
        assert!(first.spans.is_empty());

        let second = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(second.text, "red");
        assert_eq!(second.spans[0].color.fg, Color::Fixed(1));

        let third = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(third.text, "continued");
        assert_eq!(third.spans.len(), 1);
        assert_eq!(third.spans[0].range(), 0..9);

        let fourth = codec.decode(&mut src).unwrap().unwrap();
        assert!(fourth.spans.is_empty());

        assert!(codec.decode(&mut src).unwrap().is_none());
        assert!(src.is_empty());
    }

    #[test]
    fn test_decode_crlf() {
        let mut codec = ColorLineCodec::default();
        let mut src = BytesMut::from(&b"\x1b[1mbold\r\n"[..]);
        let line = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(line.text, "bold");
        assert_eq!(line.state.attr, Attributes::BOLD);
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = ColorLineCodec::default();
        let mut src = BytesMut::from(&b"\x1b[3"[..]);
        assert!(codec.decode(&mut src).unwrap().is_none());
        src.extend_from_slice(b"2mgreen\n");
        let line = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(line.text, "green");
        assert_eq!(line.spans[0].color.fg, Color::Fixed(2));
    }

    #[test]
    fn test_decode_eof_flushes_last_line() {
        let mut codec = ColorLineCodec::default();
        let mut src = BytesMut::from(&b"one\ntwo"[..]);
        assert_eq!(codec.decode_eof(&mut src).unwrap().unwrap().text, "one");
        assert_eq!(codec.decode_eof(&mut src).unwrap().unwrap().text, "two");
        assert!(codec.decode_eof(&mut src).unwrap().is_none());
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let mut codec = ColorLineCodec::default();
        let mut src = BytesMut::from(&b"a\xffb\n"[..]);
        let line = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(line.text, "a\u{FFFD}b");
    }

    #[test]
    fn test_overlong_line_is_skipped() {
        let mut codec = codec(8);
        let mut src = BytesMut::from(&b"0123456789abc\nnext\n"[..]);

        let line = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(line.text, "next");
        assert_eq!(codec.skipped_lines(), 1);
        assert!(src.is_empty());
    }

    #[test]
    fn test_overlong_unterminated_line_at_eof() {
        let mut codec = codec(4);
        let mut src = BytesMut::from(&b"ok\nabcdefgh"[..]);
        assert_eq!(codec.decode_eof(&mut src).unwrap().unwrap().text, "ok");
        assert!(codec.decode_eof(&mut src).unwrap().is_none());
        assert_eq!(codec.skipped_lines(), 1);
    }

    #[test]
    fn test_line_too_long_then_resync() {
        let mut codec = strict_codec(8);
        let mut src = BytesMut::from(&b"0123456789abc\nnext\n"[..]);

        match codec.decode(&mut src) {
            Err(AnsiCodecError::LineTooLong { length, max }) => {
                // Only the line is measured, not the buffered line after it.
                assert_eq!(length, 9);
                assert_eq!(max, 8);
            }
            other => panic!("expected LineTooLong, got {other:?}"),
        }

        let line = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(line.text, "next");
        assert!(src.is_empty());
    }

    #[test]
    fn test_line_at_limit_is_accepted() {
        let mut codec = codec(8);
        let mut src = BytesMut::from(&b"12345678\n"[..]);
        assert_eq!(codec.decode(&mut src).unwrap().unwrap().text, "12345678");
    }

    #[test]
    fn test_discarding_spans_multiple_reads() {
        let mut codec = strict_codec(4);
        let mut src = BytesMut::from(&b"abcdefgh"[..]);
        assert!(codec.decode(&mut src).is_err());
        assert!(codec.decode(&mut src).unwrap().is_none());
        assert!(src.is_empty());

        src.extend_from_slice(b"ijk\nok\n");
        assert_eq!(codec.decode(&mut src).unwrap().unwrap().text, "ok");
    }

    #[test]
    fn test_reset_clears_carried_state() {
        let mut codec = ColorLineCodec::default();
        let mut src = BytesMut::from(&b"\x1b[4munder\n"[..]);
        codec.decode(&mut src).unwrap();
        assert_eq!(codec.state().attr, Attributes::UNDERLINE);
        codec.reset();
        assert!(codec.state().is_default());
    }

    #[test]
    fn test_encode_renders_with_mode() {
        let extraction = crate::extract_color("x\x1b[38;2;255;0;0my", None);

        let mut dst = BytesMut::new();
        ColorLineCodec::new(AnsiConfig::true_color_only())
            .encode(&extraction, &mut dst)
            .unwrap();
        assert_eq!(&dst[..], b"x\x1b[38;2;255;0;0;49my\x1b[0m\n");

        let mut dst = BytesMut::new();
        ColorLineCodec::new(AnsiConfig::strip_all())
            .encode(extraction, &mut dst)
            .unwrap();
        assert_eq!(&dst[..], b"xy\n");
        assert_eq!(AnsiConfig::strip_all().color_mode, ColorMode::None);
    }
}

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

//! Property tests for scanning and extraction.
//!
//! 1. The scanner always makes progress and stays in bounds.
//! 2. Extracted text is exactly the stripped input.
//! 3. Spans are ordered, disjoint, non-empty and never default.
//! 4. Touching spans always differ in rendition.
//! 5. Splitting the input between sequences and carrying the state
//!    colors every byte the same as extracting it whole.
//! 6. Serialization round trips through the interpreter.
//! 7. Re-extracting rendered output reproduces the spans.

use proptest::prelude::*;
use tintline_ansicodec::{
    AnsiSequences, AnsiState, Attributes, Color, ColorMode, Extraction, extract_color,
    interpret_sequence, strip_ansi_codes,
};

fn color_strategy() -> impl Strategy<Value = Color> {
    prop_oneof![
        Just(Color::Default),
        any::<u8>().prop_map(Color::Fixed),
        (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Color::RGB(r, g, b)),
    ]
}

fn state_strategy() -> impl Strategy<Value = AnsiState> {
    (color_strategy(), color_strategy(), any::<u8>()).prop_map(|(fg, bg, bits)| AnsiState {
        fg,
        bg,
        attr: Attributes::from_bits_truncate(bits),
        bg_explicit_default: false,
    })
}

fn sgr_strategy() -> impl Strategy<Value = String> {
    let code = prop_oneof![
        4 => (0u16..110).prop_map(|code| code.to_string()),
        1 => any::<u8>().prop_map(|n| format!("38;5;{n}")),
        1 => any::<u8>().prop_map(|n| format!("48;5;{n}")),
        1 => (any::<u8>(), any::<u8>(), any::<u8>())
            .prop_map(|(r, g, b)| format!("38;2;{r};{g};{b}")),
        1 => Just(String::new()),
    ];
    prop::collection::vec(code, 0..4).prop_map(|codes| format!("\x1b[{}m", codes.join(";")))
}

/// One piece of input: plain text, an SGR sequence or some other sequence.
fn token_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z 椙😀]{1,6}",
        3 => sgr_strategy(),
        1 => prop_oneof![
            Just("\x1b[K".to_string()),
            Just("\x1b[2J".to_string()),
            Just("\x1b(B".to_string()),
            Just("\x1b7".to_string()),
            Just("\x1b]0;title\x07".to_string()),
            Just("\x0e".to_string()),
            Just("\x0f".to_string()),
            Just("x\x08".to_string()),
        ],
    ]
}

fn tokens_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(token_strategy(), 0..24)
}

/// The rendition of every byte of `text`, `None` when uncolored.
fn color_map(extraction: &Extraction) -> Vec<Option<AnsiState>> {
    let mut map = vec![None; extraction.text.len()];
    for span in &extraction.spans {
        for slot in &mut map[span.range()] {
            *slot = Some(span.color);
        }
    }
    map
}

proptest! {
    #[test]
    fn scanner_progresses(input in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut last_end = 0;
        for found in AnsiSequences::new(&input) {
            prop_assert!(found.start >= last_end);
            prop_assert!(found.start < found.end);
            prop_assert!(found.end <= input.len());
            last_end = found.end;
        }
    }

    #[test]
    fn text_is_stripped_input(tokens in tokens_strategy()) {
        let input = tokens.concat();
        let extraction = extract_color(&input, None);
        let stripped = strip_ansi_codes(&input);
        prop_assert_eq!(extraction.text.as_str(), stripped.as_ref());
    }

    #[test]
    fn spans_are_well_formed(tokens in tokens_strategy(), carried in state_strategy()) {
        let input = tokens.concat();
        let extraction = extract_color(&input, Some(carried));
        let mut last_end = 0;
        for span in &extraction.spans {
            prop_assert!(span.start >= last_end, "overlap in {:?}", extraction.spans);
            prop_assert!(span.start < span.end, "empty span in {:?}", extraction.spans);
            prop_assert!(span.end <= extraction.text.len());
            prop_assert!(!span.color.is_default());
            prop_assert!(extraction.text.is_char_boundary(span.start));
            prop_assert!(extraction.text.is_char_boundary(span.end));
            last_end = span.end;
        }
    }

    #[test]
    fn touching_spans_differ(tokens in tokens_strategy()) {
        let input = tokens.concat();
        let extraction = extract_color(&input, None);
        for pair in extraction.spans.windows(2) {
            if pair[0].end == pair[1].start {
                prop_assert_ne!(pair[0].color, pair[1].color);
            }
        }
    }

    #[test]
    fn carried_state_matches_whole(tokens in tokens_strategy(), split in any::<prop::sample::Index>()) {
        let at = split.index(tokens.len() + 1);
        let head = tokens[..at].concat();
        let tail = tokens[at..].concat();

        let whole = extract_color(&tokens.concat(), None);
        let first = extract_color(&head, None);
        let second = extract_color(&tail, Some(first.state));

        prop_assert_eq!(format!("{}{}", first.text, second.text), whole.text.clone());
        let mut joined = color_map(&first);
        joined.extend(color_map(&second));
        prop_assert_eq!(joined, color_map(&whole));
        prop_assert_eq!(second.state, whole.state);
    }

    #[test]
    fn serialization_round_trips(state in state_strategy()) {
        let sequence = state.to_ansi_string();
        prop_assert_eq!(sequence.is_empty(), state.is_default());
        prop_assert_eq!(interpret_sequence(sequence.as_bytes(), None), state);
    }

    #[test]
    fn rendered_output_reproduces_spans(tokens in tokens_strategy()) {
        let input = tokens.concat();
        let first = extract_color(&input, None);
        let again = extract_color(&first.render(ColorMode::TrueColor), None);
        prop_assert_eq!(&again.text, &first.text);
        prop_assert_eq!(&again.spans, &first.spans);
        prop_assert!(again.state.is_default());
    }
}

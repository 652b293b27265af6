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

//! Colored Line Relay Example
//!
//! Reads colored text from stdin, extracts the color spans of every line and
//! writes the lines back out re-rendered for the color depth of the current
//! terminal (`NO_COLOR`, `COLORTERM` and `TERM` are honored).
//!
//! ## Usage
//!
//! ```bash
//! ls --color=always | cargo run --example extract_lines
//! NO_COLOR=1 cargo run --example extract_lines < colored.log
//! ```

use futures::{SinkExt, StreamExt};
use std::io::Write;
use std::sync::Arc;
use tintline_ansicodec::{AnsiConfig, ColorLineCodec, Extraction, consts::SGR_RESET};
use tintline_lifecycle::ShutdownHooks;
use tokio_util::codec::{FramedRead, FramedWrite};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout carries only the relayed text
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let config = AnsiConfig::from_env();
    tracing::info!(mode = ?config.color_mode, "relaying stdin");

    let hooks = Arc::new(ShutdownHooks::new());
    if config.color_mode.is_ansi() {
        // Never leave the terminal colored, even when interrupted mid-line
        hooks.register(|| {
            let mut stdout = std::io::stdout();
            let _ = stdout.write_all(SGR_RESET.as_bytes());
            let _ = stdout.flush();
        });
    }

    let interrupted = Arc::clone(&hooks);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupted.exit(130);
        }
    });

    let mut lines = FramedRead::new(tokio::io::stdin(), ColorLineCodec::new(config.clone()));
    let mut output = FramedWrite::new(tokio::io::stdout(), ColorLineCodec::new(config));
    let mut relayed = 0usize;

    // Overlong lines are skipped by the codec, so the stream only ends at EOF
    while let Some(extraction) = lines.next().await.transpose()? {
        tracing::debug!(spans = extraction.spans.len(), "line");
        output.send(extraction).await?;
        relayed += 1;
    }
    SinkExt::<Extraction>::flush(&mut output).await?;

    tracing::info!(relayed, skipped = lines.decoder().skipped_lines(), "done");
    hooks.exit(0)
}

//! stdin watcher: every line is a text event, as a clipboard change would be.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use garanti_client::Resolver;
use garanti_core::{SerialNumber, extract_serial};

use crate::render;

/// Remembers the last serial seen so repeated events for the same device are
/// ignored.
#[derive(Debug, Default)]
pub struct SerialWatcher {
    last: Option<SerialNumber>,
}

impl SerialWatcher {
    /// The serial in `text`, unless there is none or it equals the previous one.
    pub fn observe(&mut self, text: &str) -> Option<SerialNumber> {
        let serial = extract_serial(text)?;
        if self.last.as_ref() == Some(&serial) {
            return None;
        }
        self.last = Some(serial.clone());
        Some(serial)
    }
}

/// Resolve each new serial read from `input` and print it to `out` until EOF.
/// Returns the number of resolutions printed.
pub async fn run<R, W>(resolver: &Resolver, input: R, out: &mut W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut watcher = SerialWatcher::default();
    let mut lines = input.lines();
    let mut resolved = 0;

    while let Some(line) = lines.next_line().await? {
        let Some(serial) = watcher.observe(&line) else {
            continue;
        };
        tracing::debug!(serial = %serial, "new serial");

        let resolution = resolver.resolve_detailed(&serial).await;
        write!(out, "{}", render::resolution(&resolution))?;
        out.flush()?;
        resolved += 1;
    }
    Ok(resolved)
}

// src/inspect/mod.rs

//! Heuristic inspection of log content.
//!
//! - [`rules`]: the ordered status rule table.
//! - [`status`]: `StatusInferencer`, log → running / success / error.
//! - [`summary`]: `LogSummarizer`, log → salient lines, or the raw view.
//!
//! Both inspectors stream through `fs::FileSystem` and decode each line
//! lossily, so invalid UTF-8 never fails a request.

pub mod rules;
pub mod status;
pub mod summary;

use std::io::{self, BufRead, BufReader, Read};

pub use rules::{Predicate, StatusRule, StatusRules};
pub use status::StatusInferencer;
pub use summary::{LogSummarizer, RawView};

/// Call `f` for every line of `reader` (newline stripped, lossily decoded).
pub(crate) fn for_each_line<R, F>(reader: R, mut f: F) -> io::Result<()>
where
    R: Read,
    F: FnMut(&str),
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        f(&String::from_utf8_lossy(&buf));
    }
    Ok(())
}

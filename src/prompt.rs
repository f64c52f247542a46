//! Interactive window entry for `--window`.

use std::io::{BufRead, Write};

/// Which end of the window is being asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bound::Start => write!(f, "start"),
            Bound::End => write!(f, "end"),
        }
    }
}

/// Ask for one bound. An empty answer (or end of input) leaves it unbounded.
pub fn prompt_bound<R, W>(bound: Bound, input: &mut R, prompt: &mut W) -> std::io::Result<String>
where
    R: BufRead,
    W: Write,
{
    write!(prompt, "window {bound} time (hh:mm | n/now): ")?;
    prompt.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

/// Fill in whichever bounds were not given on the command line.
pub fn fill_window<R, W>(
    start: Option<String>,
    end: Option<String>,
    input: &mut R,
    prompt: &mut W,
) -> std::io::Result<(String, String)>
where
    R: BufRead,
    W: Write,
{
    let start = match start {
        Some(start) => start,
        None => prompt_bound(Bound::Start, input, prompt)?,
    };
    let end = match end {
        Some(end) => end,
        None => prompt_bound(Bound::End, input, prompt)?,
    };
    Ok((start, end))
}

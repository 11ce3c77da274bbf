//! Listmerge command handler.

use std::io::{self, BufWriter, Write};

use anyhow::Result;
use comicpull_core::ReadingList;
use comicpull_core::readlist::interleave;

use crate::cli::ListmergeArgs;

pub fn run_listmerge_command(args: &ListmergeArgs) -> Result<()> {
    let first = ReadingList::new(&args.first).lines()?;
    let second = ReadingList::new(&args.second).lines()?;
    let rate = usize::try_from(args.rate).unwrap_or(usize::MAX);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for line in interleave(first, second, rate) {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

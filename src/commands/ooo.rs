//! Out-of-order command handler.

use anyhow::Result;
use comicpull_core::ReadingList;
use comicpull_core::readlist::out_of_order;

use crate::cli::OooArgs;

pub fn run_ooo_command(args: &OooArgs) -> Result<()> {
    for path in &args.files {
        let lines = ReadingList::new(path).lines()?;
        for report in out_of_order(lines.iter().map(String::as_str)) {
            println!("{} (last seen {})", report.line, report.last_seen);
        }
    }
    Ok(())
}

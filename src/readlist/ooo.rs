//! Detection of issues read out of order.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// `<id> <series> #<number>`
#[allow(clippy::expect_used)]
static NUMBERED_ISSUE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+ +([^#]+)#([\d.]+)").expect("numbered issue regex is valid") // Static pattern, safe to panic
});

/// A line whose issue number does not follow the previous issue of the same series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutOfOrder {
    /// The offending line, trimmed.
    pub line: String,
    /// Issue number of the previous occurrence of the series.
    pub last_seen: String,
}

/// Reports lines whose issue number repeats or skips ahead of the previous
/// issue of the same series. Issue `0` and lines without `#<number>` are ignored.
pub fn out_of_order<'a, I>(lines: I) -> Vec<OutOfOrder>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut reports = Vec::new();

    for line in lines {
        let Some(captures) = NUMBERED_ISSUE_PATTERN.captures(line) else {
            continue;
        };
        let series = captures[1].to_string();
        let number = captures[2].to_string();
        if number == "0" {
            continue;
        }

        if let Some(last_seen) = seen.get(&series)
            && let (Ok(current), Ok(previous)) = (number.parse::<f64>(), last_seen.parse::<f64>())
        {
            let delta = (current - previous).abs();
            if delta == 0.0 || delta > 1.0 {
                reports.push(OutOfOrder {
                    line: line.trim().to_string(),
                    last_seen: last_seen.clone(),
                });
            }
        }
        seen.insert(series, number);
    }
    reports
}

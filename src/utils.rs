use chrono::Local;
use std::time::Duration;

/// Convert fractional seconds to a `Duration`, treating negative or
/// non-finite values as zero
pub fn secs(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO)
}

/// `<prefix>_YYYYmmdd_HHMMSS.<extension>` in local time
pub fn timestamped_filename(prefix: &str, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        prefix,
        Local::now().format("%Y%m%d_%H%M%S"),
        extension
    )
}

/// Textual form of a tag list, e.g. `['sonnet', 'love']`.
///
/// Tags are single-quoted unless they contain a single quote and no double
/// quote, in which case they are double-quoted (`["o'clock"]`).
pub fn format_tags(tags: &[String]) -> String {
    let quoted = tags.iter().map(|t| quote_tag(t)).collect::<Vec<_>>();
    format!("[{}]", quoted.join(", "))
}

fn quote_tag(tag: &str) -> String {
    let quote = if tag.contains('\'') && !tag.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(tag.len() + 2);
    out.push(quote);
    for c in tag.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

const UNIT_BASE: u64 = 1024;
const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Bytes per megabyte when converting user-entered sizes.
pub const BYTES_PER_MB: u64 = UNIT_BASE * UNIT_BASE;

/// Renders a byte count with base-1024 units, e.g. `1536 -> "1.5 KB"`.
///
/// Picks the largest unit in which the value is at least 1, rounds to two decimals and
/// drops trailing zeros. Sizes past the last unit stay in `GB`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut divisor = 1u64;
    while unit + 1 < UNITS.len() && bytes / divisor >= UNIT_BASE {
        divisor *= UNIT_BASE;
        unit += 1;
    }

    // Halves round away from zero: 1.125 -> 1.13.
    let scaled = (bytes as f64 / divisor as f64 * 100.0).round() / 100.0;
    format!("{} {}", trim_decimals(&format!("{scaled:.2}")), UNITS[unit])
}

fn trim_decimals(fixed: &str) -> &str {
    if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed
    }
}

/// Reformat a raw cue timestamp into `hh:mm:ss.mmm` display form, with the
/// hours segment dropped when zero.
///
/// Two shapes are accepted:
///
/// - With a `.`, the final segment is fractional seconds and is zero-padded
///   (or truncated) to exactly 3 digits: `"00:04.2"` → `"00:04.200"`.
/// - Without a `.`, colon/comma-delimited parts are integer
///   hours:minutes:seconds, with an optional SRT-style `,mmm` tail:
///   `"01:02:03,450"` → `"01:02:03.450"`.
///
/// Anything that does not parse degrades to an empty string; a missing
/// timestamp is display-empty, never a hard failure.
pub fn normalize_timestamp(raw: &str) -> String {
    let parsed = match raw.rsplit_once('.') {
        Some((head, frac)) => parse_parts(head, Some(frac)),
        None => {
            let (head, frac) = head_and_comma_tail(raw);
            parse_parts(head, frac)
        }
    };

    match parsed {
        Some((hours, minutes, seconds, millis)) => {
            if hours > 0 {
                format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
            } else {
                format!("{minutes:02}:{seconds:02}.{millis:03}")
            }
        }
        None => String::new(),
    }
}

/// Split an SRT-style `hh:mm:ss,mmm` timestamp into its integer head and
/// fractional tail. Timestamps without a comma have no fractional part.
fn head_and_comma_tail(raw: &str) -> (&str, Option<&str>) {
    match raw.rsplit_once(',') {
        Some((head, frac)) => (head, Some(frac)),
        None => (raw, None),
    }
}

fn parse_parts(head: &str, frac: Option<&str>) -> Option<(u32, u32, u32, u32)> {
    let parts: Vec<u32> = head
        .split([':', ','])
        .map(|p| p.parse::<u32>().ok())
        .collect::<Option<_>>()?;

    let (hours, minutes, seconds) = match parts[..] {
        [s] => (0, 0, s),
        [m, s] => (0, m, s),
        [h, m, s] => (h, m, s),
        _ => return None,
    };

    let millis = match frac {
        Some(f) => parse_millis(f)?,
        None => 0,
    };

    Some((hours, minutes, seconds, millis))
}

/// Fractional seconds → integer milliseconds. `"2"` means two tenths, so the
/// digits are right-padded to three before parsing; extra precision is cut.
fn parse_millis(frac: &str) -> Option<u32> {
    if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut digits = frac.to_string();
    while digits.len() < 3 {
        digits.push('0');
    }
    digits[..3].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_cue_keeps_millis() {
        assert_eq!(normalize_timestamp("00:04.200"), "00:04.200");
    }

    #[test]
    fn srt_comma_becomes_dot() {
        assert_eq!(normalize_timestamp("01:02:03,450"), "01:02:03.450");
    }

    #[test]
    fn zero_hours_segment_is_dropped() {
        assert_eq!(normalize_timestamp("00:00:07.5"), "00:07.500");
    }

    #[test]
    fn nonzero_hours_are_kept() {
        assert_eq!(normalize_timestamp("01:00:00"), "01:00:00.000");
    }

    #[test]
    fn short_fraction_is_right_padded() {
        assert_eq!(normalize_timestamp("00:04.2"), "00:04.200");
    }

    #[test]
    fn long_fraction_is_truncated() {
        assert_eq!(normalize_timestamp("00:04.20011"), "00:04.200");
    }

    #[test]
    fn bare_minutes_seconds() {
        assert_eq!(normalize_timestamp("12:34"), "12:34.000");
    }

    #[test]
    fn garbage_degrades_to_empty() {
        assert_eq!(normalize_timestamp("abc"), "");
        assert_eq!(normalize_timestamp("1:2:3:4:5"), "");
        assert_eq!(normalize_timestamp("00:xx.200"), "");
        assert_eq!(normalize_timestamp("00:04."), "");
    }
}

//! Compact number formatting for analytics labels.

/// Abbreviate a count for stat cards and histogram axis labels.
///
/// Values of a million or more render as `M`, thousands as `k`, anything
/// smaller verbatim. Exact multiples drop the decimal ("2M", not "2.0M").
pub fn fmt_short(n: u64) -> String {
    if n >= 1_000_000 {
        if n % 1_000_000 == 0 {
            format!("{}M", n / 1_000_000)
        } else {
            format!("{:.1}M", n as f64 / 1_000_000.0)
        }
    } else if n >= 1_000 {
        if n % 1_000 == 0 {
            format!("{}k", n / 1_000)
        } else {
            format!("{:.1}k", n as f64 / 1_000.0)
        }
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_numbers_verbatim() {
        assert_eq!(fmt_short(0), "0");
        assert_eq!(fmt_short(7), "7");
        assert_eq!(fmt_short(999), "999");
    }

    #[test]
    fn test_thousands() {
        assert_eq!(fmt_short(1_000), "1k");
        assert_eq!(fmt_short(8_000), "8k");
        assert_eq!(fmt_short(12_300), "12.3k");
        assert_eq!(fmt_short(999_999), "1000.0k");
    }

    #[test]
    fn test_millions() {
        assert_eq!(fmt_short(1_000_000), "1M");
        assert_eq!(fmt_short(2_400_000), "2.4M");
        assert_eq!(fmt_short(10_000_000), "10M");
    }
}

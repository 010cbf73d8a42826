//! Storage-size string validation.

const SUFFIXES: &[&str] = &["K", "M", "G", "T", "P", "Ki", "Mi", "Gi", "Ti", "Pi"];

/// Check that `size` is a decimal integer with an optional binary or
/// decimal suffix (`K`/`Ki`/`M`/`Mi`/...) and an optional trailing `B`.
///
/// Returns `None` when the format is acceptable and the reason otherwise.
pub fn check_size(size: &str) -> Option<String> {
    const REASON: &str = "is not a correct size format";

    if size.is_empty() || size.contains(' ') {
        return Some(REASON.to_string());
    }

    // `20GiB` and `20Gi` are both fine.
    let trimmed = size.strip_suffix('B').unwrap_or(size);
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, suffix) = trimmed.split_at(digits_end);

    if digits.is_empty() || digits.parse::<u64>().is_err() {
        return Some(REASON.to_string());
    }
    if !suffix.is_empty() && !SUFFIXES.contains(&suffix) {
        return Some(REASON.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_integers_are_valid() {
        assert_eq!(check_size("20"), None);
        assert_eq!(check_size("0"), None);
    }

    #[test]
    fn suffixed_sizes_are_valid() {
        for size in ["3K", "20Gi", "512MiB", "1TiB", "7M", "2GB"] {
            assert_eq!(check_size(size), None, "{size} should be valid");
        }
    }

    #[test]
    fn malformed_sizes_are_rejected() {
        for size in ["", "20 Gi", "Gi20", "Gi", "20X", "20KiBi", "-5Gi", "1.5Gi"] {
            assert!(check_size(size).is_some(), "{size:?} should be rejected");
        }
    }

    #[test]
    fn reason_is_stable() {
        assert_eq!(check_size("bogus").unwrap(), "is not a correct size format");
    }
}

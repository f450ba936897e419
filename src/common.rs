const UNITS: [&str; 4] = ["bytes", "KB", "MB", "GB"];

/// Formats a byte count for humans, e.g. `10.00 MB`.
pub fn bytes2hr(bytes: usize) -> String {
    if bytes < 1024 {
        return format!("{bytes} bytes");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

/// Nanoseconds to seconds, for display.
pub fn nanos2secs(nanos: u64) -> f64 {
    nanos as f64 / 1_000_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes2hr() {
        assert_eq!(bytes2hr(512), "512 bytes");
        assert_eq!(bytes2hr(4096), "4.00 KB");
        assert_eq!(bytes2hr(10 * 1024 * 1024), "10.00 MB");
        assert_eq!(bytes2hr(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_nanos2secs() {
        assert_eq!(nanos2secs(1_500_000_000), 1.5);
    }
}

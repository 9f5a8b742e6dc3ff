/// MM:SS, zero padded; minutes keep growing past 99
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Fraction of the clock left, in 0.0..=1.0
pub fn time_ratio(remaining_ms: u64, total_ms: u64) -> f64 {
    if total_ms == 0 {
        return 0.0;
    }
    (remaining_ms as f64 / total_ms as f64).clamp(0.0, 1.0)
}

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(9), "00:09");
        assert_eq!(format_clock(60), "01:00");
        assert_eq!(format_clock(90), "01:30");
        assert_eq!(format_clock(6001), "100:01");
    }

    #[test]
    fn test_time_ratio() {
        assert_eq!(time_ratio(30_000, 60_000), 0.5);
        assert_eq!(time_ratio(0, 60_000), 0.0);
        assert_eq!(time_ratio(5, 0), 0.0);
        assert_eq!(time_ratio(70_000, 60_000), 1.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[10., 20., 30., 15., 22.]), Some(19.4));
        assert_eq!(mean(&[-10.0, 0.0, 10.0]), Some(0.0));
    }

    #[test]
    fn test_mean_empty_slice() {
        assert_eq!(mean(&[]), None);
    }
}

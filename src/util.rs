pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// `part / whole` as a rounded percentage. A zero `whole` yields 0.
pub fn round_percent(part: usize, whole: usize) -> u8 {
    match whole {
        0 => 0,
        _ => ((part as f64 / whole as f64) * 100.0).round().clamp(0.0, 100.0) as u8,
    }
}

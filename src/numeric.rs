//! Rounding and guarded ratios shared by every KPI

/// Round half away from zero to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `numerator / denominator * 100` rounded to 2 dp, 0 when the denominator is 0
pub fn pct(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    round2(numerator / denominator * 100.0)
}

/// Shares of `parts` in their total as percentages with 2 dp that add up to
/// exactly 100.00. Remaining cents go to the largest truncation remainders,
/// ties to the earlier part. All zeros when the total is not positive.
pub fn shares_pct(parts: &[f64]) -> Vec<f64> {
    let total: f64 = parts.iter().sum();
    if total <= 0.0 {
        return vec![0.0; parts.len()];
    }

    let raw: Vec<f64> = parts.iter().map(|p| p / total * 10_000.0).collect();
    let mut cents: Vec<i64> = raw.iter().map(|r| r.floor() as i64).collect();
    let assigned: i64 = cents.iter().sum();

    let mut order: Vec<usize> = (0..parts.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = raw[a] - raw[a].floor();
        let rb = raw[b] - raw[b].floor();
        rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal).then(a.cmp(&b))
    });
    let missing = (10_000 - assigned).max(0) as usize;
    for &idx in order.iter().take(missing) {
        cents[idx] += 1;
    }

    cents.into_iter().map(|c| c as f64 / 100.0).collect()
}

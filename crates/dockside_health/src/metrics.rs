//! Reading samples out of the Prometheus text exposition format.

/// Returns the first sample of `metric` in `exposition`.
///
/// Labelled samples (`metric{a="b"} 1`) match too. Comment lines and
/// unparsable values are skipped.
pub fn read_metric(exposition: &str, metric: &str) -> Option<f64> {
    exposition
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .find_map(|line| {
            let rest = line.strip_prefix(metric)?;
            let rest = match rest.chars().next()? {
                '{' => &rest[rest.find('}')? + 1..],
                c if c.is_whitespace() => rest,
                _ => return None,
            };
            rest.split_whitespace().next()?.parse::<f64>().ok()
        })
}

/// Unix seconds of the last call the job served, if it reports one.
pub fn read_last_call_timestamp(exposition: &str) -> Option<i64> {
    read_metric(
        exposition,
        dockside_core::constants::LAST_CALL_TIMESTAMP_METRIC,
    )
    .filter(|v| v.is_finite())
    .map(|v| v as i64)
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;

// Health is a two-term weighted composite:
//
//   score = uptime * 0.7 + max(0, 100 - avg_ms / 10) * 0.3
//
// where the response term is 0 when no response time has been recorded.
// So a server with perfect uptime and no latency data scores 70, and one
// that has answered in 1s or worse on average gets nothing for latency.
// The result is rounded and clamped to [0,100]; malformed inputs (uptime
// over 100, negative response times, NaN) can't escape that range.

use crate::record::Performance;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;

const UPTIME_WEIGHT: f64 = 0.7;
const RESPONSE_WEIGHT: f64 = 0.3;

// Stand-in for an absent response time when ordering, so servers with no
// latency data sort after every server that has some.
const MISSING_RESPONSE_MS: f64 = 999_999.0;

pub fn health_score(perf: &Performance) -> u8 {
    let uptime = finite_or_zero(perf.uptime_percent);
    let response_term = match perf.avg_response_time_ms {
        Some(ms) if ms.is_finite() => (100.0 - ms / 10.0).max(0.0) * RESPONSE_WEIGHT,
        _ => 0.0,
    };
    let raw = (uptime * UPTIME_WEIGHT + response_term).round();
    raw.clamp(0.0, 100.0) as u8
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

fn response_sort_key(perf: &Performance) -> OrderedFloat<f64> {
    match perf.avg_response_time_ms {
        Some(ms) if ms.is_finite() => OrderedFloat(ms),
        _ => OrderedFloat(MISSING_RESPONSE_MS),
    }
}

/// Ordering used by performance ranking: higher score first, then lower
/// response time, absent response times last.
pub fn compare_health(a: &Performance, b: &Performance) -> Ordering {
    health_score(b)
        .cmp(&health_score(a))
        .then_with(|| response_sort_key(a).cmp(&response_sort_key(b)))
}

//! (De)serializes [`Duration`]s as strings such as `"250ms"`, `"2s"`, `"1min"` or `"1h"`.
//!
//! Durations are written in the largest of `s`, `ms`, `us` and `ns` that
//! represents them exactly.
//!
//! Use with `#[serde(with = "chainfeed_core::utils::serde_duration")]`.

use serde::{de, Deserialize, Deserializer, Serializer};
use std::time::Duration;

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let nanos = duration.subsec_nanos();
    let s = if nanos == 0 {
        format!("{}s", duration.as_secs())
    } else if nanos % 1_000_000 == 0 {
        format!("{}ms", duration.as_millis())
    } else if nanos % 1_000 == 0 {
        format!("{}us", duration.as_micros())
    } else {
        format!("{}ns", duration.as_nanos())
    };
    serializer.serialize_str(&s)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(de::Error::custom)
}

/// Parses `<integer><unit>` where unit is one of `ns`, `us`, `ms`, `s`, `min`, `h`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let split =
        s.find(|c: char| !c.is_ascii_digit()).ok_or_else(|| format!("missing unit in {s:?}"))?;
    let (value, unit) = s.split_at(split);
    let value: u64 = value.parse().map_err(|_| format!("invalid duration value in {s:?}"))?;

    let secs = |factor: u64| {
        value.checked_mul(factor).map(Duration::from_secs).ok_or_else(|| format!("{s:?} overflows"))
    };
    match unit.trim() {
        "ns" => Ok(Duration::from_nanos(value)),
        "us" => Ok(Duration::from_micros(value)),
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "min" => secs(60),
        "h" => secs(60 * 60),
        unit => Err(format!("invalid duration unit {unit:?}, expected ns, us, ms, s, min or h")),
    }
}

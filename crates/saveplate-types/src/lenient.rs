use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Serves arrive as numbers or numeric strings. Anything else counts as zero.
pub fn serves<'de, D>(d: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().map(to_count).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(to_count).unwrap_or(0),
        _ => 0,
    })
}

fn to_count(f: f64) -> u32 {
    if f.is_finite() && f > 0.0 {
        f.floor().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// Timestamps that fail to parse are dropped rather than failing the record.
pub fn datetime<'de, D>(d: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok(),
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}

/// Item indices occasionally come back as strings.
pub fn index<'de, D>(d: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().map(|n| n as usize),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::serves")]
        serves: u32,
        #[serde(default, deserialize_with = "super::datetime")]
        at: Option<chrono::DateTime<chrono::Utc>>,
    }

    #[test]
    fn serves_accepts_numbers_and_numeric_strings() {
        let p: Probe = serde_json::from_str(r#"{"serves": "12"}"#).unwrap();
        assert_eq!(p.serves, 12);
        let p: Probe = serde_json::from_str(r#"{"serves": 7}"#).unwrap();
        assert_eq!(p.serves, 7);
        let p: Probe = serde_json::from_str(r#"{"serves": "lots"}"#).unwrap();
        assert_eq!(p.serves, 0);
        let p: Probe = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(p.serves, 0);
    }

    #[test]
    fn bad_timestamp_becomes_none() {
        let p: Probe = serde_json::from_str(r#"{"at": "yesterday"}"#).unwrap();
        assert!(p.at.is_none());
        let p: Probe = serde_json::from_str(r#"{"at": "2026-03-01T10:00:00.000Z"}"#).unwrap();
        assert!(p.at.is_some());
    }
}

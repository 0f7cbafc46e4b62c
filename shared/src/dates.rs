use chrono::{DateTime, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_with::{DeserializeAs, SerializeAs};

/// Accepts `YYYY-MM-DD` as well as the RFC 2822 form Flask's `jsonify` emits
/// for bare dates (`Tue, 05 Sep 2023 00:00:00 GMT`). Always writes ISO.
pub struct LenientDate;

impl LenientDate {
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc2822(raw).ok().map(|d| d.date_naive()))
            .or_else(|| {
                // "2023-09-05T00:00:00"
                raw.get(..10)
                    .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
            })
    }
}

impl<'de> DeserializeAs<'de, NaiveDate> for LenientDate {
    fn deserialize_as<D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        LenientDate::parse(&raw)
            .ok_or_else(|| de::Error::custom(format!("unrecognised date `{raw}`")))
    }
}

impl SerializeAs<NaiveDate> for LenientDate {
    fn serialize_as<S>(source: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        source.format("%Y-%m-%d").to_string().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_and_http_dates() {
        let expected = NaiveDate::from_ymd_opt(2023, 9, 5).unwrap();
        assert_eq!(LenientDate::parse("2023-09-05"), Some(expected));
        assert_eq!(
            LenientDate::parse("Tue, 05 Sep 2023 00:00:00 GMT"),
            Some(expected)
        );
        assert_eq!(LenientDate::parse("2023-09-05T00:00:00"), Some(expected));
        assert_eq!(LenientDate::parse("next tuesday"), None);
    }
}

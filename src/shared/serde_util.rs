//! Custom serde helpers for backend wire formats.

/// Deserializes an optional number that the API may send as a JSON number,
/// a numeric string, or `null`.
///
/// Anything that does not parse as a finite number becomes `None`, so one odd
/// field never fails the whole listing. Use with `#[serde(default)]` to cover
/// omitted fields too.
pub mod lenient_f64 {
    use serde::{Deserialize, Deserializer};

    use serde::de::IgnoredAny;

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum Raw {
        Number(f64),
        Text(String),
        Other(IgnoredAny),
    }

    impl Raw {
        pub(super) fn finite(self) -> Option<f64> {
            let value = match self {
                Raw::Number(n) => Some(n),
                Raw::Text(s) => s.trim().parse::<f64>().ok(),
                Raw::Other(_) => None,
            };
            value.filter(|n| n.is_finite())
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Raw>::deserialize(deserializer)?;
        Ok(raw.and_then(Raw::finite))
    }
}

/// Deserializes an optional rank or count. Accepts the same inputs as
/// [`lenient_f64`] but keeps only whole, non-negative values that fit a `u32`
/// (`3.0` and `"3"` become `Some(3)`, while `2.5`, `-1` and `"n/a"` become `None`).
pub mod lenient_u32 {
    use super::lenient_f64::Raw;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Raw>::deserialize(deserializer)?;
        Ok(raw
            .and_then(Raw::finite)
            .filter(|n| n.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(n))
            .map(|n| n as u32))
    }
}

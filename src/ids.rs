use serde::{de, Deserialize, Deserializer};

/// Accepts a user id as a JSON number or a numeric string (clients that keep
/// the id in local storage send strings). Blank strings count as absent.
pub fn flexible_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(i64),
        Str(String),
    }

    match Option::<Repr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Repr::Num(n)) => Ok(Some(n)),
        Some(Repr::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(Repr::Str(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid id: {s}"))),
    }
}

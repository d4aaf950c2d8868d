//! Serde helpers for duck-typed backend payloads. The backend stores some
//! coordinates as text and some as numbers, so numeric fields at the wire
//! boundary accept either form.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrStr {
    Num(f64),
    Str(String),
}

impl NumOrStr {
    fn parse<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            NumOrStr::Num(value) => Ok(value),
            NumOrStr::Str(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|err| E::custom(format!("not a number: {raw:?} ({err})"))),
        }
    }
}

pub(crate) fn f64_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    NumOrStr::deserialize(deserializer)?.parse()
}

pub(crate) fn opt_f64_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumOrStr>::deserialize(deserializer)? {
        Some(value) => value.parse().map(Some),
        None => Ok(None),
    }
}

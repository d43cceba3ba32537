//! Epoch-millisecond fields arrive either as JSON numbers or as decimal
//! strings (`"1748779200000"`). Both deserialize to `i64`; serialization
//! always writes a number.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrStr {
    Num(i64),
    Float(f64),
    Str(String),
}

fn resolve<E: serde::de::Error>(v: NumOrStr) -> Result<Option<i64>, E> {
    match v {
        NumOrStr::Num(n) => Ok(Some(n)),
        NumOrStr::Float(f) if f.is_finite() => Ok(Some(f.trunc() as i64)),
        NumOrStr::Float(f) => Err(E::custom(format!("non-finite epoch ms: {f}"))),
        NumOrStr::Str(s) => {
            let t = s.trim();
            if t.is_empty() {
                return Ok(None);
            }
            t.parse::<i64>()
                .map(Some)
                .map_err(|_| E::custom(format!("invalid epoch ms: {s:?}")))
        }
    }
}

pub fn deserialize<'de, D>(d: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    resolve::<D::Error>(NumOrStr::deserialize(d)?)?
        .ok_or_else(|| serde::de::Error::custom("empty epoch ms"))
}

pub fn deserialize_opt<'de, D>(d: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumOrStr>::deserialize(d)? {
        Some(v) => resolve::<D::Error>(v),
        None => Ok(None),
    }
}

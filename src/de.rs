//! Lenient deserializers for legacy clients that send numbers and booleans
//! as JSON strings ("10", "1", "true"). Empty strings read as zero/false.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

pub fn flexible_i64<'de, D>(de: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Lenient::deserialize(de)? {
        Lenient::Bool(b) => Ok(b as i64),
        Lenient::Int(n) => Ok(n),
        Lenient::Float(f) => Ok(f as i64),
        Lenient::Str(s) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(0)
            } else {
                s.parse().map_err(|_| serde::de::Error::custom("expected a number"))
            }
        }
    }
}

pub fn flexible_i32<'de, D>(de: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let n = flexible_i64(de)?;
    i32::try_from(n).map_err(|_| serde::de::Error::custom("number out of range"))
}

pub fn flexible_f64<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Lenient::deserialize(de)? {
        Lenient::Bool(b) => Ok(b as i64 as f64),
        Lenient::Int(n) => Ok(n as f64),
        Lenient::Float(f) => Ok(f),
        Lenient::Str(s) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(0.0)
            } else {
                s.parse().map_err(|_| serde::de::Error::custom("expected a number"))
            }
        }
    }
}

pub fn flexible_bool<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Lenient::deserialize(de)? {
        Lenient::Bool(b) => Ok(b),
        Lenient::Int(n) => Ok(n != 0),
        Lenient::Float(f) => Ok(f != 0.0),
        Lenient::Str(s) => {
            let s = s.trim();
            Ok(s == "1" || s.eq_ignore_ascii_case("true"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "flexible_i64")]
        n: i64,
        #[serde(deserialize_with = "flexible_bool")]
        b: bool,
        #[serde(deserialize_with = "flexible_f64")]
        f: f64,
    }

    #[test]
    fn accepts_strings_and_numbers() {
        let p: Probe = serde_json::from_str(r#"{"n":"10","b":"1","f":"4.5"}"#).unwrap();
        assert_eq!(p.n, 10);
        assert!(p.b);
        assert_eq!(p.f, 4.5);

        let p: Probe = serde_json::from_str(r#"{"n":10,"b":true,"f":4.5}"#).unwrap();
        assert_eq!(p.n, 10);
        assert!(p.b);
        assert_eq!(p.f, 4.5);
    }

    #[test]
    fn empty_string_reads_as_zero() {
        let p: Probe = serde_json::from_str(r#"{"n":"","b":"","f":""}"#).unwrap();
        assert_eq!(p.n, 0);
        assert!(!p.b);
        assert_eq!(p.f, 0.0);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(serde_json::from_str::<Probe>(r#"{"n":"ten","b":"1","f":"0"}"#).is_err());
    }

    #[derive(Deserialize)]
    struct Narrow {
        #[serde(deserialize_with = "flexible_i32")]
        n: i32,
    }

    #[test]
    fn i32_rejects_out_of_range_instead_of_truncating() {
        let p: Narrow = serde_json::from_str(r#"{"n":"7"}"#).unwrap();
        assert_eq!(p.n, 7);
        assert!(serde_json::from_str::<Narrow>(r#"{"n":4294967296}"#).is_err());
        assert!(serde_json::from_str::<Narrow>(r#"{"n":"-2147483649"}"#).is_err());
    }
}

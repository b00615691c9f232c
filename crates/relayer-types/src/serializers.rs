use serde::de::{Deserialize, Error as _};
use serde::{Deserializer, Serializer};
use subtle_encoding::{Encoding, Hex};

pub fn ser_hex_upper<S, T>(data: T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    let hex = Hex::upper_case()
        .encode_to_string(data)
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&hex)
}

pub fn deser_hex_upper<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let hex = String::deserialize(deserializer)?;
    Hex::upper_case()
        .decode(hex.as_bytes())
        .map_err(D::Error::custom)
}

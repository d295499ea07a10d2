use anyhow::Result;
use vpersona_core::naming::{decode_name, encode_name};

pub fn encode(name: &str) -> String {
    encode_name(name)
}

pub fn decode(key: &str) -> Result<String> {
    Ok(decode_name(key)?)
}

pub(crate) mod clusters;
pub(crate) mod frequency;
pub(crate) mod prompts;
pub(crate) mod sessions;
pub(crate) mod tool_calls;
pub(crate) mod workflows;

use anyhow::{Result, anyhow};
use skillmine_types::Source;

pub(crate) fn parse_source(value: &str) -> Result<Source> {
    value.parse::<Source>().map_err(|e| anyhow!(e))
}

pub(crate) fn encode_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T> {
    Ok(serde_json::from_str(raw)?)
}

//! Session inputs: cookies, the User-Agent pool and the city table
//!
//! These are the static collaborators a run is assembled from. All of them
//! are read once at startup and never touched again.

use crate::config::types::SessionConfig;
use crate::ConfigError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// User-Agent pool compiled into the binary
const BUNDLED_USER_AGENTS: &str = include_str!("../../data/USER_AGENTS.json");

/// City table compiled into the binary
const BUNDLED_CITY_CODES: &str = include_str!("../../data/CITY_CODE.json");

/// Cookie name to value, ordered so the seeded jar is deterministic
pub type CookieMap = BTreeMap<String, String>;

/// Converts a raw `Cookie` header into a map
///
/// Parts without `=` are skipped, keys and values are trimmed and the first
/// `=` splits the pair, so values may themselves contain `=`.
pub fn parse_cookie_string(raw: &str) -> CookieMap {
    raw.split(';')
        .map(str::trim)
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Loads cookies from a JSON object, a JSON list of pairs, or a raw header
pub fn load_cookie_file(path: &Path) -> Result<CookieMap, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }

    let raw = std::fs::read_to_string(path)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(CookieMap::new());
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map
            .into_iter()
            .map(|(key, value)| (key, json_scalar(&value)))
            .collect()),
        Ok(Value::Array(items)) => Ok(items
            .iter()
            .filter_map(|item| match item.as_array() {
                Some(pair) if pair.len() >= 2 => Some((json_scalar(&pair[0]), json_scalar(&pair[1]))),
                _ => None,
            })
            .collect()),
        _ => Ok(parse_cookie_string(raw)),
    }
}

fn json_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Merges cookie sources in precedence order; later sources override keys
///
/// Order: config string, config file, then the CLI string and CLI file.
pub fn collect_cookies(
    session: &SessionConfig,
    cli_string: Option<&str>,
    cli_file: Option<&Path>,
) -> Result<CookieMap, ConfigError> {
    let mut cookies = CookieMap::new();

    if let Some(raw) = session.cookie_string.as_deref() {
        cookies.extend(parse_cookie_string(raw));
    }
    if let Some(path) = session.cookie_file.as_deref() {
        cookies.extend(load_cookie_file(path)?);
    }
    if let Some(raw) = cli_string {
        cookies.extend(parse_cookie_string(raw));
    }
    if let Some(path) = cli_file {
        cookies.extend(load_cookie_file(path)?);
    }

    Ok(cookies)
}

/// Loads the JSON array of candidate User-Agent strings
///
/// Without a path the bundled pool is used, so a run does not depend on the
/// working directory.
pub fn load_user_agents(path: Option<&Path>) -> Result<Vec<String>, ConfigError> {
    let agents: Vec<String> = match path {
        Some(path) => read_json(path)?,
        None => parse_json(BUNDLED_USER_AGENTS, Path::new("data/USER_AGENTS.json"))?,
    };
    let agents: Vec<String> = agents
        .into_iter()
        .map(|ua| ua.trim().to_string())
        .filter(|ua| !ua.is_empty())
        .collect();

    if agents.is_empty() {
        return Err(ConfigError::Validation(format!(
            "User-Agent pool in {} is empty",
            path.map_or_else(|| "the bundled table".to_string(), |p| p.display().to_string())
        )));
    }

    Ok(agents)
}

/// Builds the User-Agent pool for a run
///
/// A forced agent (CLI first, then config) replaces the pool entirely and the
/// pool file is not read.
pub fn resolve_user_agents(
    session: &SessionConfig,
    cli_override: Option<&str>,
) -> Result<(Vec<String>, Option<String>), ConfigError> {
    let forced = cli_override
        .or(session.user_agent.as_deref())
        .map(str::trim)
        .filter(|ua| !ua.is_empty())
        .map(str::to_string);

    match forced {
        Some(ua) => Ok((vec![ua.clone()], Some(ua))),
        None => Ok((load_user_agents(session.user_agents_path.as_deref())?, None)),
    }
}

/// Loads the city name to subdomain code table, or the bundled one
pub fn load_city_codes(path: Option<&Path>) -> Result<BTreeMap<String, String>, ConfigError> {
    match path {
        Some(path) => read_json(path),
        None => parse_json(BUNDLED_CITY_CODES, Path::new("data/CITY_CODE.json")),
    }
}

/// Looks a city up in the table
pub fn resolve_city(codes: &BTreeMap<String, String>, city: &str) -> Result<String, ConfigError> {
    codes
        .get(city.trim())
        .cloned()
        .ok_or_else(|| ConfigError::UnknownCity(city.trim().to_string()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_json(&content, path)
}

fn parse_json<T: serde::de::DeserializeOwned>(content: &str, path: &Path) -> Result<T, ConfigError> {
    serde_json::from_str(content).map_err(|source| ConfigError::Json {
        path: PathBuf::from(path),
        source,
    })
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiKey {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub key: String,
    pub usage: u64,
    pub limit: Option<u64>,
    pub limit_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl ApiKey {
    /// The cap that applies to this key, if any. An enabled limit with no
    /// value leaves the key uncapped.
    pub fn effective_limit(&self) -> Option<u64> {
        self.limit.filter(|_| self.limit_enabled)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewApiKey {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_limit")]
    pub limit: Option<u64>,
    #[serde(default)]
    pub limit_enabled: bool,
}

impl NewApiKey {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("API key name is required".to_string());
        }
        Ok(())
    }
}

/// Partial edit of a key. `usage` and `key` are not editable; the counter only
/// moves through increments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiKeyUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_limit_patch")]
    pub limit: Option<Option<u64>>,
    #[serde(default)]
    pub limit_enabled: Option<bool>,
}

impl ApiKeyUpdate {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err("API key name cannot be empty".to_string());
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.limit.is_none() && self.limit_enabled.is_none()
    }

    pub fn apply(&self, key: &mut ApiKey) {
        if let Some(name) = &self.name {
            key.name = name.trim().to_string();
        }
        if let Some(limit) = self.limit {
            key.limit = limit;
        }
        if let Some(enabled) = self.limit_enabled {
            key.limit_enabled = enabled;
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LimitValue {
    Number(u64),
    Text(String),
}

// Dashboard forms submit the limit as a string, API clients as a number.
fn deserialize_limit<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LimitValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(LimitValue::Number(n)) => Ok(Some(n)),
        Some(LimitValue::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid limit: {}", s)))
        }
    }
}

fn deserialize_limit_patch<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<u64>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_limit(deserializer).map(Some)
}

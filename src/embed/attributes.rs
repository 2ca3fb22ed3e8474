use std::collections::HashMap;

use crate::config::{DEFAULT_BASE_URL, DEFAULT_PARTNER_ID};

pub const ATTR_PARTNER_ID: &str = "data-partner-id";
pub const ATTR_THEME: &str = "data-theme";
pub const ATTR_CONTAINER_ID: &str = "data-container-id";
pub const ATTR_API_URL: &str = "data-api-url";
pub const ATTR_REDIRECT: &str = "data-redirect";

/// Configuration carried by the hosting `<script>` tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptAttributes {
    pub partner_id: String,
    pub theme: String,
    pub container_id: Option<String>,
    pub api_url: String,
    pub redirect: Option<String>,
}

impl Default for ScriptAttributes {
    fn default() -> Self {
        Self {
            partner_id: DEFAULT_PARTNER_ID.to_string(),
            theme: "light".to_string(),
            container_id: None,
            api_url: DEFAULT_BASE_URL.to_string(),
            redirect: None,
        }
    }
}

impl ScriptAttributes {
    /// Reads the `data-*` attributes through `get`; empty values count as absent.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| get(name).filter(|value| !value.is_empty());
        let defaults = Self::default();

        Self {
            partner_id: read(ATTR_PARTNER_ID).unwrap_or(defaults.partner_id),
            theme: read(ATTR_THEME).unwrap_or(defaults.theme),
            container_id: read(ATTR_CONTAINER_ID),
            api_url: read(ATTR_API_URL).unwrap_or(defaults.api_url),
            redirect: read(ATTR_REDIRECT),
        }
    }

    pub fn from_map(attributes: &HashMap<String, String>) -> Self {
        Self::from_lookup(|name| attributes.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let attributes = ScriptAttributes::from_map(&HashMap::new());
        assert_eq!(attributes, ScriptAttributes::default());
        assert_eq!(attributes.partner_id, "default");
        assert_eq!(attributes.theme, "light");
    }

    #[test]
    fn test_all_attributes() {
        let attributes = ScriptAttributes::from_map(&HashMap::from([
            (ATTR_PARTNER_ID.to_string(), "acme".to_string()),
            (ATTR_THEME.to_string(), "dark".to_string()),
            (ATTR_CONTAINER_ID.to_string(), "earn-root".to_string()),
            (ATTR_API_URL.to_string(), "https://api.acme.test".to_string()),
            (ATTR_REDIRECT.to_string(), "https://acme.test/earn".to_string()),
        ]));

        assert_eq!(attributes.partner_id, "acme");
        assert_eq!(attributes.container_id.as_deref(), Some("earn-root"));
        assert_eq!(attributes.api_url, "https://api.acme.test");
        assert_eq!(attributes.redirect.as_deref(), Some("https://acme.test/earn"));
    }

    #[test]
    fn test_empty_redirect_is_absent() {
        let attributes = ScriptAttributes::from_map(&HashMap::from([(
            ATTR_REDIRECT.to_string(),
            String::new(),
        )]));
        assert!(attributes.redirect.is_none());
    }
}

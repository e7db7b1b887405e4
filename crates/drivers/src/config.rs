use lite_market_application::PermissionStatus;

const ENV_PREFIX: &str = "LITE_MARKET_";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_path: String,
    pub blob_root: String,
    pub public_base_url: String,
    pub bucket: String,
    pub library_root: String,
    pub compressed_dir: String,
    pub media_permission: PermissionStatus,
    pub session_email: String,
    pub session_password: String,
    pub page_width: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "market.sqlite3".to_string(),
            blob_root: "storage".to_string(),
            public_base_url: "http://localhost:54321/storage/v1/object/public".to_string(),
            bucket: "item-images".to_string(),
            library_root: "library".to_string(),
            compressed_dir: "cache/compressed".to_string(),
            media_permission: PermissionStatus::Granted,
            session_email: "seller@example.com".to_string(),
            session_password: "local".to_string(),
            page_width: 390.0,
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with `LITE_MARKET_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(path) = var("DATABASE_PATH") {
            config.database_path = path;
        }
        if let Some(root) = var("BLOB_ROOT") {
            config.blob_root = root;
        }
        if let Some(url) = var("PUBLIC_BASE_URL") {
            config.public_base_url = url;
        }
        if let Some(bucket) = var("BUCKET") {
            if bucket.trim().is_empty() {
                tracing::warn!("empty LITE_MARKET_BUCKET, using default");
            } else {
                config.bucket = bucket;
            }
        }
        if let Some(root) = var("LIBRARY_ROOT") {
            config.library_root = root;
        }
        if let Some(dir) = var("COMPRESSED_DIR") {
            config.compressed_dir = dir;
        }
        if let Some(value) = var("MEDIA_PERMISSION") {
            match value.trim().to_ascii_lowercase().as_str() {
                "granted" => config.media_permission = PermissionStatus::Granted,
                "denied" => config.media_permission = PermissionStatus::Denied,
                _ => tracing::warn!(
                    value = %value,
                    "invalid LITE_MARKET_MEDIA_PERMISSION, using default"
                ),
            }
        }
        if let Some(email) = var("SESSION_EMAIL") {
            config.session_email = email;
        }
        if let Some(password) = var("SESSION_PASSWORD") {
            config.session_password = password;
        }
        if let Some(value) = var("PAGE_WIDTH") {
            match value.trim().parse::<f64>() {
                Ok(width) if width.is_finite() && width > 0.0 => config.page_width = width,
                _ => tracing::warn!(
                    value = %value,
                    "invalid LITE_MARKET_PAGE_WIDTH, using default"
                ),
            }
        }

        config
    }

    pub fn has_session_credentials(&self) -> bool {
        !self.session_email.trim().is_empty() && !self.session_password.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_need_no_environment() {
        let config = config_from(&[]);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bucket, "item-images");
        assert!(config.has_session_credentials());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = config_from(&[
            ("LITE_MARKET_DATABASE_PATH", "/tmp/m.sqlite3"),
            ("LITE_MARKET_MEDIA_PERMISSION", "Denied"),
            ("LITE_MARKET_PAGE_WIDTH", "412.5"),
            ("LITE_MARKET_SESSION_PASSWORD", ""),
        ]);
        assert_eq!(config.database_path, "/tmp/m.sqlite3");
        assert_eq!(config.media_permission, PermissionStatus::Denied);
        assert_eq!(config.page_width, 412.5);
        assert!(!config.has_session_credentials());
    }

    #[test]
    fn malformed_values_keep_defaults() {
        let config = config_from(&[
            ("LITE_MARKET_MEDIA_PERMISSION", "maybe"),
            ("LITE_MARKET_PAGE_WIDTH", "-3"),
            ("LITE_MARKET_BUCKET", "  "),
        ]);
        let defaults = AppConfig::default();
        assert_eq!(config.media_permission, defaults.media_permission);
        assert_eq!(config.page_width, defaults.page_width);
        assert_eq!(config.bucket, defaults.bucket);
    }
}

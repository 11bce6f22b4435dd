//! Daemon settings

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Server bind settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// Host the API listens on
    pub listen_host: String,
    /// Port the API listens on
    pub listen_port: u16,
}

impl Default for Info {
    fn default() -> Self {
        Info {
            listen_host: "127.0.0.1".to_string(),
            listen_port: 3000,
        }
    }
}

/// Razorpay gateway settings
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Razorpay {
    /// API key id
    pub key_id: String,
    /// API key secret
    pub key_secret: String,
}

impl std::fmt::Debug for Razorpay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Razorpay")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .finish()
    }
}

/// ntfy push channel settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ntfy {
    /// Server base, defaults to the public ntfy.sh instance
    pub api_url: Option<String>,
    /// Topic order alerts are published to
    pub topic: String,
}

/// Resend email channel settings. The channel runs unconfigured when
/// the key is absent and reports itself as skipped per order.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Resend {
    /// API key, optional
    pub api_key: Option<String>,
    /// Sender address
    pub from: String,
    /// Seller address alerts are delivered to
    pub to: String,
}

impl std::fmt::Debug for Resend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resend")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

/// Full daemon settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Bind settings
    pub info: Info,
    /// Payment gateway settings
    pub razorpay: Razorpay,
    /// Push channel settings
    pub ntfy: Ntfy,
    /// Email channel settings, optional
    pub resend: Option<Resend>,
}

impl Settings {
    /// Load settings from defaults, overridden by an optional config
    /// file, overridden by `DUKAND__` environment variables
    pub fn new<P>(config_file_name: Option<P>) -> Result<Self, ConfigError>
    where
        P: Into<PathBuf>,
    {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(config_file_name) = config_file_name {
            let config = config_file_name.into().to_string_lossy().to_string();
            builder = builder.add_source(File::with_name(&config));
        }

        builder
            .add_source(Environment::with_prefix("DUKAND").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::new::<PathBuf>(None).unwrap();
        assert_eq!(settings.info.listen_host, "127.0.0.1");
        assert_eq!(settings.info.listen_port, 3000);
        assert!(settings.resend.is_none());
    }
}

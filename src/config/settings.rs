//! Application settings structs, defaults, TOML persistence and environment
//! overrides.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files.  Every field is
//! defaulted, so a partial `settings.toml` is valid.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

/// Environment variable naming the storage bucket override.
pub const ENV_BUCKET: &str = "WAVFILE_BUCKET";
/// Environment variable naming the bot alias ARN.
pub const ENV_BOT_ARN: &str = "BOT_ARN";
/// Environment variable selecting the scenario.
pub const ENV_SCENARIO: &str = "CALL_FLOW_SCENARIO";
/// Environment variable pointing at an explicit `settings.toml`.
pub const ENV_CONFIG_PATH: &str = "CALL_FLOWS_CONFIG";

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

/// Selects which call flow answers invocations.
///
/// | Variant      | Flow                                                  |
/// |--------------|-------------------------------------------------------|
/// | Record       | prompt → beep → record → play the recording back      |
/// | Transcribe   | prompt → beep → record → transcribe → speak the text  |
/// | Bot          | hand the caller to a bot dialog, retry on fallback    |
/// | Bridge       | collect a number → bridge → toggle voice focus        |
/// | CallBack     | hang up, then call the caller back                    |
/// | Play         | play a greeting and hang up                           |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    #[default]
    Record,
    Transcribe,
    Bot,
    Bridge,
    CallBack,
    Play,
}

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Scenario::Record,
        Scenario::Transcribe,
        Scenario::Bot,
        Scenario::Bridge,
        Scenario::CallBack,
        Scenario::Play,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Record => "record",
            Scenario::Transcribe => "transcribe",
            Scenario::Bot => "bot",
            Scenario::Bridge => "bridge",
            Scenario::CallBack => "call_back",
            Scenario::Play => "play",
        }
    }

    /// Parse a scenario name; accepts `-` in place of `_`.
    pub fn parse(name: &str) -> Option<Self> {
        let normalised = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == normalised)
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

/// Audio / transcript object storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Bucket override.  `None` omits `BucketName` from every audio action and
    /// leaves the choice of bucket to the platform.
    pub bucket: Option<String>,
    /// Base URL of the object-storage gateway.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            base_url: "http://localhost:9000".into(),
            timeout_secs: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Voice used by `Speak` and `SpeakAndGetDigits`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// `standard` or `neural`.
    pub engine: String,
    pub language_code: String,
    pub voice_id: String,
    /// Voice for digit-collection prompts.
    pub digits_voice_id: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            engine: "neural".into(),
            language_code: "en-US".into(),
            voice_id: "Matthew".into(),
            digits_voice_id: "Joanna".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TranscriptionConfig
// ---------------------------------------------------------------------------

/// Transcription job settings and the poll budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Base URL of the transcription gateway.
    pub base_url: String,
    pub language_code: String,
    pub media_format: String,
    /// Sleep between two status polls.
    pub poll_interval_ms: u64,
    /// Polls attempted before the job is given up on.
    pub max_poll_attempts: u32,
    /// Wall-clock cap on the whole poll loop, slow polls included.
    pub max_poll_wait_ms: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".into(),
            language_code: "en-US".into(),
            media_format: "wav".into(),
            poll_interval_ms: 500,
            max_poll_attempts: 40,
            max_poll_wait_ms: 20_000,
            timeout_secs: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// BotConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub alias_arn: String,
    pub locale_id: String,
    pub welcome_message: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            alias_arn: "paste-arn-here".into(),
            locale_id: "en_US".into(),
            welcome_message: "Welcome to AWS Chime SDK Voice Service. Please say what you would like to do.  For example: I'd like to book a room, or, I'd like to rent a car.".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TelephonyConfig
// ---------------------------------------------------------------------------

/// Outbound call placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelephonyConfig {
    /// Base URL of the telephony gateway.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8082".into(),
            timeout_secs: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration, serialised as `settings.toml`.
///
/// Resolved once at start and shared read-only afterwards.
///
/// ```rust,no_run
/// use call_flows::config::AppConfig;
///
/// // File (or defaults), then WAVFILE_BUCKET / BOT_ARN / CALL_FLOW_SCENARIO.
/// let config = AppConfig::load().unwrap().with_env_overrides();
/// println!("{}", config.scenario);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub scenario: Scenario,
    pub storage: StorageConfig,
    pub speech: SpeechConfig,
    pub transcription: TranscriptionConfig,
    pub bot: BotConfig,
    pub telephony: TelephonyConfig,
}

impl AppConfig {
    /// Load from `CALL_FLOWS_CONFIG` if set, else the platform-appropriate
    /// `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist.
    pub fn load() -> Result<Self> {
        match std::env::var_os(ENV_CONFIG_PATH) {
            Some(path) => Self::load_from(std::path::Path::new(&path)),
            None => Self::load_from(&AppPaths::new().settings_file),
        }
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`.
    ///
    /// An empty `WAVFILE_BUCKET` counts as unset.  An unrecognized scenario
    /// name is ignored with a warning.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bucket) = lookup(ENV_BUCKET) {
            let bucket = bucket.trim();
            self.storage.bucket = (!bucket.is_empty()).then(|| bucket.to_string());
        }

        if let Some(arn) = lookup(ENV_BOT_ARN).filter(|s| !s.trim().is_empty()) {
            self.bot.alias_arn = arn.trim().to_string();
        }

        if let Some(name) = lookup(ENV_SCENARIO) {
            match Scenario::parse(&name) {
                Some(scenario) => self.scenario = scenario,
                None => log::warn!("ignoring unknown {ENV_SCENARIO}={name:?}"),
            }
        }

        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.scenario, Scenario::Record);
        assert!(cfg.storage.bucket.is_none());
        assert_eq!(cfg.speech.engine, "neural");
        assert_eq!(cfg.speech.voice_id, "Matthew");
        assert_eq!(cfg.speech.digits_voice_id, "Joanna");
        assert_eq!(cfg.transcription.poll_interval_ms, 500);
        assert_eq!(cfg.transcription.max_poll_attempts, 40);
        assert_eq!(cfg.transcription.max_poll_wait_ms, 20_000);
        assert_eq!(cfg.bot.locale_id, "en_US");
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("settings.toml");

        let mut cfg = AppConfig::default();
        cfg.scenario = Scenario::Transcribe;
        cfg.storage.bucket = Some("wav-bucket".into());
        cfg.transcription.max_poll_attempts = 7;
        cfg.bot.alias_arn = "arn:aws:lex:us-east-1:123:bot-alias/B/A".into();

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.scenario, Scenario::Transcribe);
        assert_eq!(loaded.storage.bucket.as_deref(), Some("wav-bucket"));
        assert_eq!(loaded.transcription.max_poll_attempts, 7);
        assert_eq!(loaded.bot.alias_arn, cfg.bot.alias_arn);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let config = AppConfig::load_from(&dir.path().join("nope.toml")).expect("no error");
        assert_eq!(config.scenario, Scenario::Record);
        assert!(config.storage.bucket.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "scenario = \"bridge\"\n[storage]\nbucket = \"b\"\n").unwrap();

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.scenario, Scenario::Bridge);
        assert_eq!(cfg.storage.bucket.as_deref(), Some("b"));
        assert_eq!(cfg.storage.timeout_secs, 5);
        assert_eq!(cfg.speech.voice_id, "Matthew");
    }

    #[test]
    fn env_overrides_apply() {
        let cfg = AppConfig::default().with_overrides(lookup_from(&[
            (ENV_BUCKET, "fake-bucket"),
            (ENV_BOT_ARN, "arn:bot"),
            (ENV_SCENARIO, "call-back"),
        ]));
        assert_eq!(cfg.storage.bucket.as_deref(), Some("fake-bucket"));
        assert_eq!(cfg.bot.alias_arn, "arn:bot");
        assert_eq!(cfg.scenario, Scenario::CallBack);
    }

    #[test]
    fn empty_bucket_override_unsets_bucket() {
        let mut cfg = AppConfig::default();
        cfg.storage.bucket = Some("from-file".into());
        let cfg = cfg.with_overrides(lookup_from(&[(ENV_BUCKET, "")]));
        assert!(cfg.storage.bucket.is_none());
    }

    #[test]
    fn unknown_scenario_override_is_ignored() {
        let cfg = AppConfig::default().with_overrides(lookup_from(&[(ENV_SCENARIO, "karaoke")]));
        assert_eq!(cfg.scenario, Scenario::Record);
    }

    #[test]
    fn scenario_names_round_trip() {
        for scenario in Scenario::ALL {
            assert_eq!(Scenario::parse(scenario.as_str()), Some(scenario));
        }
        assert_eq!(Scenario::parse(" Transcribe "), Some(Scenario::Transcribe));
    }
}

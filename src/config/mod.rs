//! Configuration module.
//!
//! Provides `AppConfig` (top-level settings), sub-configs per capability,
//! `AppPaths` for the platform config directory, TOML persistence and the
//! environment overrides resolved once at process start.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, BotConfig, Scenario, SpeechConfig, StorageConfig, TelephonyConfig,
    TranscriptionConfig, ENV_BOT_ARN, ENV_BUCKET, ENV_CONFIG_PATH, ENV_SCENARIO,
};

use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks. Falls back to loading `config.toml` if
/// nothing has been initialized yet.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::load()))
        .load_full()
}

/// Initialize the global configuration from "config.toml"
///
/// If the file doesn't exist, uses in-memory defaults plus `LS__*`
/// environment overrides.
///
/// # Examples
/// ```no_run
/// use linkshepherd::config::init_config;
/// init_config();
/// ```
pub fn init_config() {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::load()));
}

/// Initialize the global configuration from a custom TOML path
pub fn init_config_from(path: &str) {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::load_from(path)));
}

/// 替换当前配置（测试和 CLI 覆盖参数时使用）
pub fn set_config(config: StaticConfig) {
    let config = Arc::new(config);
    CONFIG
        .get_or_init(|| ArcSwap::new(config.clone()))
        .store(config);
}

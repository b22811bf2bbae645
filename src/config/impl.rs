use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks. Falls back to `config.toml` when nothing
/// was initialized yet.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::load(None)))
        .load_full()
}

/// Initialize the global configuration from `config.toml`
///
/// # Examples
/// ```no_run
/// use linkace::config::init_config;
/// init_config();
/// ```
pub fn init_config() {
    init_config_with_path(None);
}

/// Initialize the global configuration from an explicit file path
///
/// Only the first call has an effect.
pub fn init_config_with_path(path: Option<&str>) {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::load(path)));
}

/// 原子替换当前配置（测试和运行期热更新用）
pub fn update_config<F>(f: F)
where
    F: FnOnce(&mut StaticConfig),
{
    let current = get_config();
    let mut next = (*current).clone();
    f(&mut next);
    if let Some(slot) = CONFIG.get() {
        slot.store(Arc::new(next));
    }
}

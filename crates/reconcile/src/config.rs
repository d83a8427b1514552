use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Register relayed names with the host's autocomplete list.
    pub use_autocomplete: bool,
    /// Wrap relayed names in `decorator_left` / `decorator_right`.
    pub use_decorators: bool,
    /// Hide join, quit and condensed system rows.
    pub remove_join_quit: bool,
    pub decorator_left: String,
    pub decorator_right: String,
    /// Delay before the single color lookup retry.
    pub color_retry_ms: u64,
    pub sweep_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            use_autocomplete: true,
            use_decorators: true,
            remove_join_quit: false,
            decorator_left: "(".to_string(),
            decorator_right: ")".to_string(),
            color_retry_ms: 200,
            sweep_interval_ms: 2000,
        }
    }
}

impl EngineConfig {
    pub fn label_for(&self, name: &str) -> String {
        if self.use_decorators {
            format!("{}{name}{}", self.decorator_left, self.decorator_right)
        } else {
            name.to_string()
        }
    }
}

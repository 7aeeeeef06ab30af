use futures::stream::BoxStream;

pub const SETTING_ROUTING_METHOD: &str = "Livechat_Routing_Method";
pub const SETTING_ENABLE_BUSINESS_HOURS: &str = "Livechat_enable_business_hours";
pub const SETTING_DISABLE_ACTIVITY_MONITOR: &str = "Troubleshoot_Disable_Livechat_Activity_Monitor";
pub const SETTING_LANGUAGE: &str = "Language";

/// Source of dynamic configuration changes
pub trait SettingWatcher: Send + Sync {
    /// Stream of values for one setting, current value first, in order of change
    fn watch(&self, name: &str) -> BoxStream<'static, serde_json::Value>;

    /// Current value, if the setting has been set
    fn get(&self, name: &str) -> Option<serde_json::Value>;
}

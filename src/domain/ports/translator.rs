/// Localization lookup; unknown keys fall back to the key itself
pub trait Translator: Send + Sync {
    fn translate(&self, key: &str, params: &[(&str, &str)], locale: &str) -> String;
}

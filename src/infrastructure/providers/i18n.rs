use crate::domain::ports::translator::Translator;
use std::collections::HashMap;

const FALLBACK_LOCALE: &str = "en";

const CATALOG: &[(&str, &str, &str)] = &[
    ("en", "Notify_all_in_this_room", "Notify all in this room"),
    ("en", "error-action-not-allowed", "__action__ is not allowed"),
    (
        "en",
        "You_cant_leave_a_livechat_room_Please_use_the_close_button",
        "You can't leave a omnichannel room. Please, use the close button.",
    ),
    ("pt-BR", "Notify_all_in_this_room", "Notificar todos nesta sala"),
    ("pt-BR", "error-action-not-allowed", "__action__ não é permitido"),
    (
        "pt-BR",
        "You_cant_leave_a_livechat_room_Please_use_the_close_button",
        "Você não pode sair de uma sala de omnichannel. Por favor, use o botão fechar.",
    ),
    ("es", "Notify_all_in_this_room", "Notificar a todos en esta sala"),
    ("es", "error-action-not-allowed", "__action__ no está permitido"),
    (
        "es",
        "You_cant_leave_a_livechat_room_Please_use_the_close_button",
        "No puede abandonar una sala de omnichannel. Por favor, use el botón de cierre.",
    ),
];

/// Translator backed by the built-in catalog. Lookup falls back from the
/// requested locale to its base language, then English, then the key itself.
pub struct StaticTranslator {
    entries: HashMap<(String, String), String>,
}

impl StaticTranslator {
    pub fn new() -> Self {
        let entries = CATALOG
            .iter()
            .map(|(locale, key, text)| ((locale.to_string(), key.to_string()), text.to_string()))
            .collect();
        Self { entries }
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&String> {
        self.entries.get(&(locale.to_string(), key.to_string()))
    }
}

impl Default for StaticTranslator {
    fn default() -> Self {
        Self::new()
    }
}

fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    params.iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("__{}__", name), value)
    })
}

impl Translator for StaticTranslator {
    fn translate(&self, key: &str, params: &[(&str, &str)], locale: &str) -> String {
        let base = locale.split(['-', '_']).next().unwrap_or(locale);
        let template = self
            .lookup(locale, key)
            .or_else(|| self.lookup(base, key))
            .or_else(|| self.lookup(FALLBACK_LOCALE, key));

        match template {
            Some(template) => interpolate(template, params),
            None => {
                tracing::debug!("Missing translation for {} ({})", key, locale);
                key.to_string()
            }
        }
    }
}

use std::collections::HashMap;

pub const MANUAL_CANCELLATION_MESSAGE: &str =
    "Can't cancel current order. Please cancel it by Mundipagg panel";

pub trait Localization: Send + Sync {
    fn translate(&self, message: &str) -> String;
}

/// Built-in dashboard translations. Unknown locales and messages fall back to the source text.
pub struct StaticCatalog {
    locale: String,
    entries: HashMap<&'static str, &'static str>,
}

impl StaticCatalog {
    pub fn new(locale: &str) -> Self {
        let locale = locale.trim().replace('-', "_");
        let entries = match locale.as_str() {
            "pt_BR" => HashMap::from([(
                MANUAL_CANCELLATION_MESSAGE,
                "Não foi possível cancelar o pedido atual. Por favor, cancele-o pelo painel da Mundipagg",
            )]),
            "es_ES" => HashMap::from([(
                MANUAL_CANCELLATION_MESSAGE,
                "No se puede cancelar el pedido actual. Por favor, cancélelo desde el panel de Mundipagg",
            )]),
            _ => HashMap::new(),
        };
        Self { locale, entries }
    }

    pub fn locale(&self) -> &str { &self.locale }
}

impl Localization for StaticCatalog {
    fn translate(&self, message: &str) -> String {
        self.entries
            .get(message)
            .map(|translated| translated.to_string())
            .unwrap_or_else(|| message.to_string())
    }
}

// src/common/i18n.rs

use std::collections::HashMap;

const FALLBACK_LANG: &str = "en";

// Catálogo em inglês (idioma padrão)
const EN: &[(&str, &str)] = &[
    ("validation_failed", "One or more fields are invalid."),
    ("invalid_token", "Invalid or missing authentication token."),
    ("user_not_found", "User not found."),
    ("forbidden", "You are not allowed to {ability} {model}."),
    ("not_found", "The requested {resource} was not found."),
    ("upload_failed", "Failed to upload {field}."),
    ("persistence_failed", "Failed to save {resource}."),
    ("no_active_closet", "You have no active closet."),
    ("already_exists", "{value} already exists."),
    ("internal_error", "An unexpected error occurred."),
    // Validação de campos
    ("name_required", "The name is required."),
    ("email_invalid", "The email is invalid."),
    ("abbreviation_length", "The abbreviation must have between 1 and 10 characters."),
    ("sku_required", "The SKU is required."),
    ("reference_required", "The reference is required."),
    ("address_line_1_required", "The address line is required."),
    ("address_zip_code_required", "The zip code is required."),
    ("address_city_required", "The city is required."),
    ("address_country_required", "The country is required."),
    ("logo_required", "The logo is required."),
    ("price_negative", "The price cannot be negative."),
    ("quantity_positive", "The quantity must be at least 1."),
    ("uuid_invalid", "The value is not a valid identifier."),
    // Mensagens de redirecionamento
    ("agency-created", "Agency created."),
    ("agency-updated", "Agency updated."),
    ("company-created", "Company created."),
    ("company-updated", "Company updated."),
    ("product-created", "Product created."),
    ("product-updated", "Product updated."),
    ("variant-created", "Variant created."),
    ("shipment-created", "Shipment created."),
    ("shipment-updated", "Shipment updated."),
    ("shipment-variant-added", "Variant added to the shipment."),
    ("shipment-variant-kept", "Variant was already in the shipment."),
    ("shipment-variant-removed", "Variant removed from the shipment."),
    ("shipment-variant-absent", "Variant was not in the shipment."),
    ("user-attached", "User attached."),
    ("user-detached", "User detached."),
    ("deleted", "{name} is deleted."),
];

// Catálogo em português
const PT: &[(&str, &str)] = &[
    ("validation_failed", "Um ou mais campos são inválidos."),
    ("invalid_token", "Token de autenticação inválido ou ausente."),
    ("user_not_found", "Usuário não encontrado."),
    ("forbidden", "Você não tem permissão para {ability} em {model}."),
    ("not_found", "O recurso {resource} não foi encontrado."),
    ("upload_failed", "Falha ao enviar {field}."),
    ("persistence_failed", "Falha ao salvar {resource}."),
    ("no_active_closet", "Você não possui um closet ativo."),
    ("already_exists", "{value} já existe."),
    ("internal_error", "Ocorreu um erro inesperado."),
    ("name_required", "O nome é obrigatório."),
    ("email_invalid", "O e-mail fornecido é inválido."),
    ("abbreviation_length", "A sigla deve ter entre 1 e 10 caracteres."),
    ("sku_required", "O SKU é obrigatório."),
    ("reference_required", "A referência é obrigatória."),
    ("address_line_1_required", "O endereço é obrigatório."),
    ("address_zip_code_required", "O CEP é obrigatório."),
    ("address_city_required", "A cidade é obrigatória."),
    ("address_country_required", "O país é obrigatório."),
    ("logo_required", "O logo é obrigatório."),
    ("price_negative", "O preço não pode ser negativo."),
    ("quantity_positive", "A quantidade deve ser no mínimo 1."),
    ("uuid_invalid", "O valor não é um identificador válido."),
    ("agency-created", "Agência criada."),
    ("agency-updated", "Agência atualizada."),
    ("company-created", "Empresa criada."),
    ("company-updated", "Empresa atualizada."),
    ("product-created", "Produto criado."),
    ("product-updated", "Produto atualizado."),
    ("variant-created", "Variante criada."),
    ("shipment-created", "Remessa criada."),
    ("shipment-updated", "Remessa atualizada."),
    ("shipment-variant-added", "Variante adicionada à remessa."),
    ("shipment-variant-kept", "A variante já estava na remessa."),
    ("shipment-variant-removed", "Variante removida da remessa."),
    ("shipment-variant-absent", "A variante não estava na remessa."),
    ("user-attached", "Usuário vinculado."),
    ("user-detached", "Usuário desvinculado."),
    ("deleted", "{name} foi excluído."),
];

/// Catálogo de mensagens por idioma, carregado uma vez no AppState.
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        let mut catalogs = HashMap::new();
        catalogs.insert("en", EN.iter().copied().collect());
        catalogs.insert("pt", PT.iter().copied().collect());
        Self { catalogs }
    }
}

impl I18nStore {
    /// Traduz uma chave. Idioma desconhecido cai no inglês; chave desconhecida volta como está.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.lookup(lang, key)
            .or_else(|| self.lookup(FALLBACK_LANG, key))
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string())
    }

    /// Traduz e substitui os marcadores `{nome}` pelos valores dados.
    pub fn translate_with(&self, lang: &str, key: &str, params: &[(&str, &str)]) -> String {
        let mut message = self.translate(lang, key);
        for (name, value) in params {
            message = message.replace(&format!("{{{name}}}"), value);
        }
        message
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&'static str> {
        self.catalogs.get(lang).and_then(|c| c.get(key)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_falls_back_to_english() {
        let store = I18nStore::default();
        assert_eq!(store.translate("de", "agency-created"), "Agency created.");
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let store = I18nStore::default();
        assert_eq!(store.translate("pt", "nope"), "nope");
    }

    #[test]
    fn placeholders_are_replaced() {
        let store = I18nStore::default();
        assert_eq!(
            store.translate_with("pt", "deleted", &[("name", "ACME")]),
            "ACME foi excluído."
        );
    }

    #[test]
    fn catalogs_have_the_same_keys() {
        let en: Vec<_> = EN.iter().map(|(k, _)| *k).collect();
        let pt: Vec<_> = PT.iter().map(|(k, _)| *k).collect();
        assert_eq!(en, pt);
    }
}

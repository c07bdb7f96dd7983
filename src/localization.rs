//! # Localization Module
//!
//! User-facing strings (notifications, quick filter labels, CLI output) are
//! Fluent messages. English and French resources are compiled into the
//! binary; lookups in other languages fall back to English.

use anyhow::{anyhow, Result};
use fluent_bundle::{FluentArgs, FluentBundle, FluentResource, FluentValue};
use log::warn;
use std::collections::HashMap;
use unic_langid::LanguageIdentifier;

pub const FALLBACK_LANGUAGE: &str = "en";

const RESOURCES: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en/main.ftl")),
    ("fr", include_str!("../locales/fr/main.ftl")),
];

/// Localization manager holding one Fluent bundle per supported language
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
    language: String,
}

impl LocalizationManager {
    /// Create a manager whose default language is `language`.
    /// Unsupported languages fall back to English.
    pub fn new(language: &str) -> Result<Self> {
        let mut bundles = HashMap::new();
        for (lang, source) in RESOURCES {
            bundles.insert(lang.to_string(), Self::create_bundle(lang, source)?);
        }

        let language = normalize_language(language);
        let language = if bundles.contains_key(&language) {
            language
        } else {
            warn!("Unsupported language {language:?}, using {FALLBACK_LANGUAGE}");
            FALLBACK_LANGUAGE.to_string()
        };

        Ok(Self { bundles, language })
    }

    fn create_bundle(lang: &str, source: &str) -> Result<FluentBundle<FluentResource>> {
        let locale: LanguageIdentifier = lang.parse()?;
        let mut bundle = FluentBundle::new(vec![locale]);
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("Invalid Fluent resource for {lang}: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("Duplicate Fluent messages for {lang}: {errors:?}"))?;
        Ok(bundle)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn is_supported(&self, language: &str) -> bool {
        self.bundles.contains_key(&normalize_language(language))
    }

    /// Get a message in a specific language, falling back to English when the
    /// language or the key is missing there
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let language = normalize_language(language);
        let fallback = self.bundles.get(FALLBACK_LANGUAGE);
        let bundle = self.bundles.get(&language).or(fallback);

        let message = bundle
            .and_then(|b| b.get_message(key).map(|m| (b, m)))
            .or_else(|| fallback.and_then(|b| b.get_message(key).map(|m| (b, m))));

        let Some((bundle, message)) = message else {
            return format!("Missing translation: {key}");
        };
        let Some(pattern) = message.value() else {
            return format!("Missing value for key: {key}");
        };

        let fluent_args = args.map(|args| {
            FluentArgs::from_iter(args.iter().map(|(k, v)| (*k, FluentValue::from(*v))))
        });

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            warn!("Errors formatting {key}: {errors:?}");
        }
        value.into_owned()
    }

    /// Message in the default language
    pub fn t(&self, key: &str) -> String {
        self.get_message_in_language(key, &self.language, None)
    }

    /// Message in the default language with string arguments
    pub fn t_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        let args: HashMap<&str, &str> = args.iter().cloned().collect();
        self.get_message_in_language(key, &self.language, Some(&args))
    }
}

/// Pick the supported language for a locale tag such as "fr-CA",
/// defaulting to English
pub fn detect_language(locale: Option<&str>) -> &'static str {
    let language = locale.map(normalize_language).unwrap_or_default();
    RESOURCES
        .iter()
        .map(|(lang, _)| *lang)
        .find(|lang| *lang == language)
        .unwrap_or(FALLBACK_LANGUAGE)
}

/// "fr-FR" and "FR" both select the French bundle
fn normalize_language(language: &str) -> String {
    language
        .trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

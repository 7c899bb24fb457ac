// src/logs/title.rs

use std::collections::BTreeMap;

use crate::config::TitleSection;
use crate::registry::TaskRegistry;

#[derive(Debug, Clone)]
struct TitleRule {
    contains: String,
    title: String,
    categorize: bool,
}

/// Derives listing titles from log stems.
///
/// Order: the label of the one registered task owning the stem, then the
/// first matching substring rule (optionally suffixed with a category token
/// found in the stem), then the configured fallback, then the stem.
#[derive(Debug, Clone, Default)]
pub struct TitleResolver {
    labels: BTreeMap<String, String>,
    rules: Vec<TitleRule>,
    categories: Vec<String>,
    fallback: Option<String>,
}

impl TitleResolver {
    pub fn new(section: &TitleSection, registry: &TaskRegistry) -> Self {
        let labels = registry
            .iter()
            .filter_map(|def| {
                registry
                    .label_for_stem(&def.stem)
                    .map(|label| (def.stem.clone(), label.to_string()))
            })
            .collect();

        Self {
            labels,
            rules: section
                .rules
                .iter()
                .map(|r| TitleRule {
                    contains: r.contains.clone(),
                    title: r.title.clone(),
                    categorize: r.categorize,
                })
                .collect(),
            categories: section.categories.clone(),
            fallback: section.fallback.clone(),
        }
    }

    pub fn title_for(&self, stem: &str) -> String {
        if let Some(label) = self.labels.get(stem) {
            return label.clone();
        }

        if let Some(rule) = self.rules.iter().find(|r| stem.contains(&r.contains)) {
            return match self.category_of(stem).filter(|_| rule.categorize) {
                Some(cat) => format!("{} – {}", rule.title, cat),
                None => rule.title.clone(),
            };
        }

        self.fallback.clone().unwrap_or_else(|| stem.to_string())
    }

    /// First configured category appearing as a whole token of the stem.
    fn category_of(&self, stem: &str) -> Option<&str> {
        let tokens: Vec<&str> = stem
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        self.categories
            .iter()
            .find(|cat| tokens.iter().any(|t| t.eq_ignore_ascii_case(cat)))
            .map(|c| c.as_str())
    }
}

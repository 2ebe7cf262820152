//! Selector composition for readiness waits and availability checks
//!
//! Both selectors a target needs are derived from its matcher configuration
//! exactly once, at construction. Class candidates become one attribute
//! substring selector each; id groups become one compound selector per
//! group, where every fragment must match the same element.

use scraper::Selector;

use crate::config::{MatchMode, TargetConfig};

/// One evaluation candidate: a compiled selector plus its CSS text for logs
#[derive(Debug, Clone)]
pub struct Candidate {
    css: String,
    selector: Selector,
}

impl Candidate {
    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

/// Compiled selectors for one target
#[derive(Debug, Clone)]
pub struct Matcher {
    readiness_selector: String,
    candidates: Vec<Candidate>,
}

impl Matcher {
    /// Build the readiness selector and the ordered evaluation candidates.
    /// Fragments that produce an unparsable selector are a configuration
    /// error, reported before the target ever polls.
    pub fn from_config(config: &TargetConfig) -> crate::Result<Self> {
        let css_candidates: Vec<String> = match config.match_mode {
            MatchMode::ClassGroup => config
                .class_candidates
                .iter()
                .map(|fragment| format!("[class*=\"{}\"]", escape_fragment(fragment)))
                .collect(),
            MatchMode::IdGroup => config
                .id_groups
                .iter()
                .map(|group| {
                    group
                        .iter()
                        .map(|fragment| format!("[id*=\"{}\"]", escape_fragment(fragment)))
                        .collect()
                })
                .collect(),
        };

        if css_candidates.is_empty() {
            return Err(crate::StockwatchError::Config(format!(
                "target '{}': no matcher fragments configured",
                config.name
            )));
        }

        let mut candidates = Vec::with_capacity(css_candidates.len());
        for css in css_candidates {
            let selector = Selector::parse(&css).map_err(|e| {
                crate::StockwatchError::Config(format!(
                    "target '{}': invalid selector '{}': {}",
                    config.name, css, e
                ))
            })?;
            candidates.push(Candidate { css, selector });
        }

        let readiness_selector = candidates
            .iter()
            .map(|c| c.css.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Ok(Self {
            readiness_selector,
            candidates,
        })
    }

    /// Selector handed to the content source; matches as soon as any
    /// candidate is present in the page
    pub fn readiness_selector(&self) -> &str {
        &self.readiness_selector
    }

    /// Evaluation candidates in configured order
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }
}

fn escape_fragment(fragment: &str) -> String {
    fragment.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CheckPolarity, WebhookConfig};

    fn target(match_mode: MatchMode) -> TargetConfig {
        TargetConfig {
            name: "Test".to_string(),
            url: "https://example.com".to_string(),
            match_mode,
            class_candidates: Vec::new(),
            id_groups: Vec::new(),
            check_string: "Add to Cart".to_string(),
            check_polarity: CheckPolarity::PresenceMeansAvailable,
            refresh_seconds: 30,
            cooldown_seconds: 600,
            webhook: WebhookConfig::default(),
        }
    }

    #[test]
    fn class_candidates_become_one_selector_each() {
        let mut config = target(MatchMode::ClassGroup);
        config.class_candidates = vec!["stock-status".to_string(), "availability".to_string()];

        let matcher = Matcher::from_config(&config).unwrap();

        assert_eq!(matcher.candidates().len(), 2);
        assert_eq!(matcher.candidates()[0].css(), "[class*=\"stock-status\"]");
        assert_eq!(matcher.candidates()[1].css(), "[class*=\"availability\"]");
        assert_eq!(
            matcher.readiness_selector(),
            "[class*=\"stock-status\"], [class*=\"availability\"]"
        );
    }

    #[test]
    fn id_group_fragments_compound_into_one_selector() {
        let mut config = target(MatchMode::IdGroup);
        config.id_groups = vec![
            vec!["product".to_string(), "buy".to_string()],
            vec!["cart".to_string()],
        ];

        let matcher = Matcher::from_config(&config).unwrap();

        assert_eq!(matcher.candidates().len(), 2);
        assert_eq!(
            matcher.candidates()[0].css(),
            "[id*=\"product\"][id*=\"buy\"]"
        );
        assert_eq!(matcher.candidates()[1].css(), "[id*=\"cart\"]");
        assert_eq!(
            matcher.readiness_selector(),
            "[id*=\"product\"][id*=\"buy\"], [id*=\"cart\"]"
        );
    }

    #[test]
    fn candidate_order_is_preserved() {
        let mut config = target(MatchMode::ClassGroup);
        config.class_candidates = vec!["b".to_string(), "a".to_string(), "c".to_string()];

        let matcher = Matcher::from_config(&config).unwrap();
        let order: Vec<&str> = matcher.candidates().iter().map(|c| c.css()).collect();
        assert_eq!(
            order,
            vec!["[class*=\"b\"]", "[class*=\"a\"]", "[class*=\"c\"]"]
        );
    }

    #[test]
    fn quotes_in_fragments_are_escaped() {
        let mut config = target(MatchMode::ClassGroup);
        config.class_candidates = vec!["a\"b".to_string()];

        let matcher = Matcher::from_config(&config).unwrap();
        assert_eq!(matcher.candidates()[0].css(), "[class*=\"a\\\"b\"]");
    }

    #[test]
    fn empty_matcher_is_a_configuration_error() {
        let config = target(MatchMode::ClassGroup);
        let err = Matcher::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("no matcher fragments"));
    }

    #[test]
    fn compiled_selectors_actually_match() {
        let mut config = target(MatchMode::ClassGroup);
        config.class_candidates = vec!["stock".to_string()];

        let matcher = Matcher::from_config(&config).unwrap();
        let html = scraper::Html::parse_document(
            r#"<html><body><div class="product stock-line">In stock</div></body></html>"#,
        );
        let matches: Vec<_> = html.select(matcher.candidates()[0].selector()).collect();
        assert_eq!(matches.len(), 1);
    }
}

//! Availability evaluation over a page snapshot

use scraper::Html;

use crate::config::CheckPolarity;
use crate::selector::Matcher;
use crate::source::ContentSnapshot;

/// Substring check applied to matched elements, prepared once per target
#[derive(Debug, Clone)]
pub struct CheckSpec {
    needle: String,
    polarity: CheckPolarity,
}

impl CheckSpec {
    pub fn new(check_string: &str, polarity: CheckPolarity) -> Self {
        Self {
            needle: check_string.to_lowercase(),
            polarity,
        }
    }
}

/// Decide whether the snapshot shows the target as available.
///
/// Candidates are tried in configured order; within a candidate, elements
/// are tried in document order. The first element whose polarity-adjusted
/// check comes out `true` wins and ends the evaluation — later candidates
/// are never consulted. A candidate matching zero elements aborts the
/// whole evaluation with a selector error: the page structure no longer
/// fits the configuration, which is not the same as "out of stock".
///
/// Pure function of (snapshot, matcher, check); no state survives a cycle.
pub fn evaluate(
    snapshot: &ContentSnapshot,
    matcher: &Matcher,
    check: &CheckSpec,
) -> crate::Result<bool> {
    let document = Html::parse_document(snapshot.html());

    for candidate in matcher.candidates() {
        let elements: Vec<_> = document.select(candidate.selector()).collect();
        if elements.is_empty() {
            return Err(crate::StockwatchError::Selector(format!(
                "'{}' matched no elements",
                candidate.css()
            )));
        }

        for element in elements {
            let contains = element.html().to_lowercase().contains(&check.needle);
            let available = match check.polarity {
                CheckPolarity::PresenceMeansAvailable => contains,
                CheckPolarity::AbsenceMeansAvailable => !contains,
            };
            if available {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MatchMode, TargetConfig, WebhookConfig};

    fn class_target(candidates: &[&str]) -> TargetConfig {
        TargetConfig {
            name: "Test".to_string(),
            url: "https://example.com".to_string(),
            match_mode: MatchMode::ClassGroup,
            class_candidates: candidates.iter().map(|s| s.to_string()).collect(),
            id_groups: Vec::new(),
            check_string: "Add to Cart".to_string(),
            check_polarity: CheckPolarity::PresenceMeansAvailable,
            refresh_seconds: 30,
            cooldown_seconds: 600,
            webhook: WebhookConfig::default(),
        }
    }

    fn id_target(groups: &[&[&str]]) -> TargetConfig {
        let mut target = class_target(&[]);
        target.match_mode = MatchMode::IdGroup;
        target.id_groups = groups
            .iter()
            .map(|g| g.iter().map(|s| s.to_string()).collect())
            .collect();
        target
    }

    fn snapshot(html: &str) -> ContentSnapshot {
        ContentSnapshot::new(html.to_string())
    }

    #[test]
    fn presence_polarity_finds_check_string() {
        let config = class_target(&["stock-status"]);
        let matcher = Matcher::from_config(&config).unwrap();
        let check = CheckSpec::new("Add to Cart", CheckPolarity::PresenceMeansAvailable);

        let page = snapshot(
            r#"<div class="stock-status"><button>Add to Cart</button></div>"#,
        );
        assert!(evaluate(&page, &matcher, &check).unwrap());

        let page = snapshot(r#"<div class="stock-status">Sold out</div>"#);
        assert!(!evaluate(&page, &matcher, &check).unwrap());
    }

    #[test]
    fn absence_polarity_inverts_the_result() {
        let config = class_target(&["stock-status"]);
        let matcher = Matcher::from_config(&config).unwrap();
        let check = CheckSpec::new("Out of stock", CheckPolarity::AbsenceMeansAvailable);

        let page = snapshot(r#"<div class="stock-status">Out of stock</div>"#);
        assert!(!evaluate(&page, &matcher, &check).unwrap());

        let page = snapshot(r#"<div class="stock-status">Ships tomorrow</div>"#);
        assert!(evaluate(&page, &matcher, &check).unwrap());
    }

    #[test]
    fn check_is_case_insensitive() {
        let config = class_target(&["stock"]);
        let matcher = Matcher::from_config(&config).unwrap();
        let check = CheckSpec::new("ADD TO CART", CheckPolarity::PresenceMeansAvailable);

        let page = snapshot(r#"<div class="stock">add to cart</div>"#);
        assert!(evaluate(&page, &matcher, &check).unwrap());
    }

    #[test]
    fn check_string_in_attributes_counts() {
        // The whole outer markup is searched, not just the text
        let config = class_target(&["stock"]);
        let matcher = Matcher::from_config(&config).unwrap();
        let check = CheckSpec::new("add-to-cart", CheckPolarity::PresenceMeansAvailable);

        let page = snapshot(r#"<div class="stock"><a href="/add-to-cart">Buy</a></div>"#);
        assert!(evaluate(&page, &matcher, &check).unwrap());
    }

    #[test]
    fn later_candidate_can_win() {
        let config = class_target(&["first", "second"]);
        let matcher = Matcher::from_config(&config).unwrap();
        let check = CheckSpec::new("Add to Cart", CheckPolarity::PresenceMeansAvailable);

        let page = snapshot(
            r#"<div class="first">Sold out</div><div class="second">Add to Cart</div>"#,
        );
        assert!(evaluate(&page, &matcher, &check).unwrap());
    }

    #[test]
    fn first_true_candidate_short_circuits() {
        // Candidate "b" matches nothing, which would be an error if it were
        // ever consulted; a true result on "a" must end the evaluation first.
        let config = class_target(&["a", "b"]);
        let matcher = Matcher::from_config(&config).unwrap();
        let check = CheckSpec::new("Add to Cart", CheckPolarity::PresenceMeansAvailable);

        let page = snapshot(r#"<div class="a">Add to Cart</div>"#);
        assert!(evaluate(&page, &matcher, &check).unwrap());
    }

    #[test]
    fn first_true_element_short_circuits_within_candidate() {
        let config = class_target(&["status"]);
        let matcher = Matcher::from_config(&config).unwrap();
        let check = CheckSpec::new("In stock", CheckPolarity::PresenceMeansAvailable);

        let page = snapshot(
            r#"<div class="status">In stock</div><div class="status">Sold out</div>"#,
        );
        assert!(evaluate(&page, &matcher, &check).unwrap());
    }

    #[test]
    fn zero_matches_is_an_error_not_a_negative() {
        let config = class_target(&["stock-status"]);
        let matcher = Matcher::from_config(&config).unwrap();
        let check = CheckSpec::new("Add to Cart", CheckPolarity::PresenceMeansAvailable);

        let page = snapshot(r#"<div class="something-else">Add to Cart</div>"#);
        let err = evaluate(&page, &matcher, &check).unwrap_err();
        match err {
            crate::StockwatchError::Selector(msg) => {
                assert!(msg.contains("stock-status"), "{msg}");
            }
            other => panic!("expected StockwatchError::Selector, got {other:?}"),
        }
    }

    #[test]
    fn zero_matches_aborts_before_later_candidates() {
        let config = class_target(&["missing", "present"]);
        let matcher = Matcher::from_config(&config).unwrap();
        let check = CheckSpec::new("Add to Cart", CheckPolarity::PresenceMeansAvailable);

        let page = snapshot(r#"<div class="present">Add to Cart</div>"#);
        assert!(evaluate(&page, &matcher, &check).is_err());
    }

    #[test]
    fn id_group_requires_all_fragments_on_one_element() {
        let config = id_target(&[&["x", "y"]]);
        let matcher = Matcher::from_config(&config).unwrap();
        let check = CheckSpec::new("buy", CheckPolarity::PresenceMeansAvailable);

        // Fragments satisfied only across two different elements: the
        // compound selector matches neither, which surfaces as drift.
        let page = snapshot(r#"<div id="x-1">buy</div><div id="y-1">buy</div>"#);
        assert!(evaluate(&page, &matcher, &check).is_err());

        // One element carrying both fragments matches.
        let page = snapshot(r#"<div id="x-and-y">buy</div>"#);
        assert!(evaluate(&page, &matcher, &check).unwrap());
    }

    #[test]
    fn or_across_id_groups() {
        let config = id_target(&[&["checkout"], &["cart"]]);
        let matcher = Matcher::from_config(&config).unwrap();
        let check = CheckSpec::new("available", CheckPolarity::PresenceMeansAvailable);

        let page = snapshot(
            r#"<div id="checkout-box">pending</div><div id="cart-box">available</div>"#,
        );
        assert!(evaluate(&page, &matcher, &check).unwrap());
    }

    #[test]
    fn evaluation_is_idempotent() {
        let config = class_target(&["stock"]);
        let matcher = Matcher::from_config(&config).unwrap();
        let check = CheckSpec::new("Add to Cart", CheckPolarity::PresenceMeansAvailable);

        let page = snapshot(r#"<div class="stock">Add to Cart</div>"#);
        let first = evaluate(&page, &matcher, &check).unwrap();
        let second = evaluate(&page, &matcher, &check).unwrap();
        assert_eq!(first, second);
    }
}

//! Live search over loaded suggestions.

use std::borrow::Cow;

use legis_core::Suggestion;

/// Suggestions whose name contains `query`, case-insensitively, in their
/// original order. An empty query borrows the input unchanged.
pub fn filter_suggestions<'a>(suggestions: &'a [Suggestion], query: &str) -> Cow<'a, [Suggestion]> {
    if query.is_empty() {
        return Cow::Borrowed(suggestions);
    }

    let needle = query.to_lowercase();
    Cow::Owned(
        suggestions
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .cloned()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Suggestion> {
        vec![
            Suggestion::new("1", "Comissão de Educação (CE)"),
            Suggestion::new("2", "Comissão de Assuntos Econômicos (CAE)"),
            Suggestion::new("3", "Comissão de Saúde"),
            Suggestion::new("4", "PL - Partido Liberal"),
        ]
    }

    #[test]
    fn test_empty_query_returns_input_unchanged() {
        let list = sample();
        let filtered = filter_suggestions(&list, "");
        assert!(matches!(filtered, Cow::Borrowed(_)));
        assert_eq!(filtered.as_ref(), list.as_slice());
    }

    #[test]
    fn test_case_insensitive_substring() {
        let list = sample();
        let filtered = filter_suggestions(&list, "comissão DE");
        let ids: Vec<_> = filtered.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn test_accented_uppercase_query() {
        let list = sample();
        let filtered = filter_suggestions(&list, "SAÚDE");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "3");
    }

    #[test]
    fn test_accents_are_significant() {
        let list = sample();
        assert!(filter_suggestions(&list, "saude").is_empty());
    }

    #[test]
    fn test_no_match() {
        let list = sample();
        assert!(filter_suggestions(&list, "senado").is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let list = sample();
        for query in ["", "c", "(ca", "liberal", "zzz"] {
            let once = filter_suggestions(&list, query);
            let twice = filter_suggestions(&once, query);
            assert_eq!(once.as_ref(), twice.as_ref(), "query {:?}", query);
        }
    }

    #[test]
    fn test_results_are_subsequence_in_order() {
        let list = sample();
        let filtered = filter_suggestions(&list, "e");
        let positions: Vec<_> = filtered
            .iter()
            .map(|s| list.iter().position(|o| o == s).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(filtered.iter().all(|s| s.name.to_lowercase().contains('e')));
    }
}

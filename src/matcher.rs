//! Similarity matching over catalogue names.
//!
//! A query is split on whitespace into lowercase tokens. An item is similar
//! when its lowercased name contains every token as a substring, in any order.
//! This is a deliberate token-subset containment test, not an edit distance.

use crate::model::Named;

/// Lowercase whitespace-separated tokens of a query.
pub fn tokenize(query: &str) -> Vec<String> {
    query.split_whitespace().map(|t| t.to_lowercase()).collect()
}

/// True if `name` contains every token.
pub fn matches_tokens(name: &str, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return false;
    }
    let name = name.to_lowercase();
    tokens.iter().all(|t| name.contains(t.as_str()))
}

/// Positions of the items similar to `query`, in catalogue order.
pub fn search_indices<T: Named>(items: &[T], query: &str) -> Vec<usize> {
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return Vec::new();
    }
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| matches_tokens(item.name(), &tokens))
        .map(|(i, _)| i)
        .collect()
}

/// Items similar to `query`, in catalogue order.
pub fn search<'a, T: Named>(items: &'a [T], query: &str) -> Vec<&'a T> {
    search_indices(items, query)
        .into_iter()
        .map(|i| &items[i])
        .collect()
}

/// Case-insensitive full-name match.
pub fn is_exact<T: Named>(item: &T, query: &str) -> bool {
    item.is_named(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ingredient;

    fn stock(names: &[&str]) -> Vec<Ingredient> {
        names.iter().map(|n| Ingredient::new(n, 1).unwrap()).collect()
    }

    #[test]
    fn test_single_token() {
        let items = stock(&["Flour", "Brown Sugar"]);
        let found = search(&items, "flour");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "Flour");
    }

    #[test]
    fn test_all_tokens_required_any_order() {
        let items = stock(&["Brown Sugar", "White Sugar", "Brown Rice"]);
        let found: Vec<_> = search(&items, "sugar BROWN").iter().map(|i| i.name()).collect();
        assert_eq!(found, vec!["Brown Sugar"]);
    }

    #[test]
    fn test_substring_not_whole_word() {
        let items = stock(&["Tomatoes", "Potato", "Tomato Paste"]);
        let found: Vec<_> = search(&items, "tomato").iter().map(|i| i.name()).collect();
        assert_eq!(found, vec!["Tomatoes", "Tomato Paste"]);
    }

    #[test]
    fn test_preserves_order() {
        let items = stock(&["Rice Flour", "Salt", "Flour", "Flour Tortilla"]);
        assert_eq!(search_indices(&items, "flour"), vec![0, 2, 3]);
    }

    #[test]
    fn test_empty_inputs() {
        let items = stock(&["Salt"]);
        assert!(search(&items, "").is_empty());
        assert!(search(&items, "   ").is_empty());
        let empty: Vec<Ingredient> = Vec::new();
        assert!(search(&empty, "salt").is_empty());
    }

    #[test]
    fn test_is_exact() {
        let items = stock(&["Flour"]);
        assert!(is_exact(&items[0], "FLOUR"));
        assert!(!is_exact(&items[0], "flou"));
    }
}

//! Local category taxonomy for transactions.
//!
//! The taxonomy lives only in client memory for the current session. It
//! offers choices for categorising transactions but never validates them: a
//! transaction may carry a category the taxonomy no longer lists.

/// Categories offered before the user customises the list.
pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "Groceries",
    "Entertainment",
    "Income",
    "Transport",
    "Dining Out",
    "Household",
];

/// Ordered, de-duplicated, case-sensitive list of category names.
///
/// # Examples
/// ```
/// use household_client::domain::CategoryTaxonomy;
///
/// let mut taxonomy = CategoryTaxonomy::default();
/// assert!(taxonomy.add("  Pets "));
/// assert!(!taxonomy.add("Pets"));
/// assert!(taxonomy.contains("Pets"));
/// assert!(taxonomy.remove("Pets"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTaxonomy {
    names: Vec<String>,
}

impl CategoryTaxonomy {
    /// Build a taxonomy from arbitrary names, trimming and de-duplicating.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut taxonomy = Self { names: Vec::new() };
        for name in names {
            taxonomy.add(name.as_ref());
        }
        taxonomy
    }

    /// Add a category; returns `true` when the list changed.
    ///
    /// Input is trimmed first. Blank input and exact (case-sensitive)
    /// duplicates leave the list untouched.
    pub fn add(&mut self, raw: &str) -> bool {
        let name = raw.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.names.push(name.to_owned());
        true
    }

    /// Remove the exact category string; returns `true` when it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|existing| existing != name);
        self.names.len() != before
    }

    /// Whether the exact category string is listed.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|existing| existing == name)
    }

    /// Category names in insertion order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for CategoryTaxonomy {
    fn default() -> Self {
        Self::from_names(DEFAULT_CATEGORIES)
    }
}

#[cfg(test)]
mod tests {
    //! Taxonomy behaviour, including idempotence properties.
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn defaults_are_listed_in_order() {
        let taxonomy = CategoryTaxonomy::default();
        assert_eq!(taxonomy.names(), DEFAULT_CATEGORIES.map(str::to_owned).as_slice());
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("Groceries")]
    #[case(" Groceries ")]
    fn blank_or_existing_input_is_ignored(#[case] raw: &str) {
        let mut taxonomy = CategoryTaxonomy::default();
        assert!(!taxonomy.add(raw));
        assert_eq!(taxonomy, CategoryTaxonomy::default());
    }

    #[test]
    fn matching_is_case_sensitive() {
        let mut taxonomy = CategoryTaxonomy::default();
        assert!(taxonomy.add("groceries"));
        assert!(taxonomy.contains("Groceries"));
        assert!(taxonomy.contains("groceries"));
    }

    #[test]
    fn remove_only_matches_exact_string() {
        let mut taxonomy = CategoryTaxonomy::default();
        assert!(!taxonomy.remove("income"));
        assert!(taxonomy.remove("Income"));
        assert!(!taxonomy.contains("Income"));
        assert!(!taxonomy.remove("Income"));
    }

    proptest! {
        #[test]
        fn adding_twice_equals_adding_once(name in "\\PC{0,12}") {
            let mut once = CategoryTaxonomy::default();
            once.add(&name);
            let mut twice = once.clone();
            twice.add(&name);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn padded_input_equals_trimmed_input(name in "[A-Za-z ]{0,10}", pad in " {0,3}") {
            let mut padded = CategoryTaxonomy::default();
            padded.add(&format!("{pad}{name}{pad}"));
            let mut trimmed = CategoryTaxonomy::default();
            trimmed.add(name.trim());
            prop_assert_eq!(padded, trimmed);
        }

        #[test]
        fn names_stay_unique(names in proptest::collection::vec("[a-c]{1,2}", 0..20)) {
            let taxonomy = CategoryTaxonomy::from_names(&names);
            let mut seen = std::collections::HashSet::new();
            for name in taxonomy.names() {
                prop_assert!(seen.insert(name.clone()));
            }
        }
    }
}

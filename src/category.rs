//! The fixed catalog of transaction categories.
//!
//! The catalog is static configuration data: a closed set of category names
//! with a display color each. It is never persisted or mutated at runtime.

/// The name of the synthetic category that all income transactions belong to.
pub const INCOME: &str = "Income";

/// A named transaction category with its display color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Category {
    /// The display name of the category.
    pub name: &'static str,
    /// The color used to display the category, as a hex triplet.
    pub color: &'static str,
}

/// The catalog of permitted transaction categories.
///
/// The last entry is the synthetic [INCOME] category.
pub const CATALOG: [Category; 11] = [
    Category {
        name: "Main expenses",
        color: "#FED057",
    },
    Category {
        name: "Products",
        color: "#FFD8D0",
    },
    Category {
        name: "Car",
        color: "#FD9498",
    },
    Category {
        name: "Self care",
        color: "#C5BAFF",
    },
    Category {
        name: "Child care",
        color: "#6E78E8",
    },
    Category {
        name: "Household products",
        color: "#4A56E2",
    },
    Category {
        name: "Education",
        color: "#81E1FF",
    },
    Category {
        name: "Leisure",
        color: "#24CCA7",
    },
    Category {
        name: "Other expenses",
        color: "#00AD84",
    },
    Category {
        name: "Entertainment",
        color: "#744CBC",
    },
    Category {
        name: INCOME,
        color: "#FFB627",
    },
];

/// Check whether `name` is a permitted transaction category.
pub fn is_valid(name: &str) -> bool {
    CATALOG.iter().any(|category| category.name == name)
}

#[cfg(test)]
mod catalog_tests {
    use std::collections::HashSet;

    use super::{CATALOG, INCOME, is_valid};

    #[test]
    fn income_is_a_valid_category() {
        assert!(is_valid(INCOME));
    }

    #[test]
    fn expense_categories_are_valid() {
        assert!(is_valid("Products"));
        assert!(is_valid("Household products"));
    }

    #[test]
    fn unknown_names_are_invalid() {
        assert!(!is_valid("Gambling"));
        assert!(!is_valid("income"));
        assert!(!is_valid(""));
    }

    #[test]
    fn catalog_names_are_unique() {
        let names: HashSet<&str> = CATALOG.iter().map(|category| category.name).collect();

        assert_eq!(names.len(), CATALOG.len());
    }
}

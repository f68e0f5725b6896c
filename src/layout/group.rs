//! # Category Grouping
//!
//! Partition products into categories for the PDF export. Categories come
//! out sorted case-insensitively; products keep their store order inside a
//! category. Products without a category are left out.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::Product;

/// One category and its products, in store order. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub name: String,
    pub members: Vec<Product>,
}

/// Group products by category.
///
/// The sort key is the lowercased name with the exact name as tie-breaker,
/// so "Oils" and "oils" stay two distinct, deterministically ordered
/// groups.
pub fn group_by_category(products: &[Product]) -> Vec<CategoryGroup> {
    let mut groups: BTreeMap<(String, String), Vec<Product>> = BTreeMap::new();
    for product in products {
        let Some(category) = product.category() else {
            continue;
        };
        groups
            .entry((category.to_lowercase(), category.to_string()))
            .or_default()
            .push(product.clone());
    }

    groups
        .into_iter()
        .map(|((_, name), members)| CategoryGroup { name, members })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(name: &str, category: Option<&str>) -> Product {
        Product::new(name, category)
    }

    #[test]
    fn empty_input_gives_no_groups() {
        assert!(group_by_category(&[]).is_empty());
    }

    #[test]
    fn sorted_case_insensitively() {
        let groups = group_by_category(&[
            p("a", Some("oils")),
            p("b", Some("Brakes")),
            p("c", Some("filters")),
        ]);
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Brakes", "filters", "oils"]);
    }

    #[test]
    fn members_keep_insertion_order() {
        let groups = group_by_category(&[
            p("z", Some("brakes")),
            p("a", Some("oils")),
            p("m", Some("brakes")),
            p("b", Some("brakes")),
        ]);
        let brakes: Vec<_> = groups[0].members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(brakes, vec!["z", "m", "b"]);
    }

    #[test]
    fn categoryless_products_are_dropped() {
        let mut blank = p("blank", None);
        blank.category = Some("   ".to_string());
        let groups = group_by_category(&[p("keep", Some("oils")), p("none", None), blank]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members.len(), 1);
        assert_eq!(groups[0].members[0].name, "keep");
    }

    #[test]
    fn case_variants_are_distinct_groups() {
        let groups = group_by_category(&[p("a", Some("oils")), p("b", Some("Oils"))]);
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Oils", "oils"]);
    }
}

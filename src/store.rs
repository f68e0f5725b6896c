//! # Product Store and Browsing
//!
//! The in-memory product list plus everything the on-screen catalog needs
//! from it: search, category filter buttons, product cards and the detail
//! view. None of this touches the PDF layout engine.
//!
//! Browsing state lives in an explicit [`BrowseState`] value that is
//! updated by [`BrowseEvent`]s. The view recomputes the visible cards from
//! the store and the state each time.
//!
//! Products without a category stay visible here. They are only dropped
//! from the PDF export, which is a deliberate asymmetry.

use serde::Serialize;

use crate::loader::ProductSource;
use crate::model::{display_category, Product};

/// Ordered, read-only list of products for one catalog session.
#[derive(Debug, Clone, Default)]
pub struct ProductStore {
    products: Vec<Product>,
}

impl ProductStore {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Populate a store from a product source.
    pub fn load(source: &dyn ProductSource) -> Self {
        Self::new(source.fetch_products())
    }

    /// Replace the whole product list (a reload).
    pub fn replace(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// A private copy for an export, so later changes to the store cannot
    /// disturb pagination halfway through.
    pub fn snapshot(&self) -> Vec<Product> {
        self.products.clone()
    }

    /// Unique categories in first-seen order, for the filter buttons.
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for category in self.products.iter().filter_map(Product::category) {
            if !seen.iter().any(|c| c == category) {
                seen.push(category.to_string());
            }
        }
        seen
    }

    /// Filter buttons: "all" first, then one per category.
    pub fn filter_buttons(&self, state: &BrowseState) -> Vec<FilterButton> {
        let mut buttons = vec![FilterButton {
            filter: CategoryFilter::All,
            label: "Todos".to_string(),
            active: state.category == CategoryFilter::All,
        }];
        for category in self.categories() {
            let filter = CategoryFilter::Only(category.clone());
            buttons.push(FilterButton {
                active: state.category == filter,
                label: display_category(&category),
                filter,
            });
        }
        buttons
    }

    /// Products that pass the current category filter and search term,
    /// in store order.
    pub fn visible<'a>(&'a self, state: &BrowseState) -> Vec<&'a Product> {
        self.products
            .iter()
            .filter(|p| state.category.accepts(p))
            .filter(|p| matches_search(p, &state.search))
            .collect()
    }

    /// Cards for the visible products. An empty result means the view
    /// shows its "no results" message.
    pub fn cards(&self, state: &BrowseState) -> Vec<ProductCard> {
        self.visible(state).into_iter().map(ProductCard::from).collect()
    }

    /// Detail view of the product opened in the modal, if any.
    pub fn detail(&self, state: &BrowseState) -> Option<ProductDetail> {
        let index = state.open_product?;
        self.products.get(index).map(ProductDetail::from)
    }
}

/// Case-insensitive substring match on name, description or any code.
/// An empty term matches everything.
pub fn matches_search(product: &Product, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    product.name.to_lowercase().contains(&term)
        || product.description.to_lowercase().contains(&term)
        || product
            .codes
            .iter()
            .any(|code| code.to_lowercase().contains(&term))
}

/// Which categories the card grid shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn accepts(&self, product: &Product) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(name) => product.category() == Some(name.as_str()),
        }
    }
}

/// Browsing state of one catalog view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrowseState {
    pub category: CategoryFilter,
    pub search: String,
    /// Index into the store of the product shown in the detail modal.
    pub open_product: Option<usize>,
}

/// User interactions that change the browsing state.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowseEvent {
    Search(String),
    SelectCategory(CategoryFilter),
    OpenProduct(usize),
    CloseDetail,
}

impl BrowseState {
    pub fn apply(&mut self, event: BrowseEvent) {
        match event {
            BrowseEvent::Search(term) => self.search = term,
            BrowseEvent::SelectCategory(filter) => self.category = filter,
            BrowseEvent::OpenProduct(index) => self.open_product = Some(index),
            BrowseEvent::CloseDetail => self.open_product = None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterButton {
    pub filter: CategoryFilter,
    pub label: String,
    pub active: bool,
}

/// What a product card shows in the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    pub name: String,
    pub image_ref: String,
    pub category: Option<String>,
}

impl From<&Product> for ProductCard {
    fn from(p: &Product) -> Self {
        Self {
            name: p.name.clone(),
            image_ref: p.image_ref.clone(),
            category: p.category().map(str::to_string),
        }
    }
}

/// What the detail modal shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub name: String,
    pub image_ref: String,
    pub category: Option<String>,
    pub codes: Vec<String>,
    pub description: String,
}

impl From<&Product> for ProductDetail {
    fn from(p: &Product) -> Self {
        Self {
            name: p.name.clone(),
            image_ref: p.image_ref.clone(),
            category: p.category().map(str::to_string),
            codes: p.codes.clone(),
            description: p.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, category: Option<&str>, codes: &[&str], description: &str) -> Product {
        Product {
            name: name.to_string(),
            image_ref: format!("img/{name}.jpg"),
            category: category.map(str::to_string),
            description: description.to_string(),
            codes: codes.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn store() -> ProductStore {
        ProductStore::new(vec![
            product("Pastilha", Some("freios"), &["PD-01"], "Pastilha dianteira"),
            product("Filtro de ar", Some("filtros"), &["FA-10", "FA-11"], "Filtro do motor"),
            product("Avulso", None, &["AV-1"], "Sem categoria"),
            product("Disco", Some("freios"), &["DF-2"], "Disco ventilado"),
        ])
    }

    #[test]
    fn categories_in_first_seen_order() {
        assert_eq!(store().categories(), vec!["freios", "filtros"]);
    }

    #[test]
    fn search_matches_name_description_and_codes() {
        let p = product("Pastilha", Some("freios"), &["PD-01", "PD-02"], "Dianteira cerâmica");
        assert!(matches_search(&p, "PAST"));
        assert!(matches_search(&p, "cerâmica"));
        assert!(matches_search(&p, "pd-02"));
        assert!(matches_search(&p, ""));
        assert!(!matches_search(&p, "óleo"));
    }

    #[test]
    fn categoryless_product_still_gets_a_card() {
        let store = store();
        let cards = store.cards(&BrowseState::default());
        assert_eq!(cards.len(), 4);
        assert!(cards.iter().any(|c| c.name == "Avulso" && c.category.is_none()));
    }

    #[test]
    fn filter_and_search_combine() {
        let store = store();
        let mut state = BrowseState::default();
        state.apply(BrowseEvent::SelectCategory(CategoryFilter::Only("freios".into())));
        assert_eq!(store.visible(&state).len(), 2);
        state.apply(BrowseEvent::Search("df-2".into()));
        let names: Vec<_> = store.visible(&state).iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["Disco"]);
        state.apply(BrowseEvent::Search("nada disso".into()));
        assert!(store.cards(&state).is_empty());
    }

    #[test]
    fn filter_buttons_mark_active_filter() {
        let store = store();
        let mut state = BrowseState::default();
        let buttons = store.filter_buttons(&state);
        assert_eq!(buttons.len(), 3);
        assert_eq!(buttons[0].label, "Todos");
        assert!(buttons[0].active);
        assert_eq!(buttons[1].label, "Freios");

        state.apply(BrowseEvent::SelectCategory(CategoryFilter::Only("filtros".into())));
        let buttons = store.filter_buttons(&state);
        assert!(!buttons[0].active);
        assert!(buttons[2].active);
    }

    #[test]
    fn detail_opens_and_closes() {
        let store = store();
        let mut state = BrowseState::default();
        assert!(store.detail(&state).is_none());
        state.apply(BrowseEvent::OpenProduct(1));
        let detail = store.detail(&state).unwrap();
        assert_eq!(detail.codes, vec!["FA-10", "FA-11"]);
        state.apply(BrowseEvent::CloseDetail);
        assert!(store.detail(&state).is_none());
    }

    #[test]
    fn snapshot_is_independent_of_reload() {
        let mut store = store();
        let snapshot = store.snapshot();
        store.replace(vec![]);
        assert!(store.is_empty());
        assert_eq!(snapshot.len(), 4);
    }
}

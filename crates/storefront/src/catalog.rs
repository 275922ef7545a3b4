//! In-memory product catalog and collection queries.
//!
//! The catalog is fetched once per session and never mutated by the cart.
//! Collection pages are computed client-side: search, category filter,
//! sort, then a page slice.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::str::FromStr;

use shopfront_core::{Product, ProductId};

/// Products per page when no size is configured.
pub const DEFAULT_PAGE_SIZE: usize = 15;

/// Products shown in the home page's new arrivals row.
pub const NEW_ARRIVALS_COUNT: usize = 8;

/// Products shown under "related products" on a product page.
pub const RELATED_COUNT: usize = 5;

/// Read-only product list with an ID index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl Catalog {
    /// Build a catalog, keeping the backend's product order.
    ///
    /// If an ID appears twice, lookups resolve to the first occurrence.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            index.entry(product.id.clone()).or_insert(position);
        }
        Self { products, index }
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.index
            .get(id)
            .and_then(|&position| self.products.get(position))
    }

    /// Products in backend order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for product in &self.products {
            if !seen.contains(&product.category.as_str()) {
                seen.push(product.category.as_str());
            }
        }
        seen
    }

    /// Products flagged as popular, in catalog order.
    pub fn popular(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.popular)
    }

    /// Products flagged for the home page banner, in catalog order.
    pub fn featured(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.featured)
    }

    /// The first `limit` products in catalog order.
    pub fn new_arrivals(&self, limit: usize) -> impl Iterator<Item = &Product> {
        self.products.iter().take(limit)
    }

    /// Up to `limit` products sharing `product`'s category, in catalog order.
    ///
    /// The product itself is included when it is in the catalog.
    pub fn related<'a>(
        &'a self,
        product: &'a Product,
        limit: usize,
    ) -> impl Iterator<Item = &'a Product> {
        self.products
            .iter()
            .filter(move |p| p.category == product.category)
            .take(limit)
    }

    /// Run a collection query and return the requested page.
    #[must_use]
    pub fn query(&self, query: &CatalogQuery) -> Page<'_> {
        let needle = query.search.trim().to_lowercase();

        let mut matches: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
            .filter(|p| query.categories.is_empty() || query.categories.contains(&p.category))
            .collect();

        // Stable sorts: ties keep catalog order.
        match query.sort {
            SortOrder::Relevant => {}
            SortOrder::PriceLowToHigh => matches.sort_by_key(|p| p.price),
            SortOrder::PriceHighToLow => matches.sort_by_key(|p| Reverse(p.price)),
            // Undated products sort after dated ones.
            SortOrder::Newest => matches.sort_by_key(|p| (p.date.is_none(), Reverse(p.date))),
        }

        Page::slice(matches, query.page, query.per_page)
    }
}

/// Collection sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Backend order.
    #[default]
    Relevant,
    PriceLowToHigh,
    PriceHighToLow,
    /// Most recently added first.
    Newest,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relevant" => Ok(Self::Relevant),
            "low" => Ok(Self::PriceLowToHigh),
            "high" => Ok(Self::PriceHighToLow),
            "newest" => Ok(Self::Newest),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}

/// Collection page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Case-insensitive substring of the product name; empty matches all.
    pub search: String,
    /// Selected categories; empty means every category.
    pub categories: Vec<String>,
    pub sort: SortOrder,
    /// 1-based page number.
    pub page: usize,
    pub per_page: usize,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            categories: Vec::new(),
            sort: SortOrder::Relevant,
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CatalogQuery {
    /// Select a category, or deselect it if already selected.
    ///
    /// Changing the filter resets to the first page.
    pub fn toggle_category(&mut self, category: &str) {
        if let Some(position) = self.categories.iter().position(|c| c == category) {
            self.categories.remove(position);
        } else {
            self.categories.push(category.to_string());
        }
        self.page = 1;
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub items: Vec<&'a Product>,
    /// The requested page number.
    pub page: usize,
    pub total_pages: usize,
    /// Matches across all pages.
    pub total_items: usize,
}

impl<'a> Page<'a> {
    fn slice(matches: Vec<&'a Product>, page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total_items = matches.len();
        let total_pages = total_items.div_ceil(per_page);

        let items = page
            .checked_sub(1)
            .and_then(|p| p.checked_mul(per_page))
            .filter(|&start| start < total_items)
            .map_or_else(Vec::new, |start| {
                matches.into_iter().skip(start).take(per_page).collect()
            });

        Self {
            items,
            page,
            total_pages,
            total_items,
        }
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }
}

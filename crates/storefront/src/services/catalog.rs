//! Products, categories and sale prices.
//!
//! Reads fail open (an empty page, list or `None`) and successful responses
//! are cached in memory via `moka` for 5 minutes. Failures are never cached.

use std::time::Duration;

use bookstore_core::pagination::{Page, PageRequest};
use bookstore_core::promotion::{Discount, sale_price};
use bookstore_core::{Category, CategoryId, Money, Product, ProductId};
use moka::future::Cache;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::state::Storefront;

const CACHE_TTL: Duration = Duration::from_secs(300);
const CACHE_CAPACITY: u64 = 1000;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Products {
        page: PageRequest,
        category: Option<CategoryId>,
    },
    Product(ProductId),
    Categories,
    Discounts,
}

#[derive(Debug, Clone)]
enum CacheValue {
    Products(Page<Product>),
    Product(Box<Product>),
    Categories(Vec<Category>),
    Discounts(Vec<Discount>),
}

/// Shared response cache.
#[derive(Clone)]
pub(crate) struct CatalogCache {
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogCache {
    pub(crate) fn new() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(CACHE_TTL)
                .build(),
        }
    }
}

/// Listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
}

/// A product together with the price a customer pays today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductView {
    pub product: Product,
    pub sale_price: Money,
}

impl ProductView {
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.sale_price < self.product.price
    }
}

#[derive(Clone)]
pub struct CatalogService {
    state: Storefront,
}

impl CatalogService {
    pub(crate) const fn new(state: Storefront) -> Self {
        Self { state }
    }

    fn cache(&self) -> &Cache<CacheKey, CacheValue> {
        &self.state.cache().cache
    }

    /// One page of the product listing.
    #[instrument(skip(self))]
    pub async fn list_products(&self, page: PageRequest, filter: &ProductFilter) -> Page<Product> {
        let key = CacheKey::Products {
            page,
            category: filter.category_id,
        };
        if let Some(CacheValue::Products(products)) = self.cache().get(&key).await {
            debug!("Cache hit for products");
            return products;
        }

        let mut query = page.query().to_vec();
        if let Some(category) = filter.category_id {
            query.push(("categoryId", category.to_string()));
        }

        match self.state.api().try_get_page("products", &query).await {
            Ok(products) => {
                self.cache()
                    .insert(key, CacheValue::Products(products.clone()))
                    .await;
                products
            }
            Err(e) => {
                warn!(error = %e, "product listing failed, showing empty page");
                Page::empty()
            }
        }
    }

    /// Keyword search. Results are not cached.
    #[instrument(skip(self))]
    pub async fn search_products(&self, keyword: &str, page: PageRequest) -> Page<Product> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Page::empty();
        }
        let mut query = page.query().to_vec();
        query.push(("keyword", keyword.to_string()));
        self.state.api().get_page("products/search", &query).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Option<Product> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.cache().get(&key).await {
            debug!("Cache hit for product");
            return Some(*product);
        }

        let product: Product = self
            .state
            .api()
            .get_optional(&format!("products/{id}"))
            .await?;
        self.cache()
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Some(product)
    }

    #[instrument(skip(self))]
    pub async fn categories(&self) -> Vec<Category> {
        if let Some(CacheValue::Categories(categories)) =
            self.cache().get(&CacheKey::Categories).await
        {
            return categories;
        }
        match self.state.api().get::<Vec<Category>>("categories", &[]).await {
            Ok(categories) => {
                self.cache()
                    .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
                    .await;
                categories
            }
            Err(e) => {
                warn!(error = %e, "category listing failed");
                Vec::new()
            }
        }
    }

    /// Discounts currently on offer. Expired and upcoming ones are left for
    /// [`sale_price`] to skip.
    async fn discounts(&self) -> Vec<Discount> {
        if let Some(CacheValue::Discounts(discounts)) =
            self.cache().get(&CacheKey::Discounts).await
        {
            return discounts;
        }
        match self.state.api().get::<Vec<Discount>>("discounts", &[]).await {
            Ok(discounts) => {
                self.cache()
                    .insert(CacheKey::Discounts, CacheValue::Discounts(discounts.clone()))
                    .await;
                discounts
            }
            Err(e) => {
                warn!(error = %e, "discount listing failed, showing list prices");
                Vec::new()
            }
        }
    }

    /// A product with its sale price applied.
    pub async fn product_view(&self, id: ProductId) -> Option<ProductView> {
        let product = self.product(id).await?;
        let discounts = self.discounts().await;
        let sale_price = sale_price(
            product.id,
            product.price,
            &discounts,
            self.state.clock().local_now(),
        );
        Some(ProductView {
            product,
            sale_price,
        })
    }

    /// Drop every cached response.
    pub fn invalidate(&self) {
        self.cache().invalidate_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use bookstore_client::{ApiClient, ApiConfig};
    use bookstore_core::clock::SystemClock;
    use bookstore_core::storage::MemoryStore;

    use super::*;

    fn book(price: i64) -> Product {
        Product {
            id: ProductId::new(4),
            name: "Tắt đèn".to_string(),
            author: Some("Ngô Tất Tố".to_string()),
            publisher: None,
            description: None,
            price: Money::new(price),
            stock_quantity: 3,
            image_url: None,
            category_id: None,
            category_name: None,
        }
    }

    #[test]
    fn test_on_sale_only_below_list_price() {
        let view = ProductView {
            product: book(80_000),
            sale_price: Money::new(72_000),
        };
        assert!(view.is_on_sale());

        let view = ProductView {
            product: book(80_000),
            sale_price: Money::new(80_000),
        };
        assert!(!view.is_on_sale());
    }

    #[tokio::test]
    async fn test_unreachable_backend_reads_empty() {
        let api = ApiClient::new(&ApiConfig::new("http://127.0.0.1:9").unwrap()).unwrap();
        let sf = Storefront::new(api, Arc::new(MemoryStore::new()), Arc::new(SystemClock));
        let catalog = sf.catalog();

        let page = catalog
            .list_products(PageRequest::default(), &ProductFilter::default())
            .await;
        assert!(page.content.is_empty());
        assert!(catalog.categories().await.is_empty());
        assert!(catalog.product_view(ProductId::new(4)).await.is_none());
    }
}

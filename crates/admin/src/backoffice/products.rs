//! Product management.

use bookstore_core::pagination::{Page, PageRequest};
use bookstore_core::validation::ProductForm;
use bookstore_core::{Product, ProductId};
use tracing::{info, instrument};

use super::AdminClient;
use crate::error::AdminError;

/// Listing query for the product table.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub page: PageRequest,
    /// Switches the listing to keyword search.
    pub keyword: Option<String>,
}

impl AdminClient {
    /// One page of products, optionally filtered by keyword.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Page<Product> {
        let mut params = query.page.query().to_vec();
        match query.keyword.as_deref().map(str::trim) {
            Some(keyword) if !keyword.is_empty() => {
                params.push(("keyword", keyword.to_string()));
                self.api().get_page("products/search", &params).await
            }
            _ => self.api().get_page("products", &params).await,
        }
    }

    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Option<Product> {
        self.api().get_optional(&format!("products/{id}")).await
    }

    /// Edit form pre-filled from `product`.
    #[must_use]
    pub fn product_form(product: &Product) -> ProductForm {
        ProductForm {
            name: product.name.clone(),
            author: product.author.clone(),
            publisher: product.publisher.clone(),
            description: product.description.clone(),
            price: product.price.amount(),
            stock_quantity: i64::from(product.stock_quantity),
            category_id: product.category_id,
            image_url: product.image_url.clone(),
        }
    }

    /// # Errors
    ///
    /// Returns a validation error or the backend's error.
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn create_product(&self, form: &ProductForm) -> Result<Product, AdminError> {
        self.require_admin()?;
        form.validate()?;
        let product: Product = self.api().post("products", form).await?;
        info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns a validation error or the backend's error.
    #[instrument(skip(self, form), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        form: &ProductForm,
    ) -> Result<Product, AdminError> {
        self.require_admin()?;
        form.validate()?;
        let product: Product = self.api().put(&format!("products/{id}"), form).await?;
        info!("product updated");
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns the backend's error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), AdminError> {
        self.require_admin()?;
        self.api().delete(&format!("products/{id}")).await?;
        info!("product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bookstore_core::Money;

    use super::*;

    #[test]
    fn test_product_form_prefill() {
        let product = Product {
            id: ProductId::new(8),
            name: "Số đỏ".to_string(),
            author: Some("Vũ Trọng Phụng".to_string()),
            publisher: None,
            description: None,
            price: Money::new(68_000),
            stock_quantity: 12,
            image_url: None,
            category_id: None,
            category_name: Some("Văn học".to_string()),
        };
        let form = AdminClient::product_form(&product);
        assert_eq!(form.price, 68_000);
        assert_eq!(form.stock_quantity, 12);
        assert!(form.validate().is_ok());
    }
}

//! Product browsing and reviews.

use bookstore_core::pagination::PageRequest;
use bookstore_core::validation::ReviewForm;
use bookstore_core::{CategoryId, ProductId};
use bookstore_storefront::ProductFilter;
use bookstore_storefront::services::reviews::average_rating;
use clap::Subcommand;
use serde_json::json;
use tracing::info;

use super::PageArgs;
use crate::context::Context;
use crate::error::CliError;
use crate::output::emit;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List products, optionally within one category
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        category: Option<CategoryId>,
    },
    /// Search products by keyword
    Search {
        keyword: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show one product with its sale price and rating
    Show { id: ProductId },
    /// List categories
    Categories,
    /// List a product's reviews
    Reviews {
        id: ProductId,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Review a product (requires sign-in)
    Review {
        id: ProductId,
        /// 1 to 5 stars
        #[arg(short, long)]
        rating: u8,
        #[arg(short, long)]
        comment: String,
    },
}

pub async fn run(ctx: &Context, action: CatalogAction) -> Result<(), CliError> {
    let catalog = ctx.storefront.catalog();
    match action {
        CatalogAction::List { page, category } => {
            let filter = ProductFilter {
                category_id: category,
            };
            let products = catalog.list_products(page.request(), &filter).await;
            info!(
                "Page {} of {}, {} products",
                products.page_number(),
                products.total_pages.max(1),
                products.total_elements
            );
            emit(&products)
        }
        CatalogAction::Search { keyword, page } => {
            emit(&catalog.search_products(&keyword, page.request()).await)
        }
        CatalogAction::Show { id } => {
            let view = catalog
                .product_view(id)
                .await
                .ok_or_else(|| CliError::NotFound(format!("Product {id}")))?;
            let reviews = ctx
                .storefront
                .reviews()
                .for_product(id, PageRequest::default())
                .await;
            emit(&json!({
                "product": view.product,
                "sale_price": view.sale_price,
                "on_sale": view.is_on_sale(),
                "average_rating": average_rating(&reviews.content),
                "review_count": reviews.total_elements,
            }))
        }
        CatalogAction::Categories => emit(&catalog.categories().await),
        CatalogAction::Reviews { id, page } => {
            emit(&ctx.storefront.reviews().for_product(id, page.request()).await)
        }
        CatalogAction::Review {
            id,
            rating,
            comment,
        } => {
            let form = ReviewForm {
                product_id: id,
                rating,
                comment,
            };
            let review = ctx.storefront.reviews().submit(&form).await?;
            info!("Review posted");
            emit(&review)
        }
    }
}

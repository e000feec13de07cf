//! Back-office commands.
//!
//! # Usage
//!
//! ```bash
//! bookstore admin login -e admin@example.com -p secret123
//! bookstore admin products create --name "Dế Mèn phiêu lưu ký" --price 85000 --stock 20
//! bookstore admin vouchers create --code SALE10 --name "Giảm 10%" --percentage 10 \
//!     --start 2025-06-01 --end 2025-06-30
//! bookstore admin orders status 17 delivering
//! ```

use bookstore_admin::{AdminClient, ProductQuery, UserUpdate};
use bookstore_core::validation::{ProductForm, PromotionForm};
use bookstore_core::{
    CategoryId, DiscountId, Money, OrderId, OrderStatus, ProductId, ReviewId, UserId, UserRole,
    VoucherId,
};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use tracing::info;

use super::PageArgs;
use crate::context::Context;
use crate::error::CliError;
use crate::output::emit;

#[derive(Subcommand)]
pub enum AdminAction {
    /// Sign in with an administrator account
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Order counts, revenue and catalog size
    Dashboard,
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Manage product discounts
    Discounts {
        #[command(subcommand)]
        action: PromotionAction,
    },
    /// Manage checkout vouchers
    Vouchers {
        #[command(subcommand)]
        action: PromotionAction,
    },
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Moderate reviews
    Reviews {
        #[command(subcommand)]
        action: ReviewAction,
    },
}

#[derive(Subcommand)]
pub enum ProductAction {
    /// List products, optionally by keyword
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(short, long)]
        keyword: Option<String>,
    },
    Show {
        id: ProductId,
    },
    Create {
        #[command(flatten)]
        fields: ProductArgs,
    },
    /// Edit a product; omitted fields keep their current value
    Update {
        id: ProductId,
        #[command(flatten)]
        fields: ProductArgs,
    },
    Delete {
        id: ProductId,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct ProductArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    publisher: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Price in đồng
    #[arg(long)]
    price: Option<i64>,
    #[arg(long)]
    stock: Option<i64>,
    #[arg(long)]
    category: Option<CategoryId>,
    #[arg(long)]
    image: Option<String>,
}

impl ProductArgs {
    fn apply(self, form: &mut ProductForm) {
        if let Some(name) = self.name {
            form.name = name;
        }
        if self.author.is_some() {
            form.author = self.author;
        }
        if self.publisher.is_some() {
            form.publisher = self.publisher;
        }
        if self.description.is_some() {
            form.description = self.description;
        }
        if let Some(price) = self.price {
            form.price = price;
        }
        if let Some(stock) = self.stock {
            form.stock_quantity = stock;
        }
        if self.category.is_some() {
            form.category_id = self.category;
        }
        if self.image.is_some() {
            form.image_url = self.image;
        }
    }
}

#[derive(Subcommand)]
pub enum OrderAction {
    /// List orders, optionally by status
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Show an order with its products and allowed transitions
    Show { id: OrderId },
    /// Move an order to a new status
    Status { id: OrderId, status: OrderStatus },
    Delete { id: OrderId },
}

#[derive(Subcommand)]
pub enum PromotionAction {
    /// List with current status
    List,
    Show {
        id: i64,
    },
    Create {
        #[command(flatten)]
        fields: PromotionArgs,
    },
    /// Replace a promotion's fields
    Update {
        id: i64,
        #[command(flatten)]
        fields: PromotionArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Clone, Args)]
pub struct PromotionArgs {
    /// Code customers type (vouchers only)
    #[arg(long)]
    code: Option<String>,
    #[arg(long)]
    name: String,
    /// Percentage off, 0 < p <= 100
    #[arg(long, conflicts_with = "amount")]
    percentage: Option<Decimal>,
    /// Fixed amount off, in đồng
    #[arg(long)]
    amount: Option<i64>,
    /// YYYY-MM-DD
    #[arg(long)]
    start: Option<NaiveDate>,
    /// YYYY-MM-DD
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Product the discount applies to (repeatable)
    #[arg(long = "product")]
    products: Vec<ProductId>,
}

impl From<PromotionArgs> for PromotionForm {
    fn from(args: PromotionArgs) -> Self {
        Self {
            code: args.code,
            discount_name: args.name,
            discount_percentage: args.percentage,
            discount_amount: args.amount.map(Money::new),
            start_date: args.start,
            end_date: args.end,
            product_ids: args.products,
        }
    }
}

#[derive(Subcommand)]
pub enum UserAction {
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    Show {
        id: UserId,
    },
    /// Change name, role or active flag
    Update {
        id: UserId,
        #[arg(long)]
        name: Option<String>,
        /// USER or ADMIN
        #[arg(long)]
        role: Option<UserRole>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete {
        id: UserId,
    },
}

#[derive(Subcommand)]
pub enum ReviewAction {
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    Delete {
        id: ReviewId,
    },
}

pub async fn run(ctx: &Context, action: AdminAction) -> Result<(), CliError> {
    let admin = &ctx.admin;
    match action {
        AdminAction::Login { email, password } => {
            let user = admin.login(&email, &password).await?;
            info!("Signed in to the back office as {}", user.email);
            emit(&user)
        }
        AdminAction::Logout => {
            admin.logout()?;
            info!("Signed out");
            Ok(())
        }
        AdminAction::Dashboard => {
            admin.require_admin()?;
            emit(&admin.dashboard().await)
        }
        AdminAction::Products { action } => products(admin, action).await,
        AdminAction::Orders { action } => orders(admin, action).await,
        AdminAction::Discounts { action } => discounts(admin, action).await,
        AdminAction::Vouchers { action } => vouchers(admin, action).await,
        AdminAction::Users { action } => users(admin, action).await,
        AdminAction::Reviews { action } => match action {
            ReviewAction::List { page } => emit(&admin.list_reviews(page.request()).await),
            ReviewAction::Delete { id } => {
                admin.delete_review(id).await?;
                info!("Review {id} deleted");
                Ok(())
            }
        },
    }
}

async fn products(admin: &AdminClient, action: ProductAction) -> Result<(), CliError> {
    match action {
        ProductAction::List { page, keyword } => {
            let query = ProductQuery {
                page: page.request(),
                keyword,
            };
            emit(&admin.list_products(&query).await)
        }
        ProductAction::Show { id } => emit(&find_product(admin, id).await?),
        ProductAction::Create { fields } => {
            let mut form = ProductForm::default();
            fields.apply(&mut form);
            let product = admin.create_product(&form).await?;
            info!("Product {} created", product.id);
            emit(&product)
        }
        ProductAction::Update { id, fields } => {
            let mut form = AdminClient::product_form(&find_product(admin, id).await?);
            fields.apply(&mut form);
            emit(&admin.update_product(id, &form).await?)
        }
        ProductAction::Delete { id } => {
            admin.delete_product(id).await?;
            info!("Product {id} deleted");
            Ok(())
        }
    }
}

async fn find_product(
    admin: &AdminClient,
    id: ProductId,
) -> Result<bookstore_core::Product, CliError> {
    admin
        .product(id)
        .await
        .ok_or_else(|| CliError::NotFound(format!("Product {id}")))
}

async fn orders(admin: &AdminClient, action: OrderAction) -> Result<(), CliError> {
    match action {
        OrderAction::List { page, status } => {
            emit(&admin.list_orders(page.request(), status).await)
        }
        OrderAction::Show { id } => emit(&admin.order_editor(id).await?),
        OrderAction::Status { id, status } => {
            let order = admin
                .order(id)
                .await
                .ok_or_else(|| CliError::NotFound(format!("Order {id}")))?;
            let order = admin.update_order_status(&order, status).await?;
            info!("Order {id} is now {}", order.status.label());
            emit(&order)
        }
        OrderAction::Delete { id } => {
            admin.delete_order(id).await?;
            info!("Order {id} deleted");
            Ok(())
        }
    }
}

async fn discounts(admin: &AdminClient, action: PromotionAction) -> Result<(), CliError> {
    match action {
        PromotionAction::List => emit(&admin.list_discounts().await),
        PromotionAction::Show { id } => {
            let discount = admin
                .discount(DiscountId::new(id))
                .await
                .ok_or_else(|| CliError::NotFound(format!("Discount {id}")))?;
            emit(&discount)
        }
        PromotionAction::Create { fields } => {
            emit(&admin.create_discount(&fields.into()).await?)
        }
        PromotionAction::Update { id, fields } => {
            emit(&admin.update_discount(DiscountId::new(id), &fields.into()).await?)
        }
        PromotionAction::Delete { id } => {
            admin.delete_discount(DiscountId::new(id)).await?;
            info!("Discount {id} deleted");
            Ok(())
        }
    }
}

async fn vouchers(admin: &AdminClient, action: PromotionAction) -> Result<(), CliError> {
    match action {
        PromotionAction::List => emit(&admin.list_vouchers().await),
        PromotionAction::Show { id } => {
            let voucher = admin
                .voucher(VoucherId::new(id))
                .await
                .ok_or_else(|| CliError::NotFound(format!("Voucher {id}")))?;
            emit(&voucher)
        }
        PromotionAction::Create { fields } => emit(&admin.create_voucher(&fields.into()).await?),
        PromotionAction::Update { id, fields } => {
            emit(&admin.update_voucher(VoucherId::new(id), &fields.into()).await?)
        }
        PromotionAction::Delete { id } => {
            admin.delete_voucher(VoucherId::new(id)).await?;
            info!("Voucher {id} deleted");
            Ok(())
        }
    }
}

async fn users(admin: &AdminClient, action: UserAction) -> Result<(), CliError> {
    match action {
        UserAction::List { page } => emit(&admin.list_users(page.request()).await),
        UserAction::Show { id } => {
            let user = admin
                .user(id)
                .await
                .ok_or_else(|| CliError::NotFound(format!("User {id}")))?;
            emit(&user)
        }
        UserAction::Update {
            id,
            name,
            role,
            active,
        } => {
            let update = UserUpdate {
                full_name: name,
                role,
                active,
            };
            emit(&admin.update_user(id, &update).await?)
        }
        UserAction::Delete { id } => {
            admin.delete_user(id).await?;
            info!("User {id} deleted");
            Ok(())
        }
    }
}

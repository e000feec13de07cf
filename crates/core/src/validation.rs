//! Form validation.
//!
//! Every form a screen submits is checked here before a request goes out, so
//! obvious mistakes are reported per field without a round trip. The backend
//! re-validates everything; these checks are for feedback only.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::promotion::{DiscountValue, PromotionError};
use crate::types::{CategoryId, Email, Money, ProductId, ShippingInfo};

/// Minimum password length accepted at registration and password change.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum review comment length.
pub const MAX_COMMENT_LENGTH: usize = 1000;

/// Field-keyed validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", format_errors(&self.0))]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

fn format_errors(errors: &BTreeMap<&'static str, String>) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure; the first message per field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(value)` if nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

fn require(errors: &mut ValidationErrors, field: &'static str, value: &str, label: &str) {
    if value.trim().is_empty() {
        errors.add(field, format!("{label} is required"));
    }
}

fn check_email(errors: &mut ValidationErrors, value: &str) -> Option<Email> {
    Email::parse(value)
        .map_err(|e| errors.add("email", e.to_string()))
        .ok()
}

/// Vietnamese mobile/landline format: ten digits starting with 0.
#[must_use]
pub fn is_valid_phone(value: &str) -> bool {
    let value = value.trim();
    value.len() == 10 && value.starts_with('0') && value.bytes().all(|b| b.is_ascii_digit())
}

fn check_password(errors: &mut ValidationErrors, field: &'static str, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            field,
            format!("password must be at least {MIN_PASSWORD_LENGTH} characters"),
        );
    }
}

/// Sign-up form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub email: String,
    pub full_name: String,
    pub password: String,
    #[serde(skip_serializing)]
    pub confirm_password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl RegistrationForm {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<Email, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = check_email(&mut errors, &self.email);
        require(&mut errors, "full_name", &self.full_name, "full name");
        check_password(&mut errors, "password", &self.password);
        if self.password != self.confirm_password {
            errors.add("confirm_password", "passwords do not match");
        }
        if let Some(phone) = self.phone_number.as_deref().filter(|p| !p.trim().is_empty())
            && !is_valid_phone(phone)
        {
            errors.add("phone_number", "phone number must be 10 digits starting with 0");
        }
        match email {
            Some(email) => errors.into_result(email),
            None => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<Email, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = check_email(&mut errors, &self.email);
        require(&mut errors, "password", &self.password, "password");
        match email {
            Some(email) => errors.into_result(email),
            None => Err(errors),
        }
    }
}

/// Checks the delivery details entered at checkout.
///
/// # Errors
///
/// Returns every failing field.
pub fn validate_shipping(info: &ShippingInfo) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    require(&mut errors, "full_name", &info.full_name, "recipient name");
    require(&mut errors, "address", &info.address, "address");
    if !is_valid_phone(&info.phone_number) {
        errors.add("phone_number", "phone number must be 10 digits starting with 0");
    }
    errors.into_result(())
}

/// Account details a customer can edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileForm {
    pub full_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Sent as `YYYY-MM-DD`.
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

impl ProfileForm {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "full_name", &self.full_name, "full name");
        if let Some(phone) = self.phone_number.as_deref().filter(|p| !p.trim().is_empty())
            && !is_valid_phone(phone)
        {
            errors.add("phone_number", "phone number must be 10 digits starting with 0");
        }
        if self.date_of_birth.is_some_and(|dob| dob >= today) {
            errors.add("date_of_birth", "date of birth must be in the past");
        }
        errors.into_result(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PasswordChangeForm {
    pub current_password: String,
    pub new_password: String,
    #[serde(skip_serializing)]
    pub confirm_password: String,
}

impl PasswordChangeForm {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "current_password", &self.current_password, "current password");
        check_password(&mut errors, "new_password", &self.new_password);
        if self.new_password == self.current_password && !self.new_password.is_empty() {
            errors.add("new_password", "new password must differ from the current one");
        }
        if self.new_password != self.confirm_password {
            errors.add("confirm_password", "passwords do not match");
        }
        errors.into_result(())
    }
}

/// Admin product editor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductForm {
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub price: i64,
    pub stock_quantity: i64,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProductForm {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "name", &self.name, "product name");
        if self.price <= 0 {
            errors.add("price", "price must be greater than 0");
        }
        if self.stock_quantity < 0 {
            errors.add("stock_quantity", "stock cannot be negative");
        }
        errors.into_result(())
    }
}

/// Admin discount/voucher editor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromotionForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub discount_name: String,
    #[serde(default)]
    pub discount_percentage: Option<Decimal>,
    #[serde(default)]
    pub discount_amount: Option<Money>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub product_ids: Vec<ProductId>,
}

impl PromotionForm {
    /// Validate; vouchers additionally need a code.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self, requires_code: bool) -> Result<DiscountValue, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "discount_name", &self.discount_name, "name");

        if requires_code {
            match self.code.as_deref().map(str::trim) {
                None | Some("") => errors.add("code", "code is required"),
                Some(code) if code.chars().any(char::is_whitespace) => {
                    errors.add("code", "code must not contain spaces");
                }
                Some(_) => {}
            }
        }

        let value = DiscountValue::from_parts(self.discount_percentage, self.discount_amount)
            .map_err(|e| {
                let field = match e {
                    PromotionError::PercentageOutOfRange => "discount_percentage",
                    PromotionError::NonPositiveAmount => "discount_amount",
                    PromotionError::MissingValue | PromotionError::BothValues => "discount_value",
                };
                errors.add(field, e.to_string());
            })
            .ok();

        match (self.start_date, self.end_date) {
            (None, _) => errors.add("start_date", "start date is required"),
            (_, None) => errors.add("end_date", "end date is required"),
            (Some(start), Some(end)) if start > end => {
                errors.add("end_date", "end date must not be before start date");
            }
            _ => {}
        }

        match value {
            Some(value) => errors.into_result(value),
            None => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewForm {
    pub product_id: ProductId,
    pub rating: u8,
    pub comment: String,
}

impl ReviewForm {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !(1..=5).contains(&self.rating) {
            errors.add("rating", "rating must be between 1 and 5");
        }
        require(&mut errors, "comment", &self.comment, "comment");
        if self.comment.chars().count() > MAX_COMMENT_LENGTH {
            errors.add(
                "comment",
                format!("comment must be at most {MAX_COMMENT_LENGTH} characters"),
            );
        }
        errors.into_result(())
    }
}

//! Profile and password.

use bookstore_core::validation::PasswordChangeForm;
use chrono::NaiveDate;
use clap::Subcommand;
use tracing::info;

use crate::context::Context;
use crate::error::CliError;
use crate::output::emit;

#[derive(Subcommand)]
pub enum AccountAction {
    /// Refresh and show the profile
    Show,
    /// Edit the profile; omitted fields keep their current value
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        birthday: Option<NaiveDate>,
    },
    /// Change the password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
}

pub async fn run(ctx: &Context, action: AccountAction) -> Result<(), CliError> {
    let account = ctx.storefront.account();
    match action {
        AccountAction::Show => emit(&account.my_info().await?),
        AccountAction::Update {
            name,
            phone,
            address,
            birthday,
        } => {
            let mut form = account.profile_form()?;
            if let Some(name) = name {
                form.full_name = name;
            }
            if phone.is_some() {
                form.phone_number = phone;
            }
            if address.is_some() {
                form.address = address;
            }
            if birthday.is_some() {
                form.date_of_birth = birthday;
            }
            let user = account.update_profile(&form).await?;
            info!("Profile updated");
            emit(&user)
        }
        AccountAction::Password {
            current,
            new,
            confirm,
        } => {
            let form = PasswordChangeForm {
                current_password: current,
                new_password: new,
                confirm_password: confirm,
            };
            account.change_password(&form).await?;
            info!("Password changed");
            Ok(())
        }
    }
}

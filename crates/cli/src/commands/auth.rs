//! Sign-in, sign-up and confirmation emails.

use bookstore_core::Email;
use bookstore_core::validation::RegistrationForm;
use clap::Subcommand;
use tracing::info;

use crate::context::Context;
use crate::error::CliError;
use crate::output::emit;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in and remember the session
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign out and forget the session
    Logout,
    /// Create an account; a confirmation email is sent
    Register {
        #[arg(short, long)]
        email: String,
        /// Full name
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        password: String,
        /// Password again
        #[arg(long)]
        confirm: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Show the signed-in account
    Whoami,
    /// Resend the confirmation email
    Resend { email: Email },
    /// Show the resend counter and cooldown
    ResendStatus { email: Email },
}

pub async fn run(ctx: &Context, action: AuthAction) -> Result<(), CliError> {
    let auth = ctx.storefront.auth();
    match action {
        AuthAction::Login { email, password } => {
            let user = auth.login(&email, &password).await?;
            info!("Signed in as {} ({})", user.full_name, user.email);
            emit(&user)
        }
        AuthAction::Logout => {
            auth.logout().await?;
            info!("Signed out");
            Ok(())
        }
        AuthAction::Register {
            email,
            name,
            password,
            confirm,
            phone,
        } => {
            let form = RegistrationForm {
                email,
                full_name: name,
                password,
                confirm_password: confirm,
                phone_number: phone,
            };
            let user = auth.register(&form).await?;
            info!("Account created, check {} for the confirmation email", user.email);
            emit(&user)
        }
        AuthAction::Whoami => emit(&auth.require_user()?),
        AuthAction::Resend { email } => {
            let view = ctx.storefront.resend(email).resend().await?;
            info!("Confirmation email sent ({})", view.counter());
            emit(&view)
        }
        AuthAction::ResendStatus { email } => {
            let view = ctx.storefront.resend(email).view();
            if let Some(notice) = &view.notice {
                info!("{notice}");
            }
            emit(&view)
        }
    }
}

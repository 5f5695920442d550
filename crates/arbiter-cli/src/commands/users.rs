//! Users command - manage console and judge accounts.

use anyhow::{Context, Result};
use arbiter_api::{ResourceMutation, User, UserPayload};
use dialoguer::{Password, theme::ColorfulTheme};

use super::{Console, Row};
use crate::UserCommands;
use crate::theme::{Theme, id_list};

impl Row for User {
    const TITLE: &'static str = "Users";

    fn header() -> String {
        format!("{:>6}  {:<20} {:<28} {:<10} {}", "ID", "USERNAME", "EMAIL", "ROLES", "STATUS")
    }

    fn row(&self) -> String {
        format!(
            "{}  {:<20} {:<28} {:<10} {}",
            Theme::id(self.id),
            self.username,
            self.email.as_deref().unwrap_or("-"),
            id_list(&self.role_ids),
            Theme::active(self.is_active)
        )
    }
}

/// Read a new password without echoing it.
fn read_password() -> Result<String> {
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()
        .context("failed to read password")
}

pub(crate) async fn handle_users(console: &Console, command: UserCommands) -> Result<()> {
    match command {
        UserCommands::List {
            paging,
            role,
            active,
        } => {
            let mut query =
                Console::query(paging.page, paging.page_size, paging.keyword.as_deref());
            if let Some(role) = role {
                query = query.filter("role_id", role.to_string());
            }
            if let Some(active) = active {
                query = query.filter("is_active", active.to_string());
            }
            console.list::<User>(query).await
        },
        UserCommands::Create {
            username,
            email,
            roles,
            inactive,
        } => {
            let mut form = UserPayload::new(username)
                .with_email(email.unwrap_or_default())
                .with_roles(roles);
            if inactive {
                form = form.with_active(false);
            }
            // Check the form before asking for a password it would reject.
            arbiter_api::Payload::validate(&form)?;
            let form = form.with_password(read_password()?);
            console
                .mutate(ResourceMutation::<User>::create(console.api(), form))
                .await
        },
        UserCommands::Update {
            id,
            username,
            email,
            roles,
            active,
            password,
        } => {
            let mut form = UserPayload::new(username)
                .with_email(email.unwrap_or_default())
                .with_roles(roles);
            if let Some(active) = active {
                form = form.with_active(active);
            }
            if password {
                form = form.with_password(read_password()?);
            }
            console
                .mutate(ResourceMutation::<User>::update(console.api(), id, form))
                .await
        },
        UserCommands::Delete { id } => {
            console
                .mutate(ResourceMutation::<User>::delete(console.api(), id))
                .await
        },
    }
}

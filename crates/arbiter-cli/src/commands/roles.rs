//! Roles command - manage roles.

use anyhow::Result;
use arbiter_api::{ResourceMutation, Role, RolePayload};

use super::{Console, Row};
use crate::RoleCommands;
use crate::theme::{Theme, id_list};

impl Row for Role {
    const TITLE: &'static str = "Roles";

    fn header() -> String {
        format!("{:>6}  {:<24} {:<16} {}", "ID", "NAME", "PERMISSIONS", "DESCRIPTION")
    }

    fn row(&self) -> String {
        format!(
            "{}  {:<24} {:<16} {}",
            Theme::id(self.id),
            self.name,
            id_list(&self.permission_ids),
            Theme::dimmed(self.description.as_deref().unwrap_or(""))
        )
    }
}

fn payload(name: String, description: Option<String>, permissions: Vec<u64>) -> RolePayload {
    RolePayload::new(name)
        .with_description(description.unwrap_or_default())
        .with_permissions(permissions)
}

pub(crate) async fn handle_roles(console: &Console, command: RoleCommands) -> Result<()> {
    match command {
        RoleCommands::List { paging } => {
            console
                .list::<Role>(Console::query(
                    paging.page,
                    paging.page_size,
                    paging.keyword.as_deref(),
                ))
                .await
        },
        RoleCommands::Create {
            name,
            description,
            permissions,
        } => {
            let form = payload(name, description, permissions);
            console
                .mutate(ResourceMutation::<Role>::create(console.api(), form))
                .await
        },
        RoleCommands::Update {
            id,
            name,
            description,
            permissions,
        } => {
            let form = payload(name, description, permissions);
            console
                .mutate(ResourceMutation::<Role>::update(console.api(), id, form))
                .await
        },
        RoleCommands::Delete { id } => {
            console
                .mutate(ResourceMutation::<Role>::delete(console.api(), id))
                .await
        },
    }
}

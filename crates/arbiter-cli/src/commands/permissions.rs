//! Permissions command - manage permission entries.

use anyhow::Result;
use arbiter_api::{Permission, PermissionPayload, ResourceMutation};

use super::{Console, Row};
use crate::PermissionCommands;
use crate::theme::Theme;

impl Row for Permission {
    const TITLE: &'static str = "Permissions";

    fn header() -> String {
        format!("{:>6}  {:<24} {:<28} {}", "ID", "NAME", "CODE", "DESCRIPTION")
    }

    fn row(&self) -> String {
        format!(
            "{}  {:<24} {:<28} {}",
            Theme::id(self.id),
            self.name,
            self.code,
            Theme::dimmed(self.description.as_deref().unwrap_or(""))
        )
    }
}

pub(crate) async fn handle_permissions(console: &Console, command: PermissionCommands) -> Result<()> {
    match command {
        PermissionCommands::List { paging } => {
            console
                .list::<Permission>(Console::query(
                    paging.page,
                    paging.page_size,
                    paging.keyword.as_deref(),
                ))
                .await
        },
        PermissionCommands::Create {
            name,
            code,
            description,
        } => {
            let form =
                PermissionPayload::new(name, code).with_description(description.unwrap_or_default());
            console
                .mutate(ResourceMutation::<Permission>::create(console.api(), form))
                .await
        },
        PermissionCommands::Update {
            id,
            name,
            code,
            description,
        } => {
            let form =
                PermissionPayload::new(name, code).with_description(description.unwrap_or_default());
            console
                .mutate(ResourceMutation::<Permission>::update(console.api(), id, form))
                .await
        },
        PermissionCommands::Delete { id } => {
            console
                .mutate(ResourceMutation::<Permission>::delete(console.api(), id))
                .await
        },
    }
}

use crate::cli::CliContext;
use crate::core::audit_log::NoopAuditSink;
use crate::models::user::UserSummary;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Table,
    Json,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Table)]
    pub format: Format,
}

pub fn run(ctx: &CliContext, args: ListArgs) -> Result<()> {
    let (store, _) = ctx.open_store(NoopAuditSink);
    let users = sorted(store.list_users());
    match args.format {
        Format::Json => {
            let json = serde_json::to_string_pretty(&users).context("serialize user list")?;
            println!("{}", json);
        }
        Format::Table => print_table(&users),
    }
    Ok(())
}

/// The store iterates in hash order; present users by name.
pub fn sorted(mut users: Vec<UserSummary>) -> Vec<UserSummary> {
    users.sort_by(|a, b| a.username.cmp(&b.username));
    users
}

pub fn render_table(users: &[UserSummary]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Username").add_attribute(Attribute::Bold),
        Cell::new("Role").add_attribute(Attribute::Bold),
    ]);
    for user in users {
        table.add_row(vec![user.username.clone(), user.role.clone()]);
    }
    table
}

pub fn print_table(users: &[UserSummary]) {
    if users.is_empty() {
        println!("No users registered.");
        return;
    }
    println!("{}", render_table(users));
}

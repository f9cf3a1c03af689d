//! Interactive menu loop.
//!
//! Commands run one at a time against a single owned store. Exiting saves the
//! store; a failed save is reported and the menu stays open so nothing is lost.
//! A data file that exists but could not be read is only replaced after the
//! operator confirms it.

use crate::cli::{list, CliContext};
use crate::core::audit_log::AuditSink;
use crate::core::store::CredentialStore;
use crate::error::CredError;
use anyhow::{bail, Context, Result};
use dialoguer::{Confirm, Input, Password};
use zeroize::Zeroizing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AddUser,
    ListUsers,
    DeleteUser,
    Login,
    ResetPassword,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 6] = [
        MenuChoice::AddUser,
        MenuChoice::ListUsers,
        MenuChoice::DeleteUser,
        MenuChoice::Login,
        MenuChoice::ResetPassword,
        MenuChoice::Exit,
    ];

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::AddUser),
            "2" => Some(MenuChoice::ListUsers),
            "3" => Some(MenuChoice::DeleteUser),
            "4" => Some(MenuChoice::Login),
            "5" => Some(MenuChoice::ResetPassword),
            "6" => Some(MenuChoice::Exit),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuChoice::AddUser => "Add user",
            MenuChoice::ListUsers => "List users",
            MenuChoice::DeleteUser => "Delete user",
            MenuChoice::Login => "Log in",
            MenuChoice::ResetPassword => "Reset password",
            MenuChoice::Exit => "Exit",
        }
    }
}

pub fn run(ctx: &CliContext) -> Result<()> {
    if let Some(w) = &ctx.config_load_warning {
        println!("warning: {}", w);
    }
    let (mut store, load_error) = ctx.open_store(ctx.audit_sink());
    if let Some(e) = &load_error {
        println!("warning: {}", e);
        println!(
            "Starting with no users. Saving will overwrite {}.",
            ctx.paths.data_file.display()
        );
    }
    let mut overwrite_allowed = load_error.is_none();

    loop {
        print_menu();
        let input = match prompt_line("Choice") {
            Ok(input) => input,
            Err(e) => {
                tracing::debug!("menu input closed: {:#}", e);
                println!();
                return save_on_close(ctx, &store, overwrite_allowed);
            }
        };

        let outcome = match MenuChoice::parse(&input) {
            Some(MenuChoice::Exit) => {
                if !overwrite_allowed {
                    if !confirm_overwrite(ctx)? {
                        println!(
                            "{} left untouched; changes discarded.",
                            ctx.paths.data_file.display()
                        );
                        return Ok(());
                    }
                    overwrite_allowed = true;
                }
                println!("Saving and exiting...");
                match ctx.save_store(&store) {
                    Ok(()) => return Ok(()),
                    Err(e) => {
                        tracing::error!("{}", e);
                        println!("Could not save: {}", e);
                        println!("Changes are still in memory.");
                        println!("Fix the problem and choose 6 again.");
                        continue;
                    }
                }
            }
            Some(MenuChoice::AddUser) => add_user(&mut store),
            Some(MenuChoice::ListUsers) => {
                list::print_table(&list::sorted(store.list_users()));
                Ok(())
            }
            Some(MenuChoice::DeleteUser) => delete_user(&mut store),
            Some(MenuChoice::Login) => login(&mut store),
            Some(MenuChoice::ResetPassword) => reset_password(&mut store),
            None => {
                println!("Invalid choice, try again.");
                Ok(())
            }
        };

        if let Err(e) = outcome {
            println!("error: {:#}", e);
        }
    }
}

fn print_menu() {
    println!("\n--- User Management ---");
    for (i, choice) in MenuChoice::ALL.iter().enumerate() {
        println!("{}. {}", i + 1, choice.label());
    }
}

/// Input ended without choosing Exit: still try to keep the changes, unless
/// that would replace a data file that could not be read.
fn save_on_close<S: AuditSink>(
    ctx: &CliContext,
    store: &CredentialStore<S>,
    overwrite_allowed: bool,
) -> Result<()> {
    if !overwrite_allowed {
        bail!(
            "input closed; {} could not be read at startup and was left untouched",
            ctx.paths.data_file.display()
        );
    }
    if let Err(e) = ctx.save_store(store) {
        tracing::error!("{}", e);
        bail!("input closed and changes could not be saved: {}", e);
    }
    Ok(())
}

fn confirm_overwrite(ctx: &CliContext) -> Result<bool> {
    Confirm::new()
        .with_prompt(format!(
            "{} could not be read at startup. Overwrite it?",
            ctx.paths.data_file.display()
        ))
        .default(false)
        .interact()
        .context("read overwrite confirmation")
}

fn add_user<S: AuditSink>(store: &mut CredentialStore<S>) -> Result<()> {
    let username = prompt_username("Username")?;
    let password = prompt_secret("Password")?;
    let role = prompt_line("Role (admin/user)")?;
    match store.add_user(&username, &password, role.trim()) {
        Ok(()) => println!("User added."),
        Err(e) => report(&e),
    }
    Ok(())
}

fn delete_user<S: AuditSink>(store: &mut CredentialStore<S>) -> Result<()> {
    let username = prompt_username("Username to delete")?;
    let password = prompt_secret("Password")?;
    match store.delete_user(&username, &password) {
        Ok(()) => println!("User deleted."),
        Err(e) => report(&e),
    }
    Ok(())
}

fn login<S: AuditSink>(store: &mut CredentialStore<S>) -> Result<()> {
    let username = prompt_username("Username")?;
    // Locked accounts are turned away before a password is asked for.
    if store.is_locked(&username) {
        report(&CredError::AccountLocked(username));
        return Ok(());
    }
    let password = prompt_secret("Password")?;
    match store.authenticate(&username, &password) {
        Ok(()) => println!("Login successful. Welcome, {}!", username),
        Err(e @ CredError::WrongPassword(_)) => {
            report(&e);
            let used = store.failed_attempts(&username).unwrap_or(0);
            let left = store.max_failed_attempts().saturating_sub(used);
            if left == 0 {
                println!("Too many failed attempts: the account is now locked.");
            } else {
                println!("{} attempt(s) left before the account locks.", left);
            }
        }
        Err(e) => report(&e),
    }
    Ok(())
}

fn reset_password<S: AuditSink>(store: &mut CredentialStore<S>) -> Result<()> {
    let username = prompt_username("Username")?;
    let old_password = prompt_secret("Current password")?;
    if let Err(e) = store.verify(&username, &old_password) {
        report(&e);
        return Ok(());
    }
    let new_password = prompt_secret("New password")?;
    match store.rotate_password(&username, &old_password, &new_password) {
        Ok(()) => println!("Password changed."),
        Err(e) => report(&e),
    }
    Ok(())
}

fn report(err: &CredError) {
    println!("{}", user_message(err));
}

/// One-line message for the operator. Policy failures list every rule.
pub fn user_message(err: &CredError) -> String {
    match err {
        CredError::WeakPassword(weak) => {
            let rules: Vec<String> = weak.violations.iter().map(|v| v.to_string()).collect();
            format!("Password rejected: {}.", rules.join(", "))
        }
        CredError::WrongPassword(_) => "Wrong password.".to_string(),
        CredError::NotFound(user) => format!("User not found: {}.", user),
        CredError::DuplicateUser(user) => format!("Username already taken: {}.", user),
        CredError::AccountLocked(user) => {
            format!("Account {} is locked. Please contact an administrator.", user)
        }
        other => format!("error: {}", other),
    }
}

/// Usernames are single tokens: no whitespace or control characters.
pub fn validate_username(input: &str) -> Result<(), String> {
    if input.is_empty() {
        return Err("username cannot be empty".into());
    }
    if input.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("username cannot contain whitespace or control characters".into());
    }
    Ok(())
}

fn prompt_line(label: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(label)
        .interact_text()
        .with_context(|| format!("read {}", label.to_lowercase()))
}

fn prompt_username(label: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(label)
        .validate_with(|input: &String| validate_username(input))
        .interact_text()
        .with_context(|| format!("read {}", label.to_lowercase()))
}

fn prompt_secret(label: &str) -> Result<Zeroizing<String>> {
    let secret = Password::new()
        .with_prompt(label)
        .interact()
        .with_context(|| format!("read {}", label.to_lowercase()))?;
    Ok(Zeroizing::new(secret))
}

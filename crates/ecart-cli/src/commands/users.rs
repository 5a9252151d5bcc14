//! User management commands

use anyhow::{anyhow, Context, Result};
use ecart_core::db::Database;
use ecart_core::{require, Action, AuditLog, Caller, Role, UserStore};

fn parse_role(role: &str) -> Result<Role> {
    role.parse::<Role>()
        .map_err(|e| anyhow!("{}. Role must be 'admin' or 'assistant'", e))
}

pub fn cmd_users_list(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users registered. Add one with 'ecart users add <username>'.");
        return Ok(());
    }

    println!();
    println!("👥 Users");
    println!("   ─────────────────────────────────────────────");
    for user in &users {
        println!(
            "   {:>4}  {:<24} {:<10} {}",
            user.id,
            user.username,
            user.role.as_str(),
            user.created_at.format("%Y-%m-%d")
        );
    }

    Ok(())
}

pub fn cmd_users_add(db: &Database, caller: &Caller, username: &str, role: &str) -> Result<()> {
    require(caller, Action::Administer)?;
    let role = parse_role(role)?;

    let id = db.create_user(username, role)?;
    db.log_audit(&caller.username, "create", Some("user"), Some(id), Some(username))?;

    println!("✅ Added user '{}' as {} (id: {})", username, role, id);
    Ok(())
}

pub fn cmd_users_set_role(db: &Database, caller: &Caller, username: &str, role: &str) -> Result<()> {
    require(caller, Action::Administer)?;
    let role = parse_role(role)?;

    let user = db
        .get_user_by_username(username)?
        .with_context(|| format!("User not found: {}", username))?;
    db.set_user_role(user.id, role)?;
    db.log_audit(
        &caller.username,
        "update",
        Some("user"),
        Some(user.id),
        Some(role.as_str()),
    )?;

    println!("✅ {} is now {}", username, role);
    Ok(())
}

pub fn cmd_users_remove(db: &Database, caller: &Caller, username: &str) -> Result<()> {
    require(caller, Action::Administer)?;

    let user = db
        .get_user_by_username(username)?
        .with_context(|| format!("User not found: {}", username))?;
    db.delete_user(user.id)?;
    db.log_audit(&caller.username, "delete", Some("user"), Some(user.id), Some(username))?;

    println!("✅ Removed user '{}'", username);
    Ok(())
}

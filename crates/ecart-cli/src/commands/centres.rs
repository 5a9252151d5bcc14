//! Responsable and centre commands

use anyhow::{bail, Context, Result};
use ecart_core::db::Database;
use ecart_core::models::{NewCentre, NewResponsable};
use ecart_core::{require, Action, AuditLog, Caller, CentreStore, ResponsableStore};

use super::resolve_centre;

pub fn cmd_responsables_list(db: &Database) -> Result<()> {
    let responsables = db.list_responsables()?;

    if responsables.is_empty() {
        println!("No responsables found.");
        return Ok(());
    }

    println!();
    println!("🧑‍💼 Responsables");
    println!("   ─────────────────────────────────────────────");
    for r in &responsables {
        println!("   {:>4}  {}", r.id, r.full_name());
    }

    Ok(())
}

pub fn cmd_responsables_add(db: &Database, caller: &Caller, nom: &str, prenom: &str) -> Result<()> {
    require(caller, Action::Administer)?;

    let responsable = NewResponsable {
        nom: nom.to_string(),
        prenom: prenom.to_string(),
    };
    responsable.validate()?;
    let id = db.create_responsable(&responsable)?;
    db.log_audit(&caller.username, "create", Some("responsable"), Some(id), None)?;

    println!("✅ Added responsable {} {} (id: {})", prenom, nom, id);
    Ok(())
}

pub fn cmd_responsables_edit(
    db: &Database,
    caller: &Caller,
    id: i64,
    nom: Option<&str>,
    prenom: Option<&str>,
) -> Result<()> {
    require(caller, Action::Administer)?;

    let current = db
        .get_responsable(id)?
        .with_context(|| format!("Responsable not found: {}", id))?;
    let responsable = NewResponsable {
        nom: nom.unwrap_or(&current.nom).to_string(),
        prenom: prenom.unwrap_or(&current.prenom).to_string(),
    };
    responsable.validate()?;
    db.update_responsable(id, &responsable)?;
    db.log_audit(&caller.username, "update", Some("responsable"), Some(id), None)?;

    println!(
        "✅ Updated responsable {}: {} {}",
        id, responsable.prenom, responsable.nom
    );
    Ok(())
}

pub fn cmd_responsables_remove(db: &Database, caller: &Caller, id: i64) -> Result<()> {
    require(caller, Action::Administer)?;

    if !db.delete_responsable(id)? {
        bail!("Responsable not found: {}", id);
    }
    db.log_audit(&caller.username, "delete", Some("responsable"), Some(id), None)?;

    println!("✅ Removed responsable {}", id);
    Ok(())
}

pub fn cmd_centres_list(db: &Database) -> Result<()> {
    let centres = db.list_centres()?;

    if centres.is_empty() {
        println!("No centres found. Add one with 'ecart centres add <name> --responsable <id>'.");
        return Ok(());
    }

    println!();
    println!("🏢 Centres");
    println!("   ─────────────────────────────────────────────");
    for centre in &centres {
        let owner = match centre.responsable_id {
            Some(id) => db
                .get_responsable(id)?
                .map(|r| r.full_name())
                .unwrap_or_else(|| format!("#{}", id)),
            None => "(no responsable)".to_string(),
        };
        println!("   {:>4}  {:<24} {}", centre.id, centre.name, owner);
    }

    Ok(())
}

pub fn cmd_centres_add(db: &Database, caller: &Caller, name: &str, responsable_id: i64) -> Result<()> {
    require(caller, Action::Administer)?;

    let centre = NewCentre {
        name: name.to_string(),
        responsable_id,
    };
    centre.validate()?;
    let id = db.create_centre(&centre)?;
    db.log_audit(&caller.username, "create", Some("centre"), Some(id), Some(name))?;

    println!("✅ Added centre '{}' (id: {})", name, id);
    Ok(())
}

pub fn cmd_centres_edit(
    db: &Database,
    caller: &Caller,
    centre: &str,
    name: Option<&str>,
    responsable_id: Option<i64>,
) -> Result<()> {
    require(caller, Action::Administer)?;

    let current = resolve_centre(db, centre)?;
    let Some(responsable_id) = responsable_id.or(current.responsable_id) else {
        bail!(
            "Centre '{}' has no responsable; pass --responsable",
            current.name
        );
    };
    let updated = NewCentre {
        name: name.unwrap_or(&current.name).to_string(),
        responsable_id,
    };
    updated.validate()?;
    db.update_centre(current.id, &updated)?;
    db.log_audit(
        &caller.username,
        "update",
        Some("centre"),
        Some(current.id),
        Some(&updated.name),
    )?;

    println!("✅ Updated centre {} ({})", current.id, updated.name);
    Ok(())
}

pub fn cmd_centres_remove(db: &Database, caller: &Caller, centre: &str) -> Result<()> {
    require(caller, Action::Administer)?;

    let centre = resolve_centre(db, centre)?;
    db.delete_centre(centre.id)?;
    db.log_audit(
        &caller.username,
        "delete",
        Some("centre"),
        Some(centre.id),
        Some(&centre.name),
    )?;

    println!("✅ Removed centre '{}'", centre.name);
    println!("   Its budgets and expenses are kept and will show as N/A in exports");
    Ok(())
}

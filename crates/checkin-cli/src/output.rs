//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use checkin_core::{CheckIn, User};

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dimmed status line on stderr, keeping stdout for data.
pub fn status(msg: &str) {
    eprintln!("{}", msg.dimmed());
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a labeled field if it has a value.
pub fn opt_field(label: &str, value: Option<&str>) {
    if let Some(value) = value {
        field(label, value);
    }
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn user(user: &User) {
    field("ID", &user.id);
    field("Name", &user.name);
    field("Email", &user.email);
    field("Role", user.role.as_str());
    opt_field("Phone", user.phone.as_deref());
    opt_field("Region", user.region.as_deref());
    opt_field("Category", user.category.as_deref());
    if let Some(active) = user.active {
        field("Active", if active { "yes" } else { "no" });
    }
}

/// One line per user: id, role, name, email.
pub fn user_line(user: &User) {
    let status = match user.active {
        Some(false) => " (inactive)".red().to_string(),
        _ => String::new(),
    };
    println!(
        "{:>6}  {:<10}  {}  {}{}",
        user.id,
        user.role.as_str(),
        user.name.bold(),
        user.email.dimmed(),
        status
    );
}

/// One line per check-in: time, business, contact, rep when known.
pub fn checkin_line(checkin: &CheckIn) {
    let when = checkin.checked_in_at.format("%Y-%m-%d %H:%M");
    let business = checkin.location_name.as_deref().unwrap_or("-");
    let rep = checkin
        .rep_name
        .as_deref()
        .map(|rep| format!("  [{}]", rep))
        .unwrap_or_default();
    println!(
        "{:>6}  {}  {}  {}{}",
        checkin.id,
        when.to_string().dimmed(),
        business.bold(),
        checkin.contact_name,
        rep.dimmed()
    );
}

/// Print check-ins as lines or, with `as_json`, as a JSON array.
pub fn checkins(checkins: &[CheckIn], as_json: bool) -> Result<()> {
    if as_json {
        return json_pretty(&checkins);
    }
    if checkins.is_empty() {
        status("No check-ins found.");
        return Ok(());
    }
    for checkin in checkins {
        checkin_line(checkin);
    }
    status(&format!("{} check-in(s)", checkins.len()));
    Ok(())
}

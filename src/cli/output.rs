//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use std::collections::BTreeMap;

use comfy_table::{ContentArrangement, Table};
use console::style;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of secrets and the users who can read them.
pub fn print_access_table(listing: &BTreeMap<String, Vec<String>>) {
    if listing.is_empty() {
        info("No secrets in this vault yet.");
        tip("Run `sharevault create <NAME> --to <USER>` to add your first secret.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Secret", "Readable by"]);

    for (name, users) in listing {
        let readers = if users.is_empty() {
            style("(nobody)").dim().to_string()
        } else {
            users.join(", ")
        };
        table.add_row(vec![name.clone(), readers]);
    }

    println!("{table}");
}

/// Print the registered users.
pub fn print_users_table(users: &[String]) {
    if users.is_empty() {
        info("No users registered in this vault yet.");
        tip("Run `sharevault keygen <USER> --register` to add yourself.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["User"]);
    for user in users {
        table.add_row(vec![user.clone()]);
    }

    println!("{table}");
}

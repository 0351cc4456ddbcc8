use std::io::{self, Write};

use anyhow::Context;
use roster_core::auth::password::hash_password;

fn main() -> anyhow::Result<()> {
    eprint!("Enter password: ");
    io::stderr().flush()?;

    let mut password = String::new();
    io::stdin()
        .read_line(&mut password)
        .context("failed to read password from stdin")?;
    let password = password.trim();

    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }

    let hash = hash_password(password)?;
    println!("{hash}");
    Ok(())
}

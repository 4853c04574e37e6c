use std::{
    error::Error,
    io::{self},
    path::PathBuf,
    process::exit,
};

use bcrypt::DEFAULT_COST;
use clap::Parser;
use rusqlite::Connection;

use cheque_tracker::{PasswordHash, Role, ValidatedPassword, create_user, initialize_db};

/// A utility for adding a user who can log in to the cheque tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DATABASE_PATH", default_value = "data/cheques.db")]
    db_path: PathBuf,

    /// The name used to log in.
    #[arg(long)]
    username: String,

    /// One of admin, comptable, agent or lecteur.
    #[arg(long, default_value = "lecteur")]
    role: Role,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Some(parent) = args.db_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.is_dir()
    {
        print_error(format!("The directory {parent:#?} does not exist."));
        exit(1);
    }

    println!(
        "Creating {} user \"{}\" in {:#?}",
        args.role.label(),
        args.username,
        args.db_path
    );

    let Some(password_hash) = get_new_password_hash(&args.username) else {
        return Ok(());
    };

    let connection = Connection::open(&args.db_path)?;
    initialize_db(&connection)?;

    match create_user(&args.username, password_hash, args.role, &connection) {
        Ok(user) => {
            println!("Created user {} with ID {}.", user.username, user.id);
            Ok(())
        }
        Err(error) => {
            print_error(error);
            exit(1);
        }
    }
}

fn get_new_password_hash(username: &str) -> Option<PasswordHash> {
    loop {
        println!();

        let first_password = match rpassword::prompt_password("Enter a new password: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(error) => {
                print_error(format!("Could not read password from stdin: {error}"));
                return None;
            }
        };

        let validated_password = match ValidatedPassword::new(&first_password, &[username]) {
            Ok(password) => password,
            Err(error) => {
                print_error(error);
                continue;
            }
        };

        let second_password = match rpassword::prompt_password("Enter the same password again: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(error) => {
                print_error(format!("Could not read password from stdin: {error}"));
                return None;
            }
        };

        if first_password != second_password {
            print_error("Passwords must match, try again.");
            continue;
        }

        match PasswordHash::new(validated_password, DEFAULT_COST) {
            Ok(password_hash) => return Some(password_hash),
            Err(error) => {
                print_error(format!("Could not hash password: {error}. Try again."));
            }
        }
    }
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

/// From https://crates.io/crates/capitalize
fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}

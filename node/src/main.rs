// Copyright (c) 2026 LibEuFin Rust Port Contributors. MIT License.
// See LICENSE for details.

//! # EBICS Nexus
//!
//! Entry point for the `ebics-nexus` binary: local administration of EBICS
//! subscribers and API users.
//!
//! - `init`       — create the data directory and database
//! - `subscriber` — add, inspect, list, and confirm subscribers
//! - `user`       — add API users and check basic-auth headers
//! - `version`    — print build version information

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ebics_protocol::auth::{authenticate, NexusUser};
use ebics_protocol::config::EBICS_VERSION;
use ebics_protocol::storage::{EbicsDb, SubscriberStore};
use ebics_protocol::subscriber::{KeySlot, KeyState, LetterEntry, SubscriberId, SubscriberState};
use ebics_protocol::KeyLifecycle;

use cli::{Commands, NexusCli, SlotArg, SubscriberCommand, SubscriberIdArgs, UserCommand};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = NexusCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, cli.log_format);

    match cli.command {
        Commands::Init => {
            let db_path = init_data_dir(&cli.data_dir)?;
            println!("Nexus initialized.");
            println!("  Database : {}", db_path.display());
            Ok(())
        }
        Commands::Subscriber(command) => {
            let db = open_db(&cli.data_dir)?;
            run_subscriber_command(&db, command).await
        }
        Commands::User(command) => {
            let db = open_db(&cli.data_dir)?;
            run_user_command(&db, command)
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("db")
}

/// Create the data directory and database. Safe to repeat.
fn init_data_dir(data_dir: &Path) -> Result<PathBuf> {
    let path = db_path(data_dir);
    std::fs::create_dir_all(&path)
        .with_context(|| format!("failed to create database directory: {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(data_dir, std::fs::Permissions::from_mode(0o700))
            .with_context(|| format!("failed to restrict {}", data_dir.display()))?;
    }

    let db = EbicsDb::open(&path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    db.flush()?;
    tracing::info!(path = %path.display(), "database initialized");
    Ok(path)
}

fn open_db(data_dir: &Path) -> Result<EbicsDb> {
    let path = db_path(data_dir);
    if !path.exists() {
        bail!(
            "no database at {}; run `ebics-nexus init` first",
            path.display()
        );
    }
    EbicsDb::open(&path).with_context(|| format!("failed to open database at {}", path.display()))
}

// ---------------------------------------------------------------------------
// Subscribers
// ---------------------------------------------------------------------------

impl From<SubscriberIdArgs> for SubscriberId {
    fn from(args: SubscriberIdArgs) -> Self {
        let id = SubscriberId::new(args.host_id, args.partner_id, args.user_id);
        match args.system_id {
            Some(system) => id.with_system_id(system),
            None => id,
        }
    }
}

/// What `subscriber status` prints.
#[derive(Debug, Serialize)]
struct SubscriberReport {
    id: String,
    ebics_url: String,
    state: SubscriberState,
    bank_keys_known: bool,
    letter: Vec<LetterEntry>,
}

impl SubscriberReport {
    fn print_text(&self) {
        println!("Subscriber {}", self.id);
        println!("  URL       : {}", self.ebics_url);
        println!("  State     : {}", self.state);
        println!(
            "  Bank keys : {}",
            if self.bank_keys_known { "known" } else { "unknown (run HPB)" }
        );
        for entry in &self.letter {
            println!("  {:<13} {:<8} {}", entry.slot, entry.state, entry.fingerprint);
        }
    }
}

async fn run_subscriber_command(db: &EbicsDb, command: SubscriberCommand) -> Result<()> {
    let lifecycle = KeyLifecycle::new(Arc::new(db.clone()));
    match command {
        SubscriberCommand::Add { id, ebics_url } => {
            let subscriber = lifecycle
                .create_subscriber(id.into(), &ebics_url)
                .await?;
            println!("Subscriber {} created.", subscriber.id);
            report(&lifecycle, &subscriber.id)?.print_text();
        }
        SubscriberCommand::Status { id, json } => {
            let report = report(&lifecycle, &id.into())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                report.print_text();
            }
        }
        SubscriberCommand::Confirm { id, slot } => {
            let id = id.into();
            let state = confirm(&lifecycle, &id, slot).await?;
            println!("Subscriber {} is now {}.", id, state);
        }
        SubscriberCommand::List => {
            for id in db.list()? {
                let state = lifecycle.state(&id)?;
                println!("{}  {}", id, state);
            }
        }
    }
    Ok(())
}

fn report(lifecycle: &KeyLifecycle, id: &SubscriberId) -> Result<SubscriberReport> {
    let subscriber = lifecycle.load(id)?;
    Ok(SubscriberReport {
        id: subscriber.id.to_string(),
        ebics_url: subscriber.ebics_url.clone(),
        state: subscriber.state(),
        bank_keys_known: subscriber.bank_keys.is_some(),
        letter: subscriber.key_letter(),
    })
}

/// Release one slot, or every slot currently `New` for [`SlotArg::All`].
async fn confirm(
    lifecycle: &KeyLifecycle,
    id: &SubscriberId,
    slot: SlotArg,
) -> Result<SubscriberState> {
    let slots: Vec<KeySlot> = match slot {
        SlotArg::Signature => vec![KeySlot::Signature],
        SlotArg::Encryption => vec![KeySlot::Encryption],
        SlotArg::Authorization => vec![KeySlot::Authorization],
        SlotArg::All => {
            let subscriber = lifecycle.load(id)?;
            KeySlot::ALL
                .into_iter()
                .filter(|s| subscriber.keys.state_of(*s) == KeyState::New)
                .collect()
        }
    };
    if slots.is_empty() {
        bail!("subscriber {} has no keys awaiting confirmation", id);
    }

    let mut state = lifecycle.state(id)?;
    for slot in slots {
        state = lifecycle
            .confirm_key(id, slot)
            .await
            .with_context(|| format!("cannot confirm {} key", slot))?;
    }
    Ok(state)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

fn run_user_command(db: &EbicsDb, command: UserCommand) -> Result<()> {
    match command {
        UserCommand::Add {
            username,
            password,
            superuser,
        } => {
            db.create_user(&NexusUser::new(username.clone(), &password, superuser))
                .with_context(|| format!("cannot create user {}", username))?;
            tracing::info!(%username, superuser, "user created");
            println!("User {} created.", username);
        }
        UserCommand::Check { header } => {
            let user = authenticate(db, &header)?;
            println!(
                "Authenticated as {}{}.",
                user.username,
                if user.superuser { " (superuser)" } else { "" }
            );
        }
    }
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("ebics-nexus {}", env!("CARGO_PKG_VERSION"));
    println!("ebics       {}", EBICS_VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebics_protocol::subscriber::OrderType;

    fn id_args() -> SubscriberIdArgs {
        SubscriberIdArgs {
            host_id: "HOST01".into(),
            partner_id: "PARTNER1".into(),
            user_id: "USER1".into(),
            system_id: None,
        }
    }

    #[test]
    fn open_requires_init() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(open_db(dir.path()).is_err());
        init_data_dir(dir.path()).unwrap();
        assert!(open_db(dir.path()).is_ok());
    }

    #[tokio::test]
    async fn add_then_report_subscriber() {
        let db = EbicsDb::open_temporary().unwrap();
        run_subscriber_command(
            &db,
            SubscriberCommand::Add {
                id: id_args(),
                ebics_url: "https://bank.example/ebicsweb".into(),
            },
        )
        .await
        .unwrap();

        let lifecycle = KeyLifecycle::new(Arc::new(db.clone()));
        let report = report(&lifecycle, &id_args().into()).unwrap();
        assert_eq!(report.state, SubscriberState::New);
        assert!(!report.bank_keys_known);
        assert_eq!(report.letter.len(), 3);
    }

    #[tokio::test]
    async fn confirm_all_releases_new_keys_only() {
        let db = EbicsDb::open_temporary().unwrap();
        let lifecycle = KeyLifecycle::new(Arc::new(db.clone()));
        let id: SubscriberId = id_args().into();
        lifecycle
            .create_subscriber(id.clone(), "https://bank.example/ebicsweb")
            .await
            .unwrap();

        assert!(confirm(&lifecycle, &id, SlotArg::All).await.is_err());

        let mut subscriber = lifecycle.load(&id).unwrap();
        subscriber.keys.record_order_submission(&OrderType::Ini).unwrap();
        db.save(&subscriber).unwrap();

        let state = confirm(&lifecycle, &id, SlotArg::All).await.unwrap();
        assert_eq!(state, SubscriberState::PartiallyInitializedIni);
        let stored = lifecycle.load(&id).unwrap();
        assert_eq!(stored.keys.state_of(KeySlot::Signature), KeyState::Released);
        assert_eq!(stored.keys.state_of(KeySlot::Encryption), KeyState::Missing);
    }

    #[test]
    fn user_add_then_check() {
        let db = EbicsDb::open_temporary().unwrap();
        run_user_command(
            &db,
            UserCommand::Add {
                username: "username".into(),
                password: "password".into(),
                superuser: false,
            },
        )
        .unwrap();
        run_user_command(
            &db,
            UserCommand::Check {
                header: "Basic dXNlcm5hbWU6cGFzc3dvcmQ=".into(),
            },
        )
        .unwrap();
        assert!(run_user_command(
            &db,
            UserCommand::Check {
                header: "Basic Z2hvc3Q6cGFzc3dvcmQ=".into(),
            },
        )
        .is_err());
    }
}

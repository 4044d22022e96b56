//! Command-line front end for the household client.
//!
//! Every invocation restores the persisted session, loads the stores for it,
//! runs one command, and prints the resulting state.

use std::ffi::OsString;
use std::io::{self, Write};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use household_client::domain::{ColorDraft, ResourceId, RoomDraft, format_kronor};
use household_client::{ClientSettings, HttpHouseholdApp};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// `household` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "household",
    about = "Manage rooms, paint colors, and bank transactions for a household",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and persist the session.
    Login {
        /// Account name.
        username: String,
        /// Account password.
        #[arg(long)]
        password: String,
    },
    /// Create an account without logging in.
    Register {
        /// Account name.
        username: String,
        /// Account password.
        #[arg(long)]
        password: String,
    },
    /// Forget the persisted session.
    Logout,
    /// Show the current session.
    Whoami,
    /// List rooms grouped by floor.
    Rooms,
    /// Create a room.
    AddRoom {
        /// Room name.
        name: String,
        /// Floor label.
        #[arg(long)]
        floor: Option<String>,
        /// Room function, e.g. `Kitchen`.
        #[arg(long)]
        function: Option<String>,
        /// Floor area in square metres.
        #[arg(long)]
        area: Option<f64>,
    },
    /// Delete a room. Colors referencing it are kept.
    DeleteRoom {
        /// Room id.
        id: String,
    },
    /// Edit a room (not supported by the backend).
    UpdateRoom {
        /// Room id.
        id: String,
        /// New room name.
        name: String,
    },
    /// List colors with their room names.
    Colors,
    /// Record a paint color for a room.
    AddColor {
        /// NCS code, e.g. `S 0502-Y`.
        ncs: String,
        /// Display name.
        name: String,
        /// Room id.
        #[arg(long)]
        room: String,
    },
    /// Delete a color.
    DeleteColor {
        /// Color id.
        id: String,
    },
    /// List bank transactions.
    Transactions,
    /// Change a transaction's category.
    SetCategory {
        /// Transaction id.
        id: String,
        /// New category.
        category: String,
    },
    /// List the known categories.
    Categories,
    /// Import the demonstration transaction batch.
    Import,
    /// Show dashboard statistics.
    Stats,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let settings = ClientSettings::load_from_iter([OsString::from("household")])
        .map_err(|error| eyre!("failed to load settings: {error}"))?;
    init_tracing(settings.log_json);

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to create Tokio runtime")?;
    runtime.block_on(run(args.command, &settings))
}

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    let outcome = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    if let Err(error) = outcome {
        warn!(%error, "tracing init failed");
    }
}

async fn run(command: Command, settings: &ClientSettings) -> Result<()> {
    let app = HttpHouseholdApp::from_settings(settings).wrap_err("failed to build client")?;
    app.session().restore();
    app.sync_now().await;

    let mut out = io::stdout().lock();
    match command {
        Command::Login { username, password } => {
            let identity = app.session().login(&username, &password).await?;
            writeln!(out, "logged in as {}", identity.username())?;
        }
        Command::Register { username, password } => {
            app.session().register(&username, &password).await?;
            writeln!(out, "registered {username}; log in to continue")?;
        }
        Command::Logout => {
            app.session().logout();
            writeln!(out, "logged out")?;
        }
        Command::Whoami => match app.session().username() {
            Some(username) => writeln!(out, "{username}")?,
            None => writeln!(out, "not logged in")?,
        },
        Command::Categories => {
            for name in app.ledger().categories() {
                writeln!(out, "{name}")?;
            }
        }
        other => {
            require_login(&app)?;
            run_authenticated(&app, other, &mut out).await?;
        }
    }
    Ok(())
}

async fn run_authenticated(
    app: &HttpHouseholdApp,
    command: Command,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Rooms => list_rooms(app, out)?,
        Command::AddRoom {
            name,
            floor,
            function,
            area,
        } => {
            let mut draft = RoomDraft::try_new(&name)?.with_area(area);
            if let Some(floor_label) = floor {
                draft = draft.with_floor(floor_label);
            }
            if let Some(room_function) = function {
                draft = draft.with_function(room_function);
            }
            let room = app
                .resources()
                .add_room(draft)
                .await
                .ok_or_else(|| eyre!("room was not created"))?;
            writeln!(out, "created room {} ({})", room.name, room.id)?;
        }
        Command::DeleteRoom { id } => {
            let room_id = ResourceId::parse(&id);
            app.resources().delete_room(&room_id).await;
            if app.resources().rooms().iter().any(|room| room.id == room_id) {
                return Err(eyre!("room {room_id} was not deleted"));
            }
            writeln!(out, "deleted room {room_id}")?;
        }
        Command::UpdateRoom { id, name } => {
            let draft = RoomDraft::try_new(&name)?;
            app.resources()
                .update_room(&ResourceId::parse(&id), &draft)?;
        }
        Command::Colors => list_colors(app, out)?,
        Command::AddColor { ncs, name, room } => {
            let draft = ColorDraft::try_new(&ncs, &name, ResourceId::parse(&room))?;
            let color = app
                .resources()
                .add_color(draft)
                .await?
                .ok_or_else(|| eyre!("color was not created"))?;
            writeln!(out, "created color {} ({})", color.name, color.id)?;
        }
        Command::DeleteColor { id } => {
            let color_id = ResourceId::parse(&id);
            app.resources().delete_color(&color_id).await;
            if app
                .resources()
                .colors()
                .iter()
                .any(|color| color.id == color_id)
            {
                return Err(eyre!("color {color_id} was not deleted"));
            }
            writeln!(out, "deleted color {color_id}")?;
        }
        Command::Stats => {
            let stats = app
                .resources()
                .fetch_stats()
                .await
                .ok_or_else(|| eyre!("dashboard statistics unavailable"))?;
            writeln!(out, "total colors: {}", stats.total_colors)?;
        }
        other => run_ledger(app, other, out).await?,
    }
    Ok(())
}

async fn run_ledger(app: &HttpHouseholdApp, command: Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Transactions => {
            for transaction in app.ledger().transactions() {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}",
                    transaction.id,
                    transaction.display_date(),
                    transaction.description,
                    transaction.category,
                    transaction.display_amount()
                )?;
            }
        }
        Command::SetCategory { id, category } => {
            let transaction_id = ResourceId::parse(&id);
            app.ledger().update_category(&transaction_id, &category).await;
            let updated = app
                .ledger()
                .transactions()
                .into_iter()
                .find(|transaction| transaction.id == transaction_id)
                .filter(|transaction| transaction.category == category)
                .ok_or_else(|| eyre!("category of {transaction_id} was not changed"))?;
            writeln!(out, "{} is now {}", updated.id, updated.category)?;
        }
        Command::Import => {
            let before = app.ledger().transactions().len();
            app.ledger().simulate_import().await;
            let after = app.ledger().transactions();
            let total: f64 = after.iter().map(|transaction| transaction.amount).sum();
            writeln!(
                out,
                "{} transactions (+{}), balance {}",
                after.len(),
                after.len().saturating_sub(before),
                format_kronor(total)
            )?;
        }
        other => return Err(eyre!("unsupported command: {other:?}")),
    }
    Ok(())
}

fn list_rooms(app: &HttpHouseholdApp, out: &mut impl Write) -> Result<()> {
    for group in app.resources().rooms_by_floor() {
        writeln!(out, "Floor {}", group.floor)?;
        for room in group.rooms {
            writeln!(out, "  {}\t{}\t{}", room.id, room.name, room.function)?;
        }
    }
    Ok(())
}

fn list_colors(app: &HttpHouseholdApp, out: &mut impl Write) -> Result<()> {
    for color in app.resources().colors() {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            color.id,
            color.ncs,
            color.name,
            app.resources().room_label(&color)
        )?;
    }
    Ok(())
}

fn require_login(app: &HttpHouseholdApp) -> Result<()> {
    if app.session().snapshot().is_authenticated() {
        Ok(())
    } else {
        Err(eyre!("not logged in; run `household login <username>` first"))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for argument parsing.

    use clap::Parser;
    use rstest::rstest;

    use super::{CliArgs, Command};

    fn parse(args: &[&str]) -> Command {
        CliArgs::try_parse_from(std::iter::once("household").chain(args.iter().copied()))
            .expect("arguments should parse")
            .command
    }

    #[rstest]
    fn login_takes_password_flag() {
        let command = parse(&["login", "ada", "--password", "secret"]);
        assert!(matches!(
            command,
            Command::Login { ref username, ref password } if username == "ada" && password == "secret"
        ));
    }

    #[rstest]
    fn add_room_options_are_optional() {
        let command = parse(&["add-room", "Kitchen"]);
        assert!(matches!(
            command,
            Command::AddRoom { ref name, floor: None, function: None, area: None } if name == "Kitchen"
        ));
    }

    #[rstest]
    fn add_room_accepts_area() {
        let command = parse(&["add-room", "Hall", "--floor", "2", "--area", "12.5"]);
        let Command::AddRoom { floor, area, .. } = command else {
            panic!("expected add-room");
        };
        assert_eq!(floor.as_deref(), Some("2"));
        assert_eq!(area.map(|value| value.to_string()).as_deref(), Some("12.5"));
    }

    #[rstest]
    fn add_color_requires_room() {
        let result = CliArgs::try_parse_from(["household", "add-color", "S 0502-Y", "Chalk"]);
        assert!(result.is_err());
    }

    #[rstest]
    #[case(&["rooms"])]
    #[case(&["transactions"])]
    #[case(&["set-category", "7", "Food"])]
    #[case(&["import"])]
    #[case(&["stats"])]
    fn subcommands_parse(#[case] args: &[&str]) {
        let _command = parse(args);
    }
}

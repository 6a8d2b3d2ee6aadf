use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use rave_client::models::EventFilter;
use rave_client::store::FileTokenStore;
use rave_client::{ApiResult, Config, Rave};

#[derive(Parser)]
#[command(name = "rave", about = "Command-line access to the rave events API")]
struct Cli {
    /// API host, without the /api/v1 suffix
    #[arg(long, env = "RAVE_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List published events
    Events {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        tag: Option<String>,
    },
    /// Show one event with its ticket types
    Event { id: Uuid },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "RAVE_PASSWORD")]
        password: String,
    },
    Logout,
    Whoami,
    /// Add or remove an event from the wishlist
    Wishlist { event_id: String },
    /// List tickets owned by the logged-in user
    Tickets,
    /// Check a ticket in by its QR payload (hosts only)
    CheckIn { qr_code: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Early so clap's env fallbacks and RUST_LOG see .env values too
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }

    let tokens = Arc::new(FileTokenStore::new(config.token_path.clone()));
    let rave = match Rave::from_config(&config, tokens) {
        Ok(rave) => rave,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::debug!(api = %rave.client().base_url(), "Client ready");

    match run(&rave, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error [{}]: {}", e.code(), e.message());
            ExitCode::FAILURE
        }
    }
}

async fn run(rave: &Rave, command: Command) -> ApiResult<()> {
    match command {
        Command::Events { search, tag } => {
            let filter = EventFilter {
                search,
                tag,
                ..EventFilter::default()
            };
            for event in rave.events(&filter).await? {
                println!(
                    "{}  {} {}  {}",
                    event.id, event.start_date, event.start_time, event.title
                );
            }
        }
        Command::Event { id } => {
            let event = rave.event(id).await?;
            println!("{} ({:?})", event.title, event.status);
            println!("{} {} @ {}", event.start_date, event.start_time, event.location.address);
            for ticket_type in &event.ticket_types {
                println!(
                    "  {:<20} {:>10}  {} left",
                    ticket_type.name,
                    ticket_type.price,
                    ticket_type.remaining()
                );
            }
        }
        Command::Login { email, password } => {
            let user = rave.login(&email, &password).await?;
            println!("Logged in as {} ({})", user.username, user.email);
        }
        Command::Logout => {
            rave.logout().await;
            println!("Logged out");
        }
        Command::Whoami => match rave.me().await? {
            Some(user) => println!("{} <{}> [{:?}]", user.username, user.email, user.role),
            None => println!("Not logged in"),
        },
        Command::Wishlist { event_id } => {
            let saved = rave.toggle_wishlist(&event_id).await?;
            println!("{}", if saved { "Saved to wishlist" } else { "Removed from wishlist" });
        }
        Command::Tickets => match rave.my_tickets().await? {
            Some(tickets) => {
                for ticket in tickets {
                    println!(
                        "{}  event {}  x{}  {}",
                        ticket.id,
                        ticket.event_id,
                        ticket.quantity,
                        if ticket.checked_in { "checked in" } else { "valid" }
                    );
                }
            }
            None => println!("Not logged in"),
        },
        Command::CheckIn { qr_code } => {
            let result = rave.check_in(&qr_code).await?;
            println!(
                "{} ({}){}",
                result.attendee.name,
                result.attendee.ticket_type_name,
                if result.already_checked_in { " - already checked in" } else { "" }
            );
        }
    }
    Ok(())
}

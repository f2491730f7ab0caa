mod commands;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use helpdesk::config::Config;
use helpdesk::db::Database;
use helpdesk::store::MemoryStore;
use helpdesk::{telemetry, Services};

use commands::init::{DB_FILE, HELPDESK_DIR};

#[derive(Parser)]
#[command(name = "helpdesk")]
#[command(about = "Help-desk ticketing with customer satisfaction surveys")]
#[command(version)]
struct Cli {
    /// Database file (defaults to .helpdesk/helpdesk.db in this or a parent directory)
    #[arg(long, global = true, env = "HELPDESK_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a helpdesk database (in .helpdesk/, or at --db)
    Init,

    /// Serve the HTTP API
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,
        /// Keep everything in memory; nothing is written to disk
        #[arg(long)]
        ephemeral: bool,
    },

    /// User management
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Open a new ticket
    Create {
        /// Ticket title
        title: String,
        /// Customer who raised the ticket
        #[arg(short, long)]
        user: i64,
        /// Ticket description
        #[arg(short, long)]
        description: Option<String>,
        /// Priority (low, medium, high, critical)
        #[arg(short, long, default_value = "medium")]
        priority: String,
    },

    /// List tickets, newest first
    List {
        /// Filter by status (todo, in-progress, waiting-vendor, resolved)
        #[arg(short, long)]
        status: Option<String>,
        /// Filter by priority
        #[arg(short, long)]
        priority: Option<String>,
        /// Filter by customer
        #[arg(short, long)]
        user: Option<i64>,
    },

    /// Show ticket details
    Show {
        /// Ticket ID
        id: i64,
    },

    /// Move a ticket to another status
    Status {
        /// Ticket ID
        id: i64,
        /// New status
        status: String,
    },

    /// Add a message to a ticket
    Comment {
        /// Ticket ID
        id: i64,
        /// Message text
        text: String,
        /// Author user ID
        #[arg(short, long)]
        author: Option<i64>,
    },

    /// Satisfaction surveys
    Survey {
        #[command(subcommand)]
        action: SurveyCommands,
    },

    /// Departments
    Department {
        #[command(subcommand)]
        action: DepartmentCommands,
    },

    /// Service-level targets per priority
    Sla {
        #[command(subcommand)]
        action: SlaCommands,
    },

    /// Canned replies for agents
    Reply {
        #[command(subcommand)]
        action: ReplyCommands,
    },

    /// Knowledge-base articles
    Kb {
        #[command(subcommand)]
        action: KbCommands,
    },

    /// Export everything as JSON
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a user
    Add {
        email: String,
        full_name: String,
        /// Role (agent, customer)
        #[arg(short, long, default_value = "customer")]
        role: String,
    },
    /// List users
    List,
}

#[derive(Subcommand)]
enum SurveyCommands {
    /// Issue a survey for a ticket
    Create {
        /// Ticket ID
        ticket: i64,
    },
    /// Submit a rating for a survey token
    Submit {
        token: String,
        /// Rating from 1 to 5
        #[arg(allow_negative_numbers = true)]
        rating: i64,
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Show a survey by token
    Show { token: String },
    /// Average rating over submitted surveys
    Stats,
}

#[derive(Subcommand)]
enum DepartmentCommands {
    /// Add a department
    Add {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List departments
    List,
}

#[derive(Subcommand)]
enum SlaCommands {
    /// Set the targets for a priority, replacing earlier ones
    Set {
        /// Priority (low, medium, high, critical)
        priority: String,
        /// Minutes until the first agent reply is due
        #[arg(allow_negative_numbers = true)]
        first_response: i64,
        /// Minutes until resolution is due
        #[arg(allow_negative_numbers = true)]
        resolution: i64,
    },
    /// List configured targets
    List,
    /// Show how a ticket stands against its targets
    Check {
        /// Ticket ID
        ticket: i64,
    },
}

#[derive(Subcommand)]
enum ReplyCommands {
    /// Save a reply
    Add {
        title: String,
        body: String,
        /// Author user ID
        #[arg(short, long)]
        author: Option<i64>,
    },
    /// List saved replies
    List,
}

#[derive(Subcommand)]
enum KbCommands {
    /// Write an article
    Add {
        title: String,
        body: String,
        #[arg(short, long)]
        category: Option<String>,
        /// Keep it unpublished
        #[arg(long)]
        draft: bool,
    },
    /// Search articles by title or body
    Search {
        query: Option<String>,
        /// Include unpublished articles
        #[arg(long)]
        drafts: bool,
    },
    /// Show an article
    Show {
        /// Article ID
        id: i64,
    },
}

fn find_helpdesk_dir() -> Result<PathBuf> {
    let mut current = env::current_dir()?;

    loop {
        let candidate = current.join(HELPDESK_DIR);
        if candidate.is_dir() {
            return Ok(candidate);
        }

        if !current.pop() {
            bail!("Not a helpdesk directory (or any parent). Run 'helpdesk init' first.");
        }
    }
}

fn open_services(db: Option<PathBuf>, config: &Config) -> Result<Services> {
    let db_path = match db {
        Some(path) => path,
        None => find_helpdesk_dir()?.join(DB_FILE),
    };
    let database = Database::open(&db_path).context("Failed to open database")?;
    Ok(Services::new(Arc::new(database), &config.workflow))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    telemetry::init(config.log.format);

    let db = cli.db.or_else(|| config.database_path.clone());

    match cli.command {
        Commands::Init => {
            let cwd = env::current_dir()?;
            commands::init::run(&cwd, db.as_deref())
        }

        Commands::Serve {
            host,
            port,
            ephemeral,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let services = if ephemeral {
                Services::new(Arc::new(MemoryStore::new()), &config.workflow)
            } else {
                open_services(db, &config)?
            };
            commands::serve::run(
                services,
                &config.bind_address(),
                Duration::from_secs(config.server.shutdown_timeout),
            )
        }

        Commands::User { action } => {
            let services = open_services(db, &config)?;
            match action {
                UserCommands::Add {
                    email,
                    full_name,
                    role,
                } => commands::user::add(&services, &email, &full_name, &role),
                UserCommands::List => commands::user::list(&services),
            }
        }

        Commands::Create {
            title,
            user,
            description,
            priority,
        } => {
            let services = open_services(db, &config)?;
            commands::create::run(&services, &title, description.as_deref(), &priority, user)
        }

        Commands::List {
            status,
            priority,
            user,
        } => {
            let services = open_services(db, &config)?;
            commands::list::run(&services, status.as_deref(), priority.as_deref(), user)
        }

        Commands::Show { id } => {
            let services = open_services(db, &config)?;
            commands::show::run(&services, id)
        }

        Commands::Status { id, status } => {
            let services = open_services(db, &config)?;
            commands::status::run(&services, id, &status)
        }

        Commands::Comment { id, text, author } => {
            let services = open_services(db, &config)?;
            commands::comment::run(&services, id, &text, author)
        }

        Commands::Survey { action } => {
            let services = open_services(db, &config)?;
            match action {
                SurveyCommands::Create { ticket } => commands::survey::create(&services, ticket),
                SurveyCommands::Submit {
                    token,
                    rating,
                    comment,
                } => commands::survey::submit(&services, &token, rating, comment.as_deref()),
                SurveyCommands::Show { token } => commands::survey::show(&services, &token),
                SurveyCommands::Stats => commands::survey::stats(&services),
            }
        }

        Commands::Department { action } => {
            let services = open_services(db, &config)?;
            match action {
                DepartmentCommands::Add { name, description } => {
                    commands::department::add(&services, &name, description.as_deref())
                }
                DepartmentCommands::List => commands::department::list(&services),
            }
        }

        Commands::Sla { action } => {
            let services = open_services(db, &config)?;
            match action {
                SlaCommands::Set {
                    priority,
                    first_response,
                    resolution,
                } => commands::sla::set(&services, &priority, first_response, resolution),
                SlaCommands::List => commands::sla::list(&services),
                SlaCommands::Check { ticket } => commands::sla::check(&services, ticket),
            }
        }

        Commands::Reply { action } => {
            let services = open_services(db, &config)?;
            match action {
                ReplyCommands::Add {
                    title,
                    body,
                    author,
                } => commands::reply::add(&services, &title, &body, author),
                ReplyCommands::List => commands::reply::list(&services),
            }
        }

        Commands::Kb { action } => {
            let services = open_services(db, &config)?;
            match action {
                KbCommands::Add {
                    title,
                    body,
                    category,
                    draft,
                } => commands::kb::add(&services, &title, &body, category.as_deref(), draft),
                KbCommands::Search { query, drafts } => {
                    commands::kb::search(&services, query.as_deref(), drafts)
                }
                KbCommands::Show { id } => commands::kb::show(&services, id),
            }
        }

        Commands::Export { output } => {
            let services = open_services(db, &config)?;
            commands::export::run_json(&services, output.as_deref())
        }
    }
}

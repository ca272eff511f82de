use clap::{Parser, Subcommand};
use userhub::config::DatabaseSettings;
use userhub::database::{self, schema};
use userhub::services::user_admin;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, verbatim_doc_comment)]
/// Command line administration for userhub.
/// Manages the schema and user accounts directly in the database.
struct Cli {
    /// Database URL, defaults to `DATABASE_URL`.
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Schema management.
    Db {
        #[command(subcommand)]
        db_command: DbCommand,
    },
    /// Account management.
    Users {
        #[command(subcommand)]
        users_command: UsersCommand,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommand {
    /// Creates missing tables and indexes.
    Init,
    /// Drops every table. Use with care!
    Wipe {
        /// Required confirmation.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    /// Prints users as JSON, oldest first.
    List {
        #[arg(short, long, default_value_t = 50)]
        limit: u64,
    },
    /// Activates an account without the emailed code.
    Activate {
        #[arg(short, long)]
        email: String,
    },
    /// Deletes an account with its posts and follow edges.
    Delete {
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));
    let cli = Cli::parse();

    let db = match &cli.database_url {
        Some(url) => {
            database::connect_with_settings(&DatabaseSettings::default_from_url(url.clone())).await?
        }
        None => database::connect().await?,
    };

    match cli.command {
        Commands::Db { db_command } => match db_command {
            DbCommand::Init => {
                schema::create_tables(&db).await?;
                println!("Schema is ready.");
            }
            DbCommand::Wipe { yes } => {
                if !yes {
                    return Err("Refusing to wipe without --yes".into());
                }
                schema::drop_tables(&db).await?;
                println!("All tables dropped.");
            }
        },
        Commands::Users { users_command } => match users_command {
            UsersCommand::List { limit } => {
                let users = user_admin::list_users(&db, limit).await?;
                println!("{}", serde_json::to_string_pretty(&users)?);
            }
            UsersCommand::Activate { email } => {
                let user = user_admin::activate_user(&db, &email).await?;
                println!("User {} ({}) is active.", user.id, user.email);
            }
            UsersCommand::Delete { email } => {
                user_admin::delete_user(&db, &email).await?;
                println!("User {} deleted.", email);
            }
        },
    }

    Ok(())
}

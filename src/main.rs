use clap::Parser;
use sharevault::cli::{Cli, Commands, UserAction};
use tracing_subscriber::EnvFilter;

/// Env var controlling log verbosity (`RUST_LOG` syntax).
const LOG_ENV: &str = "SHAREVAULT_LOG";

fn main() {
    // Logs go to stderr so `sharevault read` output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => sharevault::cli::commands::init::execute(&cli),
        Commands::Keygen {
            ref user_id,
            ref out,
            protect,
            register,
        } => sharevault::cli::commands::keygen::execute(
            &cli,
            user_id,
            out.as_deref(),
            protect,
            register,
        ),
        Commands::User { ref action } => match action {
            UserAction::Add {
                ref user_id,
                ref public_key,
            } => sharevault::cli::commands::user::execute_add(&cli, user_id, public_key),
            UserAction::List => sharevault::cli::commands::user::execute_list(&cli),
        },
        Commands::Create {
            ref name,
            ref value,
            ref recipients,
        } => sharevault::cli::commands::create::execute(&cli, name, value.as_deref(), recipients),
        Commands::Read { ref name } => sharevault::cli::commands::read::execute(&cli, name),
        Commands::Update {
            ref name,
            ref value,
        } => sharevault::cli::commands::update::execute(&cli, name, value.as_deref()),
        Commands::Delete { ref name, force } => {
            sharevault::cli::commands::delete::execute(&cli, name, force)
        }
        Commands::List => sharevault::cli::commands::list::execute(&cli),
        Commands::Share {
            ref name,
            ref users,
        } => sharevault::cli::commands::share::execute(&cli, name, users),
        Commands::Unshare {
            ref name,
            ref users,
        } => sharevault::cli::commands::unshare::execute(&cli, name, users),
    };

    if let Err(e) = result {
        sharevault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

use clap::{Parser, Subcommand};

/// Command-line interface definition for rTimesheet
/// Password-gated personal timesheet served over HTTP, stored in SQLite
#[derive(Parser)]
#[command(
    name = "rtimesheet",
    version = env!("CARGO_PKG_VERSION"),
    about = "A personal timesheet web app: log daily work entries and browse them by month",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Run the HTTP server
    Serve {
        #[arg(
            long = "bind",
            value_name = "ADDR",
            help = "Address to listen on (overrides the configured bind address)"
        )]
        bind: Option<String>,
    },

    /// Print the SHA-256 hex digest of a password, for HASHED_PASSWORD
    HashPassword {
        /// Plaintext password to hash
        password: String,
    },

    /// Show the effective configuration
    Config {
        #[arg(
            long = "print",
            help = "Print the current configuration (secrets redacted)"
        )]
        print_config: bool,
    },

    /// Manage the database (migrations, integrity checks, info)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },
}

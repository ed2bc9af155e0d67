use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "syncgate",
    about = "Syncgate: per-write authorization for document sync",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Authorize one proposed write and show the grants it would emit
    ///
    /// Exits 0 when the write is accepted, 1 when it is rejected and 2 when
    /// an input cannot be read.
    Check {
        /// Policy file (`.json` for JSON, anything else is read as TOML)
        #[arg(long)]
        policy: String,

        /// Proposed revision (JSON document)
        #[arg(long)]
        new: String,

        /// Stored revision being replaced, if any (JSON document)
        #[arg(long)]
        old: Option<String>,

        /// Principal attempting the write (JSON: name, roles, channels, admin)
        #[arg(long)]
        principal: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compile per-type ACL declarations (TOML) into a JSON policy
    Compile {
        /// ACL manifest path
        #[arg(long)]
        acl: String,

        /// Write the policy here instead of stdout
        #[arg(long)]
        out: Option<String>,
    },

    /// Summarize the requirements registered by a policy
    Registry {
        /// Policy file (`.json` for JSON, anything else is read as TOML)
        #[arg(long)]
        policy: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

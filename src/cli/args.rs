//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::UnresolvedMembers;

/// Merge layer filter trees between drawing documents
#[derive(Parser, Debug)]
#[command(name = "lfmerge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Increase verbosity (-d: info, -dd: debug, -ddd: trace)
    #[arg(short = 'd', long = "debug", action = ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge layer filters from a source document into a destination
    Import {
        /// Destination document (modified in place)
        #[arg(value_hint = ValueHint::FilePath)]
        dest: PathBuf,

        /// Source document; omit to pick one interactively
        #[arg(value_hint = ValueHint::FilePath)]
        source: Option<PathBuf>,

        /// Directory to scan for candidate documents (default: search_dir)
        #[arg(long, value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,

        /// Override the unresolved-member policy
        #[arg(long, value_enum)]
        on_unresolved: Option<PolicyArg>,
    },

    /// Merge layer filters from the configured default template
    Template {
        /// Destination document (modified in place)
        #[arg(value_hint = ValueHint::FilePath)]
        dest: PathBuf,

        /// Override the unresolved-member policy
        #[arg(long, value_enum)]
        on_unresolved: Option<PolicyArg>,
    },

    /// Show a document's filter tree
    Tree {
        /// Document file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// List a document's layer table
    Layers {
        /// Document file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init,

    /// Show config path
    Path,
}

/// CLI-facing unresolved-member policy.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyArg {
    /// Omit members without a destination mapping
    Drop,
    /// Abort the import on the first unmapped member
    Fail,
}

impl From<PolicyArg> for UnresolvedMembers {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Drop => UnresolvedMembers::Drop,
            PolicyArg::Fail => UnresolvedMembers::Fail,
        }
    }
}

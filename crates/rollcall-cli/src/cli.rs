//! Command-line interface definitions and parsing

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rollcall", author, version, about = "Proximity attendance over short-range radio", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory for the store and identity cache
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Disable the radio; broadcast and discovery degrade to the store
    /// fallback
    #[arg(long)]
    pub no_radio: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Teacher: open an attendance session and keep it broadcasting
    StartSession {
        /// Class the session belongs to
        class_id: String,
    },
    /// Teacher: stop broadcasting and clear the fallback pointer
    StopSession {
        /// Session code returned by start-session
        code: String,
    },
    /// Student: discover a live session and print its code
    Scan,
    /// Student: discover a live session and submit attendance as the
    /// cached student
    Attend,
    /// Query the store directly for any live session
    FindLive,
    /// Teacher: follow the attendance count for a running session
    Watch {
        /// Session identifier returned by start-session
        session_id: String,
    },
    /// Delete sessions and pointers past expiry
    Sweep,
    /// Manage classes
    #[command(subcommand)]
    Class(ClassCommands),
    /// Cache role identity on this device
    #[command(subcommand)]
    Login(LoginCommands),
    /// Forget all cached identity
    Logout,
}

#[derive(Subcommand)]
pub enum ClassCommands {
    /// Create a class owned by the cached teacher
    Add {
        name: String,
        subject: String,
        /// Weekly slot as day@time, repeatable (e.g. --slot Monday@10:00)
        #[arg(long = "slot", required = true)]
        slots: Vec<String>,
    },
    /// List the cached teacher's classes
    List,
    /// Deactivate a class (classes are never hard-deleted)
    Deactivate { class_id: String },
}

#[derive(Subcommand)]
pub enum LoginCommands {
    /// Cache a student identity
    Student {
        id: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        roll: String,
        #[arg(long, default_value = "")]
        batch: String,
    },
    /// Cache a teacher identity
    Teacher {
        id: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
    },
}

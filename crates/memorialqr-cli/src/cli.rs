use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "memorialqr", version, about = "Admin panel for the memorial QR service")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(long, global = true, help = "API base URL (overrides config and MEMORIALQR_API_URL)")]
    pub api_url: Option<String>,
    #[arg(short, long, global = true, help = "Log debug output to stderr")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session token
    Login {
        #[arg(long, env = "MEMORIALQR_EMAIL")]
        email: Option<String>,
    },
    /// Forget the stored session token
    Logout,
    /// Show whether a session is active
    Status,
    /// Ask the server whether the stored token is still valid
    Verify,
    /// Resolve a panel path through the session guard
    Open { path: String },
    /// Manage commemorated persons
    Persons {
        #[command(subcommand)]
        command: PersonCommands,
    },
    /// Manage company profiles
    Companies {
        #[command(subcommand)]
        command: CompanyCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum PersonCommands {
    /// List persons, optionally filtered by name or national ID
    List { query: Option<String> },
    /// Show a person by record ID
    Show { id: i64 },
    /// Show a person's public profile by national ID
    Get { tcno: String },
    Create {
        #[command(flatten)]
        fields: NewPersonArgs,
        /// Images or videos to upload after creating
        #[arg(long = "media")]
        media: Vec<PathBuf>,
    },
    Update {
        id: i64,
        #[command(flatten)]
        fields: PersonUpdateArgs,
        #[arg(long = "media")]
        media: Vec<PathBuf>,
    },
    Delete { id: i64 },
    /// List a person's images and videos
    Images { tcno: String },
    Upload {
        tcno: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    RemoveImage { tcno: String, image: String },
    /// Download the QR code as PNG
    Qr {
        tcno: String,
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
    },
    GenerateQr { tcno: String },
}

#[derive(Args, Debug)]
pub struct NewPersonArgs {
    #[arg(long)]
    pub tcno: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long, help = "YYYY-MM-DD")]
    pub birth_date: String,
    #[arg(long, help = "YYYY-MM-DD")]
    pub death_date: Option<String>,
    #[arg(long)]
    pub biography: Option<String>,
}

#[derive(Args, Debug)]
pub struct PersonUpdateArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub birth_date: Option<String>,
    #[arg(long)]
    pub death_date: Option<String>,
    #[arg(long)]
    pub biography: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum CompanyCommands {
    /// List companies, optionally filtered by name or code
    List { query: Option<String> },
    Show { id: i64 },
    /// Show a company's public profile by code
    Get { code: String },
    Create {
        #[command(flatten)]
        fields: NewCompanyArgs,
        #[arg(long = "media")]
        media: Vec<PathBuf>,
    },
    Update {
        id: i64,
        #[command(flatten)]
        fields: CompanyUpdateArgs,
        #[arg(long = "media")]
        media: Vec<PathBuf>,
    },
    Delete { id: i64 },
    Media { code: String },
    Upload {
        code: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    RemoveMedia { code: String, media: String },
    Qr {
        code: String,
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
    },
    GenerateQr { code: String },
    /// Print the map link for a company's location
    Location { code: String },
}

#[derive(Args, Debug)]
pub struct NewCompanyArgs {
    #[arg(long)]
    pub name: String,
    /// Generated by the server when omitted
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long, help = "Address or \"lat, lng\"")]
    pub location: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args, Debug)]
pub struct CompanyUpdateArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

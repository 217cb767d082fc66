//! `multicare`: command-line client for the Multicare hospital backend.
//!
//! The CLI is the embedding application for the session store: it persists
//! the token in a file, restores the session before every data command, and
//! tells the operator to log in again whenever the session is anonymous,
//! expired, or rejected by the backend.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use multicare::api::{
    self, AppointmentStatus, BedAllocation, DocumentUpload, NewAppointment, NewPatient, NewPrescription, Page,
};
use multicare::auth::{self, NewAccount};
use multicare::config::API_URL_VAR;
use multicare::{
    ApiError, ClientConfig, ConfigError, ErrorCode, FileTokenStore, Role, SessionError, SessionPhase, SessionStore,
    StorageError,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const LOGIN_HINT: &str = "run `multicare login --email <EMAIL> --password <PASSWORD>` to sign in";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("not logged in")]
    NotLoggedIn,
    #[error("failed to read {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::Session(e) => e.user_message(),
            other => other.to_string(),
        }
    }

    fn needs_login(&self) -> bool {
        match self {
            Self::NotLoggedIn => true,
            Self::Api(e) => e.is_unauthorized(),
            Self::Session(e) => matches!(e, SessionError::TokenExpired | SessionError::InvalidToken(_)),
            _ => false,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "multicare", about = "Multicare hospital backend CLI")]
struct Cli {
    /// Backend base URL.
    #[arg(long, env = API_URL_VAR)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange credentials for a token and store it.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "MULTICARE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in with it.
    Signup {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "MULTICARE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, value_enum, default_value_t = RoleArg::Nurse)]
        role: RoleArg,
    },
    /// Forget the stored token.
    Logout,
    /// Show the signed-in user.
    Whoami,
    Patients(PatientsCommand),
    /// High-priority patient alerts.
    Alerts,
    Beds(BedsCommand),
    Appointments(AppointmentsCommand),
    Prescriptions(PrescriptionsCommand),
    Documents(DocumentsCommand),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    Doctor,
    Nurse,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Doctor => Self::Doctor,
            RoleArg::Nurse => Self::Nurse,
            RoleArg::Admin => Self::Admin,
        }
    }
}

#[derive(Args, Debug, Clone, Copy)]
struct PageArgs {
    #[arg(long, default_value_t = 0)]
    skip: u32,
    #[arg(long, default_value_t = api::DEFAULT_PAGE_LIMIT)]
    limit: u32,
}

impl From<PageArgs> for Page {
    fn from(args: PageArgs) -> Self {
        Page::new(args.skip, args.limit)
    }
}

#[derive(Args, Debug)]
struct PatientsCommand {
    #[command(subcommand)]
    command: PatientsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PatientsSubcommand {
    List(PageArgs),
    Show {
        patient_id: i64,
    },
    Register {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        date_of_birth: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        contact_number: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        complaint: Option<String>,
    },
    Triage {
        patient_id: i64,
        level: String,
    },
}

#[derive(Args, Debug)]
struct BedsCommand {
    #[command(subcommand)]
    command: BedsSubcommand,
}

#[derive(Subcommand, Debug)]
enum BedsSubcommand {
    List(PageArgs),
    Assign {
        bed_id: i64,
        #[arg(long = "patient")]
        patient_id: i64,
    },
    Release {
        bed_id: i64,
    },
}

#[derive(Args, Debug)]
struct AppointmentsCommand {
    #[command(subcommand)]
    command: AppointmentsSubcommand,
}

#[derive(Subcommand, Debug)]
enum AppointmentsSubcommand {
    List(PageArgs),
    Request {
        #[arg(long = "patient")]
        patient_id: i64,
        /// ISO-8601 date-time, e.g. 2024-05-01T10:00:00.
        #[arg(long)]
        date: String,
        #[arg(long)]
        reason: Option<String>,
    },
    Status {
        appointment_id: i64,
        status: AppointmentStatus,
    },
}

#[derive(Args, Debug)]
struct PrescriptionsCommand {
    #[command(subcommand)]
    command: PrescriptionsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PrescriptionsSubcommand {
    List {
        patient_id: i64,
    },
    Create {
        #[arg(long = "patient")]
        patient_id: i64,
        #[arg(long)]
        medication: String,
        #[arg(long)]
        dosage: Option<String>,
        #[arg(long)]
        instructions: Option<String>,
    },
}

#[derive(Args, Debug)]
struct DocumentsCommand {
    #[command(subcommand)]
    command: DocumentsSubcommand,
}

#[derive(Subcommand, Debug)]
enum DocumentsSubcommand {
    List {
        patient_id: i64,
    },
    Upload {
        #[arg(long = "patient")]
        patient_id: i64,
        #[arg(long)]
        document_type: String,
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("warning: failed to load .env: {e}");
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("error: {}", e.user_message());
            if e.needs_login() {
                eprintln!("hint: {LOGIN_HINT}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = ClientConfig::new(cli.api_url.as_deref().unwrap_or_default())?.apply_env()?;
    let storage = match &config.token_file {
        Some(path) => FileTokenStore::new(path),
        None => FileTokenStore::at_default_location()?,
    };
    tracing::debug!(token_file = %storage.path().display(), "using token file");
    let store = SessionStore::connect(&config, Arc::new(storage))?;

    match cli.command {
        Command::Login { email, password } => {
            let user = auth::sign_in(&store, &email, &password).await?;
            print_json(&user)
        }
        Command::Signup { full_name, email, password, role } => {
            let account = NewAccount { full_name, email, password, role: role.into() };
            let user = auth::sign_up(&store, &account).await?;
            print_json(&user)
        }
        Command::Logout => {
            store.logout()?;
            println!("logged out");
            Ok(())
        }
        Command::Whoami => {
            restore(&store).await?;
            match store.user() {
                Some(user) => print_json(&user),
                None => Err(CliError::NotLoggedIn),
            }
        }
        Command::Patients(cmd) => run_patients(&store, cmd.command).await,
        Command::Alerts => {
            restore(&store).await?;
            guarded(&store, api::patients::high_priority_alerts(store.gateway()).await)
        }
        Command::Beds(cmd) => run_beds(&store, cmd.command).await,
        Command::Appointments(cmd) => run_appointments(&store, cmd.command).await,
        Command::Prescriptions(cmd) => run_prescriptions(&store, cmd.command).await,
        Command::Documents(cmd) => run_documents(&store, cmd.command).await,
    }
}

/// Rebuild the session from the token file; anything but an authenticated
/// session is a reason to log in again.
async fn restore(store: &SessionStore) -> Result<(), CliError> {
    match store.initialize().await? {
        SessionPhase::Authenticated => Ok(()),
        _ => Err(CliError::NotLoggedIn),
    }
}

/// Print a data call's result, dropping the stored session if the backend rejected its token.
fn guarded<T: Serialize>(store: &SessionStore, result: Result<T, ApiError>) -> Result<(), CliError> {
    match result {
        Ok(value) => print_json(&value),
        Err(e) => {
            if store.invalidate_if_unauthorized(&e)? {
                tracing::warn!(code = e.error_code(), "stored session rejected; token removed");
            }
            Err(e.into())
        }
    }
}

async fn run_patients(store: &SessionStore, command: PatientsSubcommand) -> Result<(), CliError> {
    restore(store).await?;
    let gateway = store.gateway();
    match command {
        PatientsSubcommand::List(page) => guarded(store, api::patients::list(gateway, page.into()).await),
        PatientsSubcommand::Show { patient_id } => guarded(store, api::patients::get(gateway, patient_id).await),
        PatientsSubcommand::Register { full_name, date_of_birth, gender, contact_number, address, complaint } => {
            let patient = NewPatient {
                full_name,
                date_of_birth,
                gender,
                contact_number,
                address,
                presenting_complaint: complaint,
            };
            guarded(store, api::patients::register(gateway, &patient).await)
        }
        PatientsSubcommand::Triage { patient_id, level } => {
            guarded(store, api::patients::set_triage(gateway, patient_id, &level).await)
        }
    }
}

async fn run_beds(store: &SessionStore, command: BedsSubcommand) -> Result<(), CliError> {
    restore(store).await?;
    let gateway = store.gateway();
    match command {
        BedsSubcommand::List(page) => guarded(store, api::beds::list(gateway, page.into()).await),
        BedsSubcommand::Assign { bed_id, patient_id } => {
            guarded(store, api::beds::update(gateway, bed_id, BedAllocation::assign(patient_id)).await)
        }
        BedsSubcommand::Release { bed_id } => {
            guarded(store, api::beds::update(gateway, bed_id, BedAllocation::release()).await)
        }
    }
}

async fn run_appointments(store: &SessionStore, command: AppointmentsSubcommand) -> Result<(), CliError> {
    restore(store).await?;
    let gateway = store.gateway();
    match command {
        AppointmentsSubcommand::List(page) => guarded(store, api::appointments::list(gateway, page.into()).await),
        AppointmentsSubcommand::Request { patient_id, date, reason } => {
            let appointment = NewAppointment { patient_id, appointment_date: date, reason };
            guarded(store, api::appointments::request(gateway, &appointment).await)
        }
        AppointmentsSubcommand::Status { appointment_id, status } => {
            guarded(store, api::appointments::set_status(gateway, appointment_id, status).await)
        }
    }
}

async fn run_prescriptions(store: &SessionStore, command: PrescriptionsSubcommand) -> Result<(), CliError> {
    restore(store).await?;
    let gateway = store.gateway();
    match command {
        PrescriptionsSubcommand::List { patient_id } => {
            guarded(store, api::prescriptions::for_patient(gateway, patient_id).await)
        }
        PrescriptionsSubcommand::Create { patient_id, medication, dosage, instructions } => {
            let prescription = NewPrescription { patient_id, medication, dosage, instructions };
            guarded(store, api::prescriptions::create(gateway, &prescription).await)
        }
    }
}

async fn run_documents(store: &SessionStore, command: DocumentsSubcommand) -> Result<(), CliError> {
    restore(store).await?;
    let gateway = store.gateway();
    match command {
        DocumentsSubcommand::List { patient_id } => guarded(store, api::documents::for_patient(gateway, patient_id).await),
        DocumentsSubcommand::Upload { patient_id, document_type, file } => {
            let bytes = tokio::fs::read(&file)
                .await
                .map_err(|source| CliError::ReadFile { path: file.clone(), source })?;
            let upload = DocumentUpload {
                patient_id,
                document_type,
                file_name: file_name_of(&file),
                content_type: guess_content_type(&file).map(ToOwned::to_owned),
                bytes,
            };
            guarded(store, api::documents::upload(gateway, upload).await)
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| "upload".to_owned(), |name| name.to_string_lossy().into_owned())
}

fn guess_content_type(path: &Path) -> Option<&'static str> {
    mime_guess::from_path(path).first_raw()
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

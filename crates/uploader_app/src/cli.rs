use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use uploader_core::{AppState, Msg};
use uploader_engine::{select_directory, select_file, EngineHandle};
use uploader_logging::{uploader_info, LogDestination, DEFAULT_LOG_FILE};

use crate::config::{AppConfig, Overrides};
use crate::help::render_guide;
use crate::session::Session;

#[derive(Parser)]
#[command(
    name = "folder-uploader",
    version,
    about = "Upload a folder to a collection and follow the server's progress",
    after_help = "The RON config file may set base_url, collection_id, bearer_token, api_token, connect_timeout_secs and max_file_bytes. Flags override values from the file."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload every file under a directory in one request
    Upload(UploadArgs),
    /// Check one file's size, type and signature
    Validate(ValidateArgs),
    /// Describe the progress stages the server streams back
    Stages(StagesArgs),
}

#[derive(Parser)]
struct UploadArgs {
    /// Directory to upload
    #[arg(long, value_name = "PATH")]
    dir: PathBuf,

    /// RON config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the config file)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Target collection id
    #[arg(long, value_name = "ID")]
    collection: Option<String>,

    /// Bearer token sent in the Authorization header
    #[arg(long, value_name = "JWT")]
    token: Option<String>,

    /// Token sent in the X-API-Token header
    #[arg(long, value_name = "TOKEN")]
    api_token: Option<String>,

    /// Where log output goes
    #[arg(long, value_enum, ignore_case = true, default_value_t = LogDestination::Terminal)]
    log: LogDestination,
}

impl UploadArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            collection_id: self.collection.clone(),
            bearer_token: self.token.clone(),
            api_token: self.api_token.clone(),
        }
    }
}

#[derive(Parser)]
struct ValidateArgs {
    /// File to check
    #[arg(long, value_name = "PATH")]
    file: PathBuf,

    /// Declared MIME type, when the caller knows one
    #[arg(long, value_name = "TYPE")]
    mime: Option<String>,

    /// RON config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct StagesArgs {
    /// Show only this stage
    stage: Option<String>,
}

pub fn run() -> Result<ExitCode> {
    run_with_args(std::env::args_os())
}

/// Help and version requests print and succeed; other usage errors print and
/// exit with status 2.
pub fn run_with_args<I, T>(args: I) -> Result<ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            err.print()?;
            return Ok(if err.use_stderr() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            });
        }
    };
    execute(cli)
}

fn execute(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Upload(args) => {
            uploader_logging::initialize(args.log, LevelFilter::Info, Path::new(DEFAULT_LOG_FILE));
            let mut app_config = AppConfig::load_or_default(args.config.as_deref())?;
            app_config.apply(args.overrides());
            let upload = app_config
                .upload_settings()
                .context("checking upload configuration")?;

            let dir = args.dir;
            let files = select_directory(&dir)
                .with_context(|| format!("reading directory: {}", dir.display()))?;
            uploader_info!("Selected {} files under {}", files.len(), dir.display());

            let engine = EngineHandle::new(upload, app_config.validation_settings())
                .context("starting upload engine")?;
            let mut session = Session::new(AppState::new(), engine);
            let file_count = files.len();
            session.runner_mut().select_directory(files);
            let ok = session.drive(Msg::UploadSubmitted { file_count }, print_lines);
            Ok(exit_code(ok))
        }

        Commands::Validate(ValidateArgs { file, mime, config }) => {
            uploader_logging::initialize(
                LogDestination::Terminal,
                LevelFilter::Warn,
                Path::new(DEFAULT_LOG_FILE),
            );
            let app_config = AppConfig::load_or_default(config.as_deref())?;
            let chosen = select_file(&file, mime)
                .with_context(|| format!("reading file: {}", file.display()))?;

            // Validation never touches the network, so upload settings stay at their defaults.
            let engine = EngineHandle::new(Default::default(), app_config.validation_settings())
                .context("starting validation engine")?;
            let mut session = Session::new(AppState::new(), engine);
            let name = chosen.name.clone();
            session.runner_mut().choose_file(chosen);
            let ok = session.drive(Msg::FileChosen { name }, print_lines);
            Ok(exit_code(ok))
        }

        Commands::Stages(StagesArgs { stage }) => {
            println!("{}", render_guide(stage.as_deref())?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

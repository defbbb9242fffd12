//! D-Youth CLI - access gate checks from the terminal.
//!
//! # Configuration
//!
//! Configuration is loaded from multiple sources with priority:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`DYOUTH_*`)
//! 3. Project config (`.dyouth/config.toml` in the project root)
//! 4. Global config (`~/.dyouth/config.toml`, or `--config`)
//! 5. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `DYOUTH_DEBUG`: Enable debug logging (`true`/`false`)
//! - `DYOUTH_BACKEND_URL`: Hosted service base URL
//! - `DYOUTH_BACKEND_ANON_KEY`: Public anon key
//! - `DYOUTH_SESSION_CACHE_TTL_MS`: Session cache lifetime
//! - `DYOUTH_STRICT_PROFILE`: Require cohort year and province
//! - `DYOUTH_SESSION_TOKEN`: Session token for `resolve`
//!
//! # Commands
//!
//! | Command | Needs backend | Output |
//! |---------|---------------|--------|
//! | `routes` | no | route table |
//! | `classify PATH` | no | route class |
//! | `check PATH --state S` | no | verdict for a hypothetical viewer |
//! | `resolve PATH` | yes (fails open without) | navigation outcome |
//! | `sign-in` | yes | OAuth authorize URL |
//! | `config` | no | merged configuration (secrets redacted) |

mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dyouth_auth::{AccessGate, AccessPolicy, ProfileStatus, Viewer};
use dyouth_runtime::backend;
use dyouth_runtime::config::{ConfigLoader, ConfigResolver, DyouthConfig};
use dyouth_runtime::session::{OAuthProvider, SessionContext, SessionToken};
use dyouth_runtime::Navigator;
use dyouth_types::{ProfileRecord, UserId};
use output::Format;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// D-Youth CLI - route access gate
#[derive(Parser, Debug)]
#[command(name = "dyouth")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Project root directory (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    project: Option<PathBuf>,

    /// Global config file (defaults to ~/.dyouth/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the backend base URL (also: DYOUTH_BACKEND_URL)
    #[arg(long, global = true, value_name = "URL")]
    backend_url: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the route table in match order
    Routes,

    /// Show the class of a path
    Classify {
        /// Request path, query string allowed
        path: String,
    },

    /// Decide a path for a hypothetical viewer
    Check {
        /// Request path
        path: String,

        /// Viewer state to decide for
        #[arg(long, value_enum, default_value = "anonymous")]
        state: StateArg,
    },

    /// Resolve the session against the backend and navigate to a path
    Resolve {
        /// Request path
        path: String,

        /// Session token (also: DYOUTH_SESSION_TOKEN)
        #[arg(long, env = "DYOUTH_SESSION_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Print the OAuth sign-in URL
    SignIn {
        /// Where the provider sends the browser back to
        #[arg(long, default_value = "http://localhost:3000/auth/callback")]
        redirect_to: String,
    },

    /// Print the merged configuration
    Config,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StateArg {
    Anonymous,
    Incomplete,
    Complete,
    Unknown,
}

impl StateArg {
    fn viewer(self) -> Result<Viewer> {
        let user_id = || UserId::new("cli-viewer").context("viewer id");
        Ok(match self {
            Self::Anonymous => Viewer::Anonymous,
            Self::Incomplete => Viewer::authenticated(
                user_id()?,
                ProfileStatus::Present(ProfileRecord::empty(user_id()?)),
            ),
            Self::Complete => Viewer::authenticated(
                user_id()?,
                ProfileStatus::Present(ProfileRecord::empty(user_id()?).with_display_name("CLI")),
            ),
            Self::Unknown => Viewer::Unknown,
        })
    }
}

/// CLI-based configuration resolver.
///
/// Loads file/env config via [`ConfigLoader`] and applies CLI argument
/// overrides as the highest-priority layer.
struct CliConfigResolver {
    project_root: PathBuf,
    global_config: Option<PathBuf>,
    debug: bool,
    backend_url: Option<String>,
}

impl CliConfigResolver {
    fn from_args(args: &Args) -> Self {
        let project_root = args.project.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|e| {
                eprintln!("warning: cannot read current directory ({e}), using '.'");
                PathBuf::from(".")
            })
        });

        Self {
            project_root,
            global_config: args.config.clone(),
            debug: args.debug,
            backend_url: args.backend_url.clone(),
        }
    }

    fn load(&self) -> Result<DyouthConfig> {
        let mut loader = ConfigLoader::new().with_project_root(&self.project_root);
        if let Some(ref path) = self.global_config {
            loader = loader.with_global_config(path);
        }

        let mut config = loader.load().context("Config error")?;
        self.apply(&mut config);
        Ok(config)
    }
}

impl ConfigResolver for CliConfigResolver {
    fn apply(&self, config: &mut DyouthConfig) {
        if self.debug {
            config.debug = true;
        }
        if let Some(ref url) = self.backend_url {
            config.backend.url = Some(url.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let resolver = CliConfigResolver::from_args(&args);
    let config = resolver.load()?;

    // Terminal filter: --debug / DYOUTH_DEBUG > RUST_LOG > "warn".
    // HTTP and TLS crates stay at warn even in debug mode.
    let filter = if config.debug {
        EnvFilter::new("debug,hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();

    info!(path = %resolver.project_root.display(), "Project root");

    let format = if args.json { Format::Json } else { Format::Text };
    let gate = config.gate.build_gate().context("Invalid gate configuration")?;

    match args.command {
        Command::Routes => output::routes(format, gate.table())?,
        Command::Classify { path } => {
            let class = gate.classify(&path);
            output::classify(format, &path, class)?;
        }
        Command::Check { path, state } => {
            let verdict = gate.evaluate(&path, &state.viewer()?);
            output::verdict(format, &path, &verdict)?;
        }
        Command::Resolve { path, token } => resolve(format, &config, gate, &path, token).await?,
        Command::SignIn { redirect_to } => {
            let session = session(&config, None)?;
            let url = session
                .sign_in(OAuthProvider::Google, &redirect_to)
                .await
                .context("Sign-in unavailable")?;
            output::line(format, "url", &url)?;
        }
        Command::Config => output::config(format, &config)?,
    }

    Ok(())
}

fn session(config: &DyouthConfig, token: Option<SessionToken>) -> Result<SessionContext> {
    let resolver = backend::session_resolver(&config.backend, token.clone())
        .context("Backend configuration error")?;
    let ttl = config.session.cache_ttl();
    Ok(match token {
        Some(token) => SessionContext::with_token(resolver, ttl, token),
        None => SessionContext::new(resolver, ttl),
    })
}

async fn resolve(
    format: Format,
    config: &DyouthConfig,
    gate: AccessGate,
    path: &str,
    token: Option<String>,
) -> Result<()> {
    let token = token.and_then(SessionToken::new);
    debug!(has_token = token.is_some(), "resolving session");

    let session = Arc::new(session(config, token)?);
    let navigator = Navigator::new(Arc::new(gate), session);
    let outcome = navigator.navigate(path).await;

    output::navigation(format, &outcome, navigator.banner().as_ref())
}

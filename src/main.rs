use std::{path::PathBuf, time::Duration};

use clap::Parser;
use console::{
    config::{ConfigError, ConsoleConfig},
    logging::{init_logging, LoggingConfig},
    middleware::DEFAULT_UPLOAD_PREFIX,
};
use console_auth::DEFAULT_SIGN_IN_PATH;

#[derive(Parser, Debug)]
#[command(name = "admin-console", about = "Admin console edge server", version)]
struct CliArgs {
    #[arg(long, default_value = "0.0.0.0", env = "CONSOLE_HOST")]
    host: String,

    #[arg(long, default_value_t = 3000, env = "CONSOLE_PORT")]
    port: u16,

    /// Path prefix of the upload-proxy namespace
    #[arg(long, default_value = DEFAULT_UPLOAD_PREFIX, env = "CONSOLE_UPLOAD_PREFIX")]
    upload_prefix: String,

    /// Upload backend base URL; requests under the upload prefix are forwarded here
    #[arg(long, env = "CONSOLE_UPLOAD_BACKEND_URL")]
    upload_backend_url: Option<String>,

    #[arg(long, default_value_t = 30, env = "CONSOLE_UPLOAD_TIMEOUT_SECS")]
    upload_timeout_secs: u64,

    #[arg(long, default_value = DEFAULT_SIGN_IN_PATH, env = "CONSOLE_SIGN_IN_PATH")]
    sign_in_path: String,

    /// Auth provider origin serving /api/auth/session
    #[arg(long, env = "CONSOLE_AUTH_URL")]
    auth_url: Option<String>,

    #[arg(long, default_value_t = 5, env = "CONSOLE_SESSION_TIMEOUT_SECS")]
    session_timeout_secs: u64,

    /// Sign every request in as a fixed development user (ignored with --auth-url)
    #[arg(long, env = "CONSOLE_DEV_SESSION")]
    dev_session: bool,

    #[arg(long, default_value = "info", env = "CONSOLE_LOG_LEVEL")]
    log_level: String,

    #[arg(long, env = "CONSOLE_LOG_JSON")]
    log_json: bool,

    /// Directory for daily-rotated log files
    #[arg(long, env = "CONSOLE_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

impl CliArgs {
    fn into_config(self) -> Result<ConsoleConfig, ConfigError> {
        let config = ConsoleConfig {
            host: self.host,
            port: self.port,
            upload_prefix: self.upload_prefix,
            upload_backend_url: self.upload_backend_url,
            upload_timeout: Duration::from_secs(self.upload_timeout_secs),
            sign_in_path: self.sign_in_path,
            auth_url: self.auth_url,
            session_timeout: Duration::from_secs(self.session_timeout_secs),
            dev_session: self.dev_session,
            log: LoggingConfig {
                level: self.log_level,
                json_format: self.log_json,
                log_dir: self.log_dir,
                ..Default::default()
            },
        };
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliArgs::parse().into_config()?;
    let _log_guard = init_logging(&config.log)?;

    console::startup(config).await
}

use monitor_assist::cli::{parse_args, run_cli_command, USAGE};
use monitor_assist::config::ClientConfig;
use monitor_assist::logging::{self, LogConfig};

use color_eyre::Result;
use tracing::debug;

fn main() -> Result<()> {
    color_eyre::install()?;

    let command = match parse_args(std::env::args()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    logging::init(LogConfig::from_env());

    let config = ClientConfig::from_env();
    debug!(
        "api={} ai={} ws={} token={}",
        config.api_base_url,
        config.ai_api_base_url,
        config.ws_base_url,
        config.auth_token.is_some()
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_cli_command(command, &config))
}

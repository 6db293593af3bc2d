use clap::Parser;

use linkshepherd::cli::Cli;
use linkshepherd::config::{get_config, init_config_from};
use linkshepherd::runtime::modes::{self, Mode};
use linkshepherd::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config_from(&cli.config);

    match modes::detect_mode(cli.command.as_ref()) {
        Mode::Server => {
            let _guard = init_logging(&get_config().logging)?;
            modes::run_server().await
        }
        Mode::Cli => {
            let Some(command) = cli.command else {
                return Ok(());
            };
            if let Err(e) = modes::run_cli(command).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

//! Add link command

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::{AppServices, CreateLinkRequest};
use crate::storage::RedirectMode;

/// 运维创建的链接没有 owner，只有管理员可见
pub async fn add_link(
    services: &AppServices,
    url: String,
    code: Option<String>,
    mode: Option<RedirectMode>,
    title: Option<String>,
) -> Result<(), CliError> {
    let result = services
        .links
        .create(
            None,
            CreateLinkRequest {
                destination: url,
                title,
                code,
                mode,
            },
        )
        .await?;

    if result.generated_code {
        println!(
            "{} Generated random code: {}",
            "ℹ".bold().blue(),
            result.link.code.magenta()
        );
    }

    println!(
        "{} Added short link: {} -> {} ({})",
        "✓".bold().green(),
        result.link.code.cyan(),
        result.link.destination.blue().underline(),
        result.link.mode.to_string().yellow()
    );
    Ok(())
}

//! 创建管理员 CLI 命令

use std::io::{self, BufRead, IsTerminal, Write};

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::AppServices;

/// 从不同来源获取密码
pub fn read_password(password: Option<String>, stdin: bool) -> Result<String, String> {
    if stdin {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        Ok(line.trim().to_string())
    } else if let Some(pwd) = password {
        Ok(pwd)
    } else {
        prompt_password_with_confirm()
    }
}

/// 交互式输入密码（带确认）
fn prompt_password_with_confirm() -> Result<String, String> {
    if !io::stdin().is_terminal() {
        return Err(
            "No password provided. Use --password or --stdin flag, or run interactively."
                .to_string(),
        );
    }

    print!("Enter password: ");
    io::stdout().flush().map_err(|e| e.to_string())?;
    let password =
        rpassword::read_password().map_err(|e| format!("Failed to read password: {}", e))?;

    print!("Confirm password: ");
    io::stdout().flush().map_err(|e| e.to_string())?;
    let confirm =
        rpassword::read_password().map_err(|e| format!("Failed to read password: {}", e))?;

    if password != confirm {
        return Err("Passwords do not match".to_string());
    }
    Ok(password)
}

pub async fn create_admin(
    services: &AppServices,
    email: String,
    password: String,
    full_name: Option<String>,
) -> Result<(), CliError> {
    let (account, created) = services
        .accounts
        .ensure_admin(&email, &password, full_name)
        .await?;

    if created {
        println!(
            "{} Created administrator {} ({})",
            "✓".bold().green(),
            account.email.cyan(),
            account.id.dimmed()
        );
    } else {
        println!(
            "{} Promoted existing account {} to administrator",
            "✓".bold().green(),
            account.email.cyan()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_password_from_flag() {
        assert_eq!(
            read_password(Some("hunter22".to_string()), false).unwrap(),
            "hunter22"
        );
    }
}

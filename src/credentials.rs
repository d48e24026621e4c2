use std::io::IsTerminal;

use inquire::Password;

use crate::error::PreflightError;
use crate::model::Credentials;

/// Environment variable consulted when no password argument is given.
pub const PASSWORD_ENV: &str = "PROXMOX_PASSWORD";

/// Pick the password: argument, then environment, then `prompt`.
///
/// Empty values count as absent at every stage.
pub fn resolve_password<F>(
    arg: Option<String>,
    env: Option<String>,
    prompt: F,
) -> Result<String, PreflightError>
where
    F: FnOnce() -> Result<Option<String>, PreflightError>,
{
    if let Some(password) = arg.filter(|p| !p.is_empty()) {
        tracing::debug!("password taken from command line");
        return Ok(password);
    }
    if let Some(password) = env.filter(|p| !p.is_empty()) {
        tracing::debug!("password taken from {PASSWORD_ENV}");
        return Ok(password);
    }
    prompt()?
        .filter(|p| !p.is_empty())
        .ok_or(PreflightError::MissingPassword)
}

/// Interactive masked prompt. Returns `None` when stdin is not a terminal.
pub fn prompt_password() -> Result<Option<String>, PreflightError> {
    if !std::io::stdin().is_terminal() {
        return Ok(None);
    }
    Password::new("Enter Proxmox password:")
        .without_confirmation()
        .prompt()
        .map(Some)
        .map_err(map_inquire_err)
}

pub fn credentials(user: &str, arg: Option<String>) -> Result<Credentials, PreflightError> {
    let env = std::env::var(PASSWORD_ENV).ok();
    let password = resolve_password(arg, env, prompt_password)?;
    Ok(Credentials {
        user: user.to_string(),
        password,
    })
}

fn map_inquire_err(e: inquire::InquireError) -> PreflightError {
    match e {
        inquire::InquireError::OperationCanceled | inquire::InquireError::OperationInterrupted => {
            PreflightError::PromptCancelled
        }
        inquire::InquireError::NotTTY => PreflightError::MissingPassword,
        other => PreflightError::Validation {
            message: format!("prompt error: {other}"),
        },
    }
}

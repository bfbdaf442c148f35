//! `taskflow auth` subcommands.

use std::io::{self, Write};

use anyhow::{anyhow, Result};
use taskflow_auth::{
    codes, AuthError, AuthSession, SessionStore, SignInOutcome, UserPoolClient, UserPoolConfig,
};
use taskflow_core::AppConfig;

use crate::cli::AuthAction;
use crate::output;

pub async fn handle(action: AuthAction) -> Result<()> {
    match action {
        AuthAction::SignUp { email, password } => sign_up(&email, password).await,
        AuthAction::Verify { email, code } => verify(&email, &code).await,
        AuthAction::Resend { email } => resend(&email).await,
        AuthAction::SignIn { email, password } => sign_in(&email, password).await,
        AuthAction::NewPassword {
            email,
            password,
            session,
        } => new_password(&email, password, &session).await,
        AuthAction::SignOut => sign_out().await,
        AuthAction::Whoami => whoami().await,
    }
}

/// Credential client plus session cache for the configured user pool.
fn clients() -> Result<(UserPoolClient, SessionStore)> {
    let config = AppConfig::load()?;
    let pool = UserPoolConfig::from_app_config(&config).map_err(friendly)?;
    let store = SessionStore::open_default().map_err(friendly)?;
    Ok((UserPoolClient::new(pool), store))
}

/// Swap the service error for its user-facing wording. The raw error still
/// reaches the log for `--verbose` runs.
fn friendly(err: AuthError) -> anyhow::Error {
    tracing::debug!(error = %err, "auth request failed");
    anyhow!(err.friendly_message())
}

fn resolve_password(password: Option<String>, prompt: &str) -> Result<String> {
    let password = match password {
        Some(p) => p,
        None if output::is_json() => {
            return Err(anyhow!("pass --password explicitly when using --output json"));
        }
        None => prompt_masked(prompt)?,
    };
    if password.is_empty() {
        return Err(anyhow!("A password is required"));
    }
    Ok(password)
}

/// Prompt on the controlling terminal with `*` echo. Ctrl+C cancels and
/// returns an empty string.
fn prompt_masked(prompt: &str) -> Result<String> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyModifiers},
        terminal,
    };

    print!("{prompt}: ");
    io::stdout().flush()?;

    let mut value = String::new();

    terminal::enable_raw_mode()?;

    loop {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(k) = event::read()? {
                match k.code {
                    KeyCode::Enter => break,
                    KeyCode::Backspace => {
                        if !value.is_empty() {
                            value.pop();
                            print!("\x08 \x08");
                            io::stdout().flush()?;
                        }
                    }
                    KeyCode::Char(c) => {
                        if k.modifiers.contains(KeyModifiers::CONTROL) && c == 'c' {
                            terminal::disable_raw_mode()?;
                            println!();
                            return Ok(String::new());
                        }
                        value.push(c);
                        print!("*");
                        io::stdout().flush()?;
                    }
                    _ => {}
                }
            }
        }
    }

    terminal::disable_raw_mode()?;
    println!();

    Ok(value)
}

async fn sign_up(email: &str, password: Option<String>) -> Result<()> {
    let (client, _) = clients()?;
    let password = resolve_password(password, "Choose a password")?;

    let outcome = client.sign_up(email, &password).await.map_err(friendly)?;

    if output::is_json() {
        output::data(
            "signup",
            &serde_json::json!({
                "userSub": outcome.user_sub,
                "confirmed": outcome.confirmed,
            }),
        );
        return Ok(());
    }

    if outcome.confirmed {
        output::success("Account created and already confirmed");
        output::dim("Sign in with: taskflow auth sign-in --email <EMAIL>");
    } else {
        output::success(&format!("Account created for {email}"));
        output::dim("Check your email for a verification code, then run:");
        output::dim(&format!("  taskflow auth verify --email {email} --code <CODE>"));
    }
    Ok(())
}

async fn verify(email: &str, code: &str) -> Result<()> {
    let (client, store) = clients()?;

    match client.confirm_sign_up(email, code).await {
        Ok(()) => {}
        Err(err) if err.is_code(codes::EXPIRED_CODE) => {
            client
                .resend_confirmation_code(email)
                .await
                .map_err(friendly)?;
            return Err(anyhow!("That code has expired. We emailed you a new one"));
        }
        Err(err) => return Err(friendly(err)),
    }

    output::success("Email verified");

    if output::is_json() {
        return Ok(());
    }

    // Finish with a sign-in so the session lands in the cache.
    let password = prompt_masked("Password (leave empty to skip sign-in)")?;
    if password.is_empty() {
        output::dim("Run `taskflow auth sign-in` when you are ready.");
        return Ok(());
    }
    complete_sign_in(&client, &store, email, &password).await
}

async fn resend(email: &str) -> Result<()> {
    let (client, _) = clients()?;
    client
        .resend_confirmation_code(email)
        .await
        .map_err(friendly)?;
    output::success("Verification code sent. Check your email.");
    Ok(())
}

async fn sign_in(email: &str, password: Option<String>) -> Result<()> {
    let (client, store) = clients()?;
    let password = resolve_password(password, "Password")?;
    complete_sign_in(&client, &store, email, &password).await
}

async fn complete_sign_in(
    client: &UserPoolClient,
    store: &SessionStore,
    email: &str,
    password: &str,
) -> Result<()> {
    match client.sign_in(email, password).await {
        Ok(SignInOutcome::Tokens(tokens)) => {
            let session = AuthSession::from_tokens(email, tokens);
            store.save(&session).map_err(friendly)?;
            if output::is_json() {
                output::data(
                    "session",
                    &serde_json::json!({
                        "username": session.username,
                        "expiresAt": session.expires_at,
                    }),
                );
            } else {
                output::success(&format!("Signed in as {email}"));
            }
            Ok(())
        }
        Ok(SignInOutcome::NewPasswordRequired { session }) => {
            output::warning("The service requires a new password before you can sign in");
            output::kv("session", &session);
            output::dim(&format!(
                "Run: taskflow auth new-password --email {email} --session <SESSION>"
            ));
            Ok(())
        }
        Err(err) if err.is_code(codes::USER_NOT_CONFIRMED) => {
            match client.resend_confirmation_code(email).await {
                Ok(()) => output::dim("We sent you a fresh verification code."),
                Err(resend_err) => {
                    tracing::debug!(error = %resend_err, "resend after unconfirmed sign-in failed");
                }
            }
            Err(anyhow!(
                "This account is not verified yet; run `taskflow auth verify --email {email} --code <CODE>`"
            ))
        }
        Err(err) => Err(friendly(err)),
    }
}

async fn new_password(email: &str, password: Option<String>, session: &str) -> Result<()> {
    let (client, store) = clients()?;
    let password = resolve_password(password, "New password")?;

    let tokens = client
        .respond_new_password(email, &password, session)
        .await
        .map_err(friendly)?;
    let auth_session = AuthSession::from_tokens(email, tokens);
    store.save(&auth_session).map_err(friendly)?;
    output::success(&format!("Password updated. Signed in as {email}"));
    Ok(())
}

async fn sign_out() -> Result<()> {
    let (client, store) = clients()?;
    store.sign_out(&client).await.map_err(friendly)?;
    output::success("Signed out");
    Ok(())
}

async fn whoami() -> Result<()> {
    let (client, store) = clients()?;
    let profile = store.current_user(&client).await.map_err(friendly)?;

    if output::is_json() {
        output::data(
            "user",
            &serde_json::json!({
                "username": profile.username,
                "email": profile.email,
            }),
        );
        return Ok(());
    }

    output::kv("user", &profile.username);
    if let Some(email) = &profile.email {
        output::kv("email", email);
    }
    Ok(())
}

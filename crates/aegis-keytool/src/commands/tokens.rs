/*!
 * Token commands
 */

use aegis_tokens::{wire, Issuer, Token};
use anyhow::{Context, Result};
use colored::*;

use super::{create_interpreter, create_store};
use crate::config::Config;

pub async fn issue(config: &Config, caller_id: &str, audience: Option<String>) -> Result<()> {
    let mut issuer = Issuer::new(create_store(config));
    if let Some(audience) = audience {
        issuer = issuer.with_audience(audience);
    }

    let cat = issuer
        .issue(caller_id)
        .await
        .with_context(|| format!("issue client access token for {caller_id}"))?;
    println!("{cat}");
    Ok(())
}

pub async fn decode(config: &Config, token: &str, verify: bool) -> Result<()> {
    println!("{}", "=== Token ===".bold().cyan());

    let kid = wire::extract_kid(token).context("read footer")?;
    println!("\n{} {}", "kid:".bold(), kid.as_deref().unwrap_or("-"));

    let claims = wire::unverified_claims(token).context("read claims")?;
    println!("{}", "claims (unverified):".bold());
    println!("{}", serde_json::to_string_pretty(&claims)?);

    if !verify {
        return Ok(());
    }

    let interpreter = create_interpreter(config, create_store(config))?;
    match interpreter.interpret(token).await {
        Ok(token) => print_verified(&token)?,
        Err(e) => {
            println!("\n{} {}", "✗".red().bold(), e.to_string().red());
            if e.is_infrastructure() {
                anyhow::bail!("key material unavailable: {e}");
            }
        }
    }
    Ok(())
}

fn print_verified(token: &Token) -> Result<()> {
    println!("\n{} {}", "✓".green().bold(), "Signature valid".green());
    println!("  {} {}", "kind:".bold(), token.kind());
    println!("  {} {}", "client:".bold(), token.client_id());
    println!("  {} {}", "audience:".bold(), token.audience());
    println!("  {} {}", "expires:".bold(), token.claims().expires_at);

    if let Token::User(uat) = token {
        println!("  {} {}", "scope:".bold(), uat.scope());
        if let Some(user) = uat.user() {
            println!("  {}", "user:".bold());
            println!("{}", serde_json::to_string_pretty(user)?);
        }
    }
    Ok(())
}

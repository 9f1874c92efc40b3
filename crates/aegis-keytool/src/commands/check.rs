/*!
 * Relationship check command
 */

use aegis_authz::{AuthzError, Checker};
use aegis_tokens::Issuer;
use anyhow::{Context, Result};
use colored::*;
use std::sync::Arc;

use super::{create_interpreter, create_store};
use crate::config::Config;

pub async fn check(
    config: &Config,
    token: &str,
    relation: &str,
    object_type: &str,
    object_id: &str,
) -> Result<()> {
    let store = create_store(config);
    let token = create_interpreter(config, store.clone())?
        .interpret(token)
        .await
        .context("interpret token")?;

    let checker = Checker::new(config.checker.clone(), Arc::new(Issuer::new(store)))?;
    match checker.check(&token, relation, object_type, object_id).await {
        Ok(true) => println!("{} {relation} on {object_type}:{object_id}", "✓ permitted".green().bold()),
        Ok(false) => println!("{} {relation} on {object_type}:{object_id}", "✗ denied".red().bold()),
        Err(AuthzError::CatRejected(reason)) => {
            anyhow::bail!("authorization service rejected the client access token: {reason}")
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

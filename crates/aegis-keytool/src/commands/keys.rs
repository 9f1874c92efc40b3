/*!
 * Seed commands
 */

use aegis_crypto::{derive_signing_key_pair, derive_symmetric_key, Seed};
use aegis_keys::derive_blocking;
use anyhow::{Context, Result};
use colored::*;

use super::create_store;
use crate::config::Config;

pub fn generate(count: usize) -> Result<()> {
    for _ in 0..count {
        let seed = Seed::generate().context("generate seed")?;
        println!("{}", hex::encode(seed.as_bytes()));
    }
    Ok(())
}

pub async fn inspect(config: &Config, id: &str) -> Result<()> {
    println!("{}", format!("=== Keys of {id} ===").bold().cyan());

    let store = create_store(config);
    let seeds = store
        .all_keys(id)
        .await
        .with_context(|| format!("load keys of {id}"))?;

    let ids = derive_blocking(seeds, |seed| {
        let pid = derive_signing_key_pair(seed)?.pid();
        let lid = derive_symmetric_key(seed)?.lid();
        Ok((pid, lid))
    })
    .await?;

    for (index, (pid, lid)) in ids.iter().enumerate() {
        let label = if index == 0 { "active" } else { "retained" };
        println!("\n{} {}", format!("[{index}]").bold(), label.dimmed());
        println!("  sign    {}", pid.green());
        println!("  encrypt {}", lid.green());
    }
    Ok(())
}

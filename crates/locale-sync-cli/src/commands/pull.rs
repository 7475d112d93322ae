use std::sync::Arc;

use anyhow::{Context, Result};
use locale_sync::{Diagnostics, Puller, TargetSpec};
use locale_sync_phrase::{PhraseClient, PhraseClientConfig};

use super::ConsoleReporter;

/// Pull every target in order, stopping at the first one that fails.
pub async fn run(targets: &[TargetSpec], host: Option<&str>, verbose: bool) -> Result<()> {
    let diagnostics = Arc::new(Diagnostics::stderr(verbose));
    let reporter = ConsoleReporter;
    let mut written = 0usize;

    for target in targets {
        // Each target may carry its own access token.
        let client = PhraseClient::new(PhraseClientConfig {
            access_token: target.access_token.clone(),
            host: host.map(str::to_owned),
        })
        .with_diagnostics(Arc::clone(&diagnostics));

        let report = Puller::new(&client, &client, &reporter, &diagnostics)
            .pull(target)
            .await
            .with_context(|| format!("pull failed for target '{}'", target.file_pattern))?;
        written += report.files.len();
    }

    println!("Pulled {written} files from {} targets.", targets.len());
    Ok(())
}

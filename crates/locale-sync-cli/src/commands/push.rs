use std::sync::Arc;

use anyhow::{Context, Result};
use locale_sync::{Diagnostics, Pusher, SourceSpec};
use locale_sync_phrase::{PhraseClient, PhraseClientConfig};

use super::ConsoleReporter;

/// Push every source in order, stopping at the first one that fails.
pub async fn run(sources: &[SourceSpec], host: Option<&str>, verbose: bool) -> Result<()> {
    let diagnostics = Arc::new(Diagnostics::stderr(verbose));
    let reporter = ConsoleReporter;
    let mut uploaded = 0usize;

    for source in sources {
        let client = PhraseClient::new(PhraseClientConfig {
            access_token: source.access_token.clone(),
            host: host.map(str::to_owned),
        })
        .with_diagnostics(Arc::clone(&diagnostics));

        let report = Pusher::new(&client, &client, &reporter, &diagnostics)
            .push(source)
            .await
            .with_context(|| format!("push failed for source '{}'", source.file_pattern))?;
        uploaded += report.files.len();
    }

    println!("Pushed {uploaded} files from {} sources.", sources.len());
    Ok(())
}

use std::path::Path;

use anyhow::{Context, Result};
use locale_sync::{LocaleId, Transfer, UploadOptions, UploadRequest};

/// What to upload besides the file itself.
#[derive(Debug, Default)]
pub struct UploadArgs {
    pub locale_id: Option<String>,
    pub file_format: Option<String>,
    pub tags: Vec<String>,
    pub update_translations: bool,
}

pub async fn run(
    transfer: &dyn Transfer,
    project_id: &str,
    file: &Path,
    args: UploadArgs,
) -> Result<()> {
    let request = build_request(file, args)?;
    let summary = transfer
        .upload(project_id, &request)
        .await
        .with_context(|| format!("upload failed for {}", file.display()))?;

    println!(
        "Uploaded {} (upload {}, state: {})",
        file.display(),
        summary.id,
        summary.state
    );
    Ok(())
}

fn build_request(file: &Path, args: UploadArgs) -> Result<UploadRequest> {
    let content =
        std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", file.display()))?;

    let tags = args.tags.join(",");
    Ok(UploadRequest {
        file_name,
        content,
        locale_id: args.locale_id.map(LocaleId::new),
        options: UploadOptions {
            file_format: args.file_format,
            tags: (!tags.is_empty()).then_some(tags),
            update_translations: args.update_translations.then_some(true),
            ..Default::default()
        },
    })
}

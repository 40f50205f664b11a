use std::path::Path;

use anyhow::{Context, anyhow};
use reqwest::multipart::{Form, Part};
use testhub_api_models::UploadResponse;
use testhub_core::{Category, basename};
use tracing::debug;

use crate::cli::UploadArgs;
use crate::client::{AppContext, CliError, CliResult, classify_problem};
use crate::output::render_upload;

const UPLOAD_FIELD: &str = "contract_file";

pub(crate) async fn handle_upload(
    ctx: &AppContext,
    args: &UploadArgs,
    raw: bool,
) -> CliResult<String> {
    let filename = upload_filename(&args.file)?;
    args.category
        .validate_extension(&filename)
        .map_err(|err| CliError::validation(err.to_string()))?;

    let contents = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))
        .map_err(CliError::failure)?;

    let response = submit(ctx, args.category, filename, contents).await?;
    render_upload(&response, raw)
}

fn upload_filename(path: &Path) -> CliResult<String> {
    let display = path.to_string_lossy();
    let name = basename(&display);
    if name.trim().is_empty() {
        return Err(CliError::validation(format!(
            "'{display}' does not name a contract file"
        )));
    }
    Ok(name.to_string())
}

async fn submit(
    ctx: &AppContext,
    category: Category,
    filename: String,
    contents: Vec<u8>,
) -> CliResult<UploadResponse> {
    let url = ctx.endpoint(&["upload", category.as_str()])?;
    debug!(%url, %filename, bytes = contents.len(), "uploading contract");

    let part = Part::bytes(contents)
        .file_name(filename)
        .mime_str("application/octet-stream")
        .map_err(|err| CliError::failure(anyhow!("invalid upload part: {err}")))?;
    let form = Form::new().part(UPLOAD_FIELD, part);

    let response = ctx
        .client
        .post(url)
        .multipart(form)
        .send()
        .await
        .map_err(|err| CliError::failure(anyhow!("upload request failed: {err}")))?;

    if response.status().is_success() {
        response
            .json::<UploadResponse>()
            .await
            .map_err(|err| CliError::failure(anyhow!("failed to parse upload response: {err}")))
    } else {
        Err(classify_problem(response).await)
    }
}

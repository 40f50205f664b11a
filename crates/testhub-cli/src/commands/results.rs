use anyhow::anyhow;
use testhub_api_models::ResultsResponse;
use tracing::debug;

use crate::cli::ResultsArgs;
use crate::client::{AppContext, CliError, CliResult, classify_problem};
use crate::output::render_results;

pub(crate) async fn handle_results(
    ctx: &AppContext,
    args: &ResultsArgs,
    raw: bool,
) -> CliResult<String> {
    if args.filename.trim().is_empty() {
        return Err(CliError::validation("filename must not be empty"));
    }
    let url = ctx.endpoint(&["results", args.category.as_str(), &args.filename])?;
    debug!(%url, "fetching report");

    let response = ctx
        .client
        .get(url)
        .send()
        .await
        .map_err(|err| CliError::failure(anyhow!("results request failed: {err}")))?;

    if !response.status().is_success() {
        return Err(classify_problem(response).await);
    }
    let results = response
        .json::<ResultsResponse>()
        .await
        .map_err(|err| CliError::failure(anyhow!("failed to parse results response: {err}")))?;
    render_results(&results, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use httpmock::prelude::*;
    use reqwest::{Client, Url};
    use serde_json::json;
    use testhub_core::Category;

    #[tokio::test]
    async fn results_request_targets_category_and_filename() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/results/non-evm/MyToken.txt");
                then.status(200).json_body(json!({
                    "category": "non-evm",
                    "filename": "MyToken.txt",
                    "report_filename": "MyToken-report.md",
                    "report": "File 'MyToken-report.md' not available after 60s."
                }));
            })
            .await;
        let ctx = AppContext {
            client: Client::new(),
            base_url: Url::parse(&server.base_url())?,
        };
        let args = ResultsArgs {
            category: Category::NonEvm,
            filename: "MyToken.txt".to_string(),
        };

        let rendered = handle_results(&ctx, &args, false)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        let parsed: serde_json::Value = serde_json::from_str(&rendered)?;
        assert_eq!(parsed["report_filename"], "MyToken-report.md");
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn blank_filename_is_rejected_locally() -> Result<()> {
        let ctx = AppContext {
            client: Client::new(),
            base_url: Url::parse("http://127.0.0.1:9")?,
        };
        let args = ResultsArgs {
            category: Category::Evm,
            filename: "  ".to_string(),
        };
        let Err(err) = handle_results(&ctx, &args, false).await else {
            return Err(anyhow!("expected validation failure"));
        };
        assert_eq!(err.exit_code(), 2);
        Ok(())
    }
}

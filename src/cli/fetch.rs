//! Fetch command implementation

use crate::http::FetchOptions;
use crate::ws::ReconnectingClient;
use anyhow::Context;
use clap::Args;
use reqwest::Method;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Endpoint path, e.g. /api/state
    pub path: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// JSON request body
    #[arg(short, long)]
    pub body: Option<String>,

    /// Extra header as "Name: value" (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,
}

impl FetchArgs {
    /// Build request options from the arguments
    pub fn options(&self) -> anyhow::Result<FetchOptions> {
        let method = Method::from_bytes(self.method.to_uppercase().as_bytes())
            .with_context(|| format!("Invalid HTTP method: {}", self.method))?;
        let mut options = FetchOptions::get().method(method);

        if let Some(body) = &self.body {
            let body = serde_json::from_str(body).context("Request body is not valid JSON")?;
            options = options.body(body);
        }

        for header in &self.headers {
            let (name, value) = header
                .split_once(':')
                .with_context(|| format!("Header must look like \"Name: value\": {}", header))?;
            options = options.header(name.trim(), value.trim())?;
        }

        Ok(options)
    }

    pub async fn execute(&self, client: &ReconnectingClient) -> anyhow::Result<()> {
        let options = self.options()?;
        let response = client.fetch(&self.path, options).await?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        Ok(())
    }
}

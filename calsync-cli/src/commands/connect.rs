use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::auth::{self, Credentials};

pub async fn run() -> Result<()> {
    let creds = Credentials::load()?;
    let consent_url = auth::consent_url(&creds);

    eprintln!("\nOpen this URL in your browser to authenticate:\n");
    eprintln!("{}\n", consent_url);

    // Try to open the browser automatically
    if open::that(&consent_url).is_err() {
        eprintln!("(Could not open browser automatically, please copy the URL above)");
    }

    let code = wait_for_callback().await?;

    eprintln!("\nReceived authorization code, exchanging for tokens...");

    let tokens = auth::exchange_code(&creds, &code).await?;
    tokens.save()?;

    eprintln!("Authentication successful!");
    Ok(())
}

async fn wait_for_callback() -> Result<String> {
    let listener = TcpListener::bind(auth::redirect_address())
        .await
        .context("Failed to bind callback listener")?;

    let (stream, _) = listener.accept().await.context("Callback connection failed")?;
    let mut reader = BufReader::new(stream);

    // GET /callback?code=...&scope=... HTTP/1.1
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    let path = request_line
        .split_whitespace()
        .nth(1)
        .context("Malformed callback request")?;
    let url = url::Url::parse(&format!("http://localhost{}", path))
        .context("Malformed callback URL")?;
    let code = url
        .query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .context("No authorization code in callback")?;

    let mut stream = reader.into_inner();
    stream
        .write_all(
            b"HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\n\r\n\
              You can close this tab and return to the terminal.",
        )
        .await?;

    Ok(code)
}

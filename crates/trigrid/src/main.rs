use trigrid::{ServerBuilder, TrigridError};

#[tokio::main]
async fn main() -> Result<(), TrigridError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trigrid=info".into()),
        )
        .init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);

    let server = ServerBuilder::new()
        .bind(&format!("0.0.0.0:{port}"))
        .build()
        .await?;
    tracing::info!(port, "trigrid listening");
    server.run().await
}

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, REDIS_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    if let Err(e) = devassets_api::server::serve().await {
        eprintln!("server error: {e}");
        std::process::exit(1);
    }
}

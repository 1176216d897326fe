use crate::database::schema::ensure_schema;
use crate::database::DatabaseManager;

pub async fn handle() -> anyhow::Result<()> {
    let pool = DatabaseManager::connect().await?;
    ensure_schema(&pool).await?;
    println!("Schema ready");
    Ok(())
}

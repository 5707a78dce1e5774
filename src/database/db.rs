use log::info;
use mongodb::bson::doc;
use mongodb::{Client, Database, options::ClientOptions};

use crate::utils::config::AppConfig;

/// Connects to MongoDB and checks the server answers a ping.
pub async fn connect_to_mongo(config: &AppConfig) -> Result<Database, mongodb::error::Error> {
    let mut client_options = ClientOptions::parse(&config.mongodb_uri).await?;
    client_options.app_name = Some("news_portal".to_string());

    let client = Client::with_options(client_options)?;

    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await?;

    info!("Connected successfully to MongoDB");

    Ok(client.database(&config.mongodb_db))
}

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info, warn};

mod category;
mod database;
mod middleware;
mod post;
mod router;
mod subscription;
#[cfg(test)]
mod testing;
mod user;
mod utils;

use database::{RedisService, Repositories};
use middleware::error_handler::error_handlers;
use router::index::routes;
use utils::config::AppConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();

    let db = database::connect_to_mongo(&config).await.map_err(|e| {
        error!("Failed to connect to MongoDB: {}", e);
        std::io::Error::other(e)
    })?;
    database::ensure_indexes(&db).await.map_err(|e| {
        error!("Failed to create MongoDB indexes: {}", e);
        std::io::Error::other(e)
    })?;
    let repositories = Repositories::mongo(&db);

    let redis_service = match &config.redis_url {
        Some(url) => match RedisService::connect(url).await {
            Ok(service) => Some(web::Data::new(service)),
            Err(e) => {
                warn!("{}; sessions will not be tracked", e);
                None
            }
        },
        None => {
            info!("REDIS_URL not set; sessions will not be tracked");
            None
        }
    };

    let bind = (config.host.clone(), config.port);
    info!("Starting server on http://{}:{}", bind.0, bind.1);

    let config = web::Data::new(config);

    HttpServer::new(move || {
        let mut app = App::new()
            .wrap(Logger::default())
            .app_data(config.clone())
            .configure(|cfg| repositories.configure(cfg));

        if let Some(redis) = &redis_service {
            app = app.app_data(redis.clone());
        }

        app.configure(routes).wrap(error_handlers())
    })
    .bind(bind)?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}

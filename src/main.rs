use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};

use threadboard::{db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    // Ensure data directory exists
    std::fs::create_dir_all("data").expect("Failed to create data directory");

    let database_path =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/forum.db".to_string());
    let pool = db::init_pool(&database_path);
    db::run_migrations(&pool);

    if std::env::var("SEED_DEMO").is_ok() {
        db::seed_demo(&pool);
    }

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(5000);

    log::info!("Starting server at http://127.0.0.1:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            // The panel is served from wherever the host app lives.
            .wrap(Cors::permissive())
            .app_data(web::Data::new(pool.clone()))
            .configure(handlers::configure)
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await
}

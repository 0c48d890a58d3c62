use actix_web::{middleware::Logger, web, App, HttpServer};

use std::path::Path;

use buurt_messages::config::{Config, CONFIG_FILE};
use buurt_messages::fetch::Fetcher;
use buurt_messages::page::{self, PageState};
use buurt_messages::render::Renderer;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let config = match Config::load(Path::new(CONFIG_FILE)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            ::std::process::exit(1);
        }
    };
    let renderer = match Renderer::new(&config.templates, config.escape_markup) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(
                error = %e,
                templates = %config.templates,
                "could not load templates"
            );
            ::std::process::exit(1);
        }
    };

    let page_data = web::Data::new(PageState {
        renderer,
        selector: config.container.clone(),
    });

    tracing::info!(
        endpoint = %config.endpoint,
        container = %config.container,
        bind = %config.bind_addr,
        "serving message page"
    );

    let bind_addr = config.bind_addr.clone();
    HttpServer::new(move || {
        // awc clients are per worker.
        let fetcher = web::Data::new(Fetcher::from_config(&config));
        App::new()
            .wrap(Logger::default())
            .app_data(page_data.clone())
            .app_data(fetcher)
            .service(page::get_index)
    })
    .bind(bind_addr)?
    .run()
    .await
}

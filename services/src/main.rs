//! Process entrypoint: loads configuration, opens the
//! catalog and worker pool once, and serves the `/gt/*` routes.

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use gt_operators::catalog::{Catalog, FsGdalCatalog};
use gt_operators::concurrency::WorkerPool;
use gt_services::config::{get_config_element, Catalog as CatalogConfig, Pipeline, Web};
use gt_services::handlers;
use gt_services::state::AppState;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    flexi_logger::Logger::try_with_env_or_str("info")
        .expect("logger spec must parse")
        .start()
        .expect("only one logger may be started per process");

    let web_config = get_config_element::<Web>().expect("web configuration must load");
    let catalog_config = get_config_element::<CatalogConfig>().expect("catalog configuration must load");
    let pipeline_config = get_config_element::<Pipeline>().expect("pipeline configuration must load");

    let catalog: Arc<dyn Catalog> = Arc::new(FsGdalCatalog::open(catalog_config.root));
    let worker_pool = WorkerPool::new(pipeline_config.worker_threads).expect("worker pool must start");
    let state = web::Data::new(AppState::new(catalog, worker_pool, pipeline_config));

    log::info!("listening on {}", web_config.bind_address);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::new("%r %s %Dms"))
            .configure(handlers::configure)
    })
    .bind(&web_config.bind_address)?
    .run()
    .await
}

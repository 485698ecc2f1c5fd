//! Server construction and catalogue wiring.

mod config;

pub use config::ServerSettings;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};

use storefront::domain::{Category, Product};
use storefront::inbound::http::{HttpState, configure};
use storefront::outbound::memory::{CatalogueSeed, InMemoryModel};

type Products = InMemoryModel<Product>;
type Categories = InMemoryModel<Category>;

/// Load the catalogue named by the settings, or an empty one.
///
/// # Errors
/// Returns [`std::io::Error`] when the seed file cannot be read or parsed.
fn load_catalogue(settings: &ServerSettings) -> std::io::Result<(Products, Categories)> {
    match &settings.catalogue_path {
        Some(path) => CatalogueSeed::load(path)
            .map(CatalogueSeed::into_models)
            .map_err(std::io::Error::other),
        None => {
            warn!("no catalogue seed configured; serving an empty catalogue");
            Ok((Products::default(), Categories::default()))
        }
    }
}

fn build_app(
    state: web::Data<HttpState<Products, Categories>>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .configure(configure::<Products, Categories>)
}

/// Construct the catalogue server bound to the configured address.
///
/// # Errors
/// Returns [`std::io::Error`] when the catalogue cannot be loaded or the
/// address cannot be bound.
pub fn create_server(settings: &ServerSettings) -> std::io::Result<Server> {
    let (products, categories) = load_catalogue(settings)?;
    let bind_addr = settings.bind_addr()?;
    info!(
        %bind_addr,
        products = products.len(),
        categories = categories.len(),
        "starting catalogue server"
    );

    let state = web::Data::new(HttpState::new(products, categories));
    let server = HttpServer::new(move || build_app(state.clone()))
        .bind(bind_addr)?
        .run();
    Ok(server)
}

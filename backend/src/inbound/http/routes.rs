//! Actix wiring for the catalogue controllers.
//!
//! Each route captures the request into a [`HandlerRequest`], runs the
//! controller against an [`ActixResponse`] and renders the result. Handlers are
//! generic over the document models so the server, the in-memory store and the
//! test doubles share one routing table.

use actix_web::{HttpRequest, HttpResponse, web};

use crate::domain::ports::DocumentModel;
use crate::domain::{Category, Product};
use crate::inbound::http::catalogue;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{ActixResponse, HandlerRequest};

/// Mount the catalogue routes under `/api/v1`.
///
/// The caller registers `web::Data<HttpState<P, C>>` as app data.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use storefront::domain::{Category, Product};
/// use storefront::inbound::http::{HttpState, configure};
/// use storefront::outbound::memory::InMemoryModel;
///
/// type Products = InMemoryModel<Product>;
/// type Categories = InMemoryModel<Category>;
///
/// let state = web::Data::new(HttpState::new(Products::default(), Categories::default()));
/// let _app = App::new()
///     .app_data(state)
///     .configure(configure::<Products, Categories>);
/// ```
pub fn configure<P, C>(cfg: &mut web::ServiceConfig)
where
    P: DocumentModel<Document = Product> + 'static,
    C: DocumentModel<Document = Category> + 'static,
{
    cfg.service(
        web::scope("/api/v1")
            .route("/products", web::get().to(products::<P, C>))
            .route("/products/slug/{slug}", web::get().to(product_by_slug::<P, C>))
            .route("/products/{id}", web::get().to(product::<P, C>))
            .route("/categories", web::get().to(categories::<P, C>))
            .route("/categories/{id}", web::get().to(category::<P, C>))
            .route(
                "/categories/{id}/products",
                web::get().to(category_products::<P, C>),
            ),
    );
}

async fn products<P, C>(state: web::Data<HttpState<P, C>>, request: HttpRequest) -> HttpResponse
where
    P: DocumentModel<Document = Product>,
    C: DocumentModel<Document = Category>,
{
    let req = HandlerRequest::from_http_request(&request);
    let mut res = ActixResponse::new();
    catalogue::list_products(&state.products, &req, &mut res).await;
    res.into_http_response()
}

async fn product<P, C>(state: web::Data<HttpState<P, C>>, request: HttpRequest) -> HttpResponse
where
    P: DocumentModel<Document = Product>,
    C: DocumentModel<Document = Category>,
{
    let req = HandlerRequest::from_http_request(&request);
    let mut res = ActixResponse::new();
    catalogue::get_product(&state.products, &req, &mut res).await;
    res.into_http_response()
}

async fn product_by_slug<P, C>(
    state: web::Data<HttpState<P, C>>,
    request: HttpRequest,
) -> HttpResponse
where
    P: DocumentModel<Document = Product>,
    C: DocumentModel<Document = Category>,
{
    let req = HandlerRequest::from_http_request(&request);
    let mut res = ActixResponse::new();
    catalogue::get_product_by_slug(&state.products, &req, &mut res).await;
    res.into_http_response()
}

async fn categories<P, C>(state: web::Data<HttpState<P, C>>, request: HttpRequest) -> HttpResponse
where
    P: DocumentModel<Document = Product>,
    C: DocumentModel<Document = Category>,
{
    let req = HandlerRequest::from_http_request(&request);
    let mut res = ActixResponse::new();
    catalogue::list_categories(&state.categories, &req, &mut res).await;
    res.into_http_response()
}

async fn category<P, C>(state: web::Data<HttpState<P, C>>, request: HttpRequest) -> HttpResponse
where
    P: DocumentModel<Document = Product>,
    C: DocumentModel<Document = Category>,
{
    let req = HandlerRequest::from_http_request(&request);
    let mut res = ActixResponse::new();
    catalogue::get_category(&state.categories, &req, &mut res).await;
    res.into_http_response()
}

async fn category_products<P, C>(
    state: web::Data<HttpState<P, C>>,
    request: HttpRequest,
) -> HttpResponse
where
    P: DocumentModel<Document = Product>,
    C: DocumentModel<Document = Category>,
{
    let req = HandlerRequest::from_http_request(&request);
    let mut res = ActixResponse::new();
    catalogue::get_products_by_category(&state.products, &req, &mut res).await;
    res.into_http_response()
}

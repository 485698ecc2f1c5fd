//! Catalogue controllers.
//!
//! ```text
//! GET /api/v1/products                      list_products
//! GET /api/v1/products/{id}                 get_product
//! GET /api/v1/products/slug/{slug}          get_product_by_slug
//! GET /api/v1/categories                    list_categories
//! GET /api/v1/categories/{id}               get_category
//! GET /api/v1/categories/{id}/products      get_products_by_category
//! ```
//!
//! Controllers receive their document model as an argument and never touch a
//! concrete store. On any data-access failure they log exactly one error event
//! and answer `500` with an [`ErrorEnvelope`].

use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::domain::ports::{DataAccessError, DocumentModel, DocumentQuery};
use crate::domain::{Category, Product};
use crate::inbound::http::{ErrorEnvelope, HandlerRequest, HandlerResponse, SuccessEnvelope};

const DEFAULT_PAGE_SIZE: u64 = 12;
const MAX_PAGE_SIZE: u64 = 100;
const LISTING_FIELDS: &str = "name slug priceCents category featured";

/// Resolved `page`/`limit` query values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// One-based page number.
    pub number: u64,
    /// Documents per page.
    pub size: u64,
}

impl Page {
    /// Read `page` and `limit`, falling back to page 1 of 12 for missing or
    /// malformed values and capping the size at 100.
    #[must_use]
    pub fn from_request(request: &HandlerRequest) -> Self {
        let parse = |name: &str| {
            request
                .query_value(name)
                .and_then(|raw| raw.parse::<u64>().ok())
                .filter(|value| *value > 0)
        };
        Self {
            number: parse("page").unwrap_or(1),
            size: parse("limit").unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE),
        }
    }

    /// Number of documents preceding this page.
    #[must_use]
    pub const fn offset(self) -> u64 {
        self.number.saturating_sub(1).saturating_mul(self.size)
    }
}

fn respond_data_access_error<R: HandlerResponse>(
    res: &mut R,
    message: &str,
    err: &DataAccessError,
) {
    res.status(500).send(ErrorEnvelope::new(message, err).into());
}

fn respond_ok<R, T>(res: &mut R, body: &SuccessEnvelope<T>, failure: &str)
where
    R: HandlerResponse,
    T: Serialize,
{
    match body.to_value() {
        Ok(value) => {
            res.status(200).json(value);
        }
        Err(err) => {
            error!(error = %err, "failed to serialize response body");
            res.status(500).send(ErrorEnvelope::new(failure, err).into());
        }
    }
}

fn respond_not_found<R: HandlerResponse>(res: &mut R, message: &str) {
    res.status(404)
        .send(json!({ "success": false, "message": message }));
}

fn respond_missing_param<R: HandlerResponse>(res: &mut R, name: &str) {
    res.status(400).send(json!({
        "success": false,
        "message": format!("Missing route parameter `{name}`"),
    }));
}

/// List products, newest first, one page at a time.
pub async fn list_products<M, R>(model: &M, req: &HandlerRequest, res: &mut R)
where
    M: DocumentModel<Document = Product>,
    R: HandlerResponse,
{
    let page = Page::from_request(req);
    let result = model
        .find(json!({}))
        .populate("category")
        .sort("-createdAt")
        .skip(page.offset())
        .limit(page.size)
        .await;
    match result {
        Ok(products) => {
            res.set("Cache-Control", "private, no-cache");
            respond_ok(res, &SuccessEnvelope::list(products), "Error fetching products");
        }
        Err(err) => {
            error!(error = %err, page = page.number, "failed to list products");
            respond_data_access_error(res, "Error fetching products", &err);
        }
    }
}

/// Fetch one product by identifier.
pub async fn get_product<M, R>(model: &M, req: &HandlerRequest, res: &mut R)
where
    M: DocumentModel<Document = Product>,
    R: HandlerResponse,
{
    let Some(id) = req.param("id") else {
        respond_missing_param(res, "id");
        return;
    };
    match model.find_by_id(id).populate("category").await {
        Ok(Some(product)) => respond_ok(res, &SuccessEnvelope::new(product), "Error fetching product"),
        Ok(None) => respond_not_found(res, "Product not found"),
        Err(err) => {
            error!(error = %err, product_id = %id, "failed to fetch product");
            respond_data_access_error(res, "Error fetching product", &err);
        }
    }
}

/// Fetch one product by slug.
pub async fn get_product_by_slug<M, R>(model: &M, req: &HandlerRequest, res: &mut R)
where
    M: DocumentModel<Document = Product>,
    R: HandlerResponse,
{
    let Some(slug) = req.param("slug") else {
        respond_missing_param(res, "slug");
        return;
    };
    match model.find_one(json!({ "slug": slug })).populate("category").await {
        Ok(Some(product)) => respond_ok(res, &SuccessEnvelope::new(product), "Error fetching product"),
        Ok(None) => respond_not_found(res, "Product not found"),
        Err(err) => {
            error!(error = %err, slug = %slug, "failed to fetch product by slug");
            respond_data_access_error(res, "Error fetching product", &err);
        }
    }
}

/// List the products of one category with listing fields only.
pub async fn get_products_by_category<M, R>(model: &M, req: &HandlerRequest, res: &mut R)
where
    M: DocumentModel<Document = Product>,
    R: HandlerResponse,
{
    let Some(category_id) = req.param("id") else {
        respond_missing_param(res, "id");
        return;
    };
    let result = model
        .find(json!({ "category": category_id }))
        .select(LISTING_FIELDS)
        .sort("name")
        .await;
    match result {
        Ok(products) => respond_ok(
            res,
            &SuccessEnvelope::list(products),
            "Error fetching products for category",
        ),
        Err(err) => {
            error!(error = %err, category_id = %category_id, "failed to list category products");
            respond_data_access_error(res, "Error fetching products for category", &err);
        }
    }
}

/// List categories by name.
pub async fn list_categories<M, R>(model: &M, _req: &HandlerRequest, res: &mut R)
where
    M: DocumentModel<Document = Category>,
    R: HandlerResponse,
{
    match model.find(json!({})).sort("name").await {
        Ok(categories) => respond_ok(
            res,
            &SuccessEnvelope::list(categories),
            "Error fetching categories",
        ),
        Err(err) => {
            error!(error = %err, "failed to list categories");
            respond_data_access_error(res, "Error fetching categories", &err);
        }
    }
}

/// Fetch one category by identifier.
pub async fn get_category<M, R>(model: &M, req: &HandlerRequest, res: &mut R)
where
    M: DocumentModel<Document = Category>,
    R: HandlerResponse,
{
    let Some(id) = req.param("id") else {
        respond_missing_param(res, "id");
        return;
    };
    match model.find_by_id(id).await {
        Ok(Some(category)) => {
            respond_ok(res, &SuccessEnvelope::new(category), "Error fetching category");
        }
        Ok(None) => respond_not_found(res, "Category not found"),
        Err(err) => {
            error!(error = %err, category_id = %id, "failed to fetch category");
            respond_data_access_error(res, "Error fetching category", &err);
        }
    }
}

#[cfg(test)]
mod tests {
    //! Success and not-found paths; the failure contract is covered by the
    //! integration suite in `tests/error_contract.rs`.
    use super::*;
    use crate::test_support::{MockModel, mock_request_response};
    use rstest::{fixture, rstest};

    #[fixture]
    fn product() -> Product {
        Product::builder("p-1", "Trail Shoe", "c-1")
            .price_cents(8_999)
            .build()
    }

    #[rstest]
    #[case(&[], Page { number: 1, size: 12 })]
    #[case(&[("page", "3"), ("limit", "5")], Page { number: 3, size: 5 })]
    #[case(&[("page", "0"), ("limit", "x")], Page { number: 1, size: 12 })]
    #[case(&[("limit", "1000")], Page { number: 1, size: 100 })]
    fn page_parses_query_values(#[case] query: &[(&str, &str)], #[case] expected: Page) {
        let request = HandlerRequest::default().with_query(query.iter().copied());
        assert_eq!(Page::from_request(&request), expected);
    }

    #[rstest]
    fn page_offset_skips_previous_pages() {
        assert_eq!(Page { number: 3, size: 5 }.offset(), 10);
        assert_eq!(Page { number: 1, size: 5 }.offset(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn get_product_returns_the_found_document(product: Product) {
        let model = MockModel::<Product>::new();
        model
            .set_resolved("populate", Some(product.clone()))
            .expect("populate is chainable");
        let (req, mut res) = mock_request_response([("id", "p-1")]);

        get_product(&model, &req, &mut res).await;

        assert_eq!(res.status_calls(), vec![200]);
        let expected = json!({ "success": true, "data": serde_json::to_value(&product).expect("json") });
        assert_eq!(res.json_calls(), vec![&expected]);
        assert_eq!(model.calls()[0].argument, json!("p-1"));
    }

    #[rstest]
    #[tokio::test]
    async fn get_product_answers_not_found_for_missing_documents() {
        let model = MockModel::<Product>::new();
        model
            .set_resolved("populate", None::<Product>)
            .expect("populate is chainable");
        let (req, mut res) = mock_request_response([("id", "missing")]);

        get_product(&model, &req, &mut res).await;

        assert_eq!(res.status_calls(), vec![404]);
        assert_eq!(
            res.send_calls(),
            vec![&json!({ "success": false, "message": "Product not found" })]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn get_product_requires_an_id() {
        let model = MockModel::<Product>::new();
        let (req, mut res) = mock_request_response(Vec::<(String, String)>::new());

        get_product(&model, &req, &mut res).await;

        assert_eq!(res.status_calls(), vec![400]);
        assert!(model.calls().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn list_products_pages_through_the_chain(product: Product) {
        let model = MockModel::<Product>::new();
        model
            .set_resolved("limit", vec![product])
            .expect("limit is chainable");
        let (bare, mut res) = mock_request_response(Vec::<(String, String)>::new());
        let req = bare.with_query([("page", "2"), ("limit", "5")]);

        list_products(&model, &req, &mut res).await;

        assert_eq!(res.status_calls(), vec![200]);
        assert_eq!(
            res.header_calls(),
            vec![("Cache-Control", "private, no-cache")]
        );
        let arguments: Vec<_> = model
            .calls()
            .into_iter()
            .map(|call| (call.method.as_str(), call.argument))
            .collect();
        assert_eq!(
            arguments,
            vec![
                ("find", json!({})),
                ("populate", json!("category")),
                ("sort", json!("-createdAt")),
                ("skip", json!(5)),
                ("limit", json!(5)),
            ]
        );
        assert_eq!(res.json_calls()[0]["count"], json!(1));
    }

    #[rstest]
    #[tokio::test]
    async fn get_products_by_category_filters_on_the_route_id(product: Product) {
        let model = MockModel::<Product>::new();
        model
            .set_resolved("sort", vec![product])
            .expect("sort is chainable");
        let (req, mut res) = mock_request_response([("id", "c-1")]);

        get_products_by_category(&model, &req, &mut res).await;

        assert_eq!(res.status_calls(), vec![200]);
        assert_eq!(model.calls()[0].argument, json!({ "category": "c-1" }));
        assert_eq!(model.calls()[1].argument, json!(LISTING_FIELDS));
    }

    #[rstest]
    #[tokio::test]
    async fn get_product_by_slug_queries_the_slug() {
        let model = MockModel::<Product>::new();
        let (req, mut res) = mock_request_response([("slug", "trail-shoe")]);

        get_product_by_slug(&model, &req, &mut res).await;

        // An unterminated chain resolves to no document.
        assert_eq!(res.status_calls(), vec![404]);
        assert_eq!(model.calls()[0].argument, json!({ "slug": "trail-shoe" }));
    }

    #[rstest]
    #[tokio::test]
    async fn categories_are_listed_and_fetched() {
        let model = MockModel::<Category>::new();
        let footwear = Category::new("c-1", "Footwear");
        model
            .set_resolved("sort", vec![footwear.clone()])
            .expect("sort is chainable");
        model
            .set_resolved("find_by_id", Some(footwear))
            .expect("find_by_id is chainable");

        let (list_req, mut list_res) = mock_request_response(Vec::<(String, String)>::new());
        list_categories(&model, &list_req, &mut list_res).await;
        assert_eq!(list_res.json_calls()[0]["count"], json!(1));

        let (get_req, mut get_res) = mock_request_response([("id", "c-1")]);
        get_category(&model, &get_req, &mut get_res).await;
        assert_eq!(get_res.json_calls()[0]["data"]["slug"], json!("footwear"));
    }
}

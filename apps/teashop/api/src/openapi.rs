use utoipa::OpenApi;

/// Prefixed domain documents, one per router nested under `/api`
#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Teashop API",
        version = "0.1.0",
        description = "Storefront backend: catalog, accounts, orders, payment methods and contact messages"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/user", api = domain_users::handlers::ApiDoc),
        (path = "/product", api = domain_catalog::handlers::ProductApiDoc),
        (path = "/category", api = domain_catalog::handlers::CategoryApiDoc),
        (path = "/order", api = domain_orders::handlers::ApiDoc),
        (path = "/payment", api = domain_payments::handlers::ApiDoc),
        (path = "/message", api = domain_messages::handlers::ApiDoc)
    )
)]
struct DomainApiDoc;

/// Full document served by the docs UIs.
///
/// The session routes live at the API root, so their document is merged
/// rather than nested.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = DomainApiDoc::openapi();
        doc.merge(domain_users::auth_handlers::ApiDoc::openapi());
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_covers_every_router() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/login",
            "/register",
            "/sessionUser",
            "/logout",
            "/user/{id}",
            "/product",
            "/category",
            "/order",
            "/order/{id}/cancel",
            "/payment/create",
            "/message",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
    }
}

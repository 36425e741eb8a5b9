use crate::models::dto;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(info(
    title = "Stock Track Finance API",
    description = "Ticker quotes, statistics and price history reshaped for the Stock Track front end",
))]
struct Api;

/// Constructs the route on the API that renders the swagger UI and returns the OpenAPI schema.
/// Merges in OpenAPI definitions from the [dto] package and the route submodules.
pub fn build_documentation() -> SwaggerUi {
    let mut api_docs = Api::openapi();
    api_docs.merge(dto::OpenApiSchemas::openapi());
    api_docs.merge(super::health::HealthApi::openapi());
    api_docs.merge(super::finance::FinanceApi::openapi());

    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api_docs)
}

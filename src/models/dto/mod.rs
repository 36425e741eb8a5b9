pub mod message;
pub mod ticker;
pub use message::Message;
pub use ticker::*;

use utoipa::OpenApi;

use crate::models::Period;

#[derive(OpenApi)]
#[openapi(components(schemas(
    Message,
    Period,
    TickerSnapshot,
    TickerPrice,
    TickerExists,
    TickerStats,
    TickerInfo,
    HistoryPoint,
    HistorySlice,
)))]
/// Captures OpenAPI schemas defined in the DTO module
pub struct OpenApiSchemas;

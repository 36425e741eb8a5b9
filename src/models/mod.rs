pub mod dto;
pub mod error;
pub mod info_record;
pub mod period;
pub mod price_row;
pub use error::{Error, GatewayError, UpstreamError};
pub use info_record::InfoRecord;
pub use period::Period;
pub use price_row::PriceRow;

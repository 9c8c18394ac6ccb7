pub mod config;
pub mod error;
pub mod module;
pub mod rate_limit;
pub mod types;

pub use config::{ServiceConfig, DEFAULT_BODY_LIMIT};
pub use error::{error_code, FieldError, ServiceError, INTERNAL_MESSAGE};
pub use module::Module;
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use types::{is_valid_id, new_id, now_rfc3339, Page, PageParams, Pagination, MAX_PAGE_SIZE};

pub mod response;
pub mod route_guard;
pub mod session;

pub use response::{ApiResponse, ApiResult};
pub use route_guard::route_guard;
pub use session::{require_bm, require_marketing, require_session};

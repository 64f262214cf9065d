mod encode;
mod handlers;
mod types;

pub use encode::{LogEncoder, LogFormat};
pub use handlers::{add_log, get_logs};
pub use types::{AddLogRequest, LogResponse, LogsQuery};

// Re-export utoipa path structs for OpenAPI documentation
pub use handlers::{__path_add_log, __path_get_logs};

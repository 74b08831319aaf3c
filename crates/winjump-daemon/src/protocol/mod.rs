pub mod codec;
pub mod messages;

pub use messages::{Request, RequestError, parse_request};
pub use winjump_core::daemon::{Response, WindowSummary};

pub mod config;
pub mod exception;
pub mod negotiator;
pub mod param;
pub mod request;
pub mod response;
pub mod rewriter;
pub mod selector;
pub mod util;

pub use config::Config;
pub use exception::Exception;
pub use negotiator::process;
pub use param::Format;
pub use request::Request;
pub use response::Response;
pub use rewriter::ResponseDocument;
pub use selector::{FormatPreference, NegotiationContext};
pub use util::HtmlBuilder;

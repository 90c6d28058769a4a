pub mod config;
pub mod dispatch;
pub mod exception;
pub mod param;
pub mod request;
pub mod response;
pub mod rules;
pub mod util;

pub use config::Config;
pub use dispatch::RequestCoordinator;
pub use exception::Exception;
pub use param::{HttpRequestMethod, HttpVersion};
pub use request::Request;
pub use response::{Response, ResponseContent};
pub use rules::{ChainSettings, DispatchContext, Rule, RuleChain};

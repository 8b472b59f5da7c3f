//! Joystick mapping service library.

pub mod config;
pub mod driver;
pub mod http;
pub mod lifecycle;
pub mod mapping;
pub mod observability;

pub use config::schema::ServiceConfig;
pub use driver::Supervisor;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use mapping::MappingService;

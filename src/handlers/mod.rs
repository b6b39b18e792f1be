pub mod report_handlers;
pub mod status_handlers;

pub use report_handlers::list_reports_handler;
pub use status_handlers::status_handler;

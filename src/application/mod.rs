pub mod entity_service;
pub mod forms;
pub mod images;
pub mod order_service;
pub mod presenter;
pub mod raffle_selector;
pub mod raffle_service;
pub mod realtime;
pub mod report_service;
pub mod reporting;
pub mod session;
pub mod submission;
pub mod support;
pub mod user_service;

pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fallback;
pub mod history;
pub mod report;
pub mod selector;
pub mod session;
pub mod store;
pub mod trainer;
pub mod translator;
pub mod types;
pub mod validator;
pub mod weights;

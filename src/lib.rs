// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod dataset;
pub mod error;
pub mod history;
pub mod logging;
pub mod pace;
pub mod ports;
pub mod profile;
pub mod runtime;
pub mod ui;
pub mod util;
pub mod validator;
pub mod wizard;

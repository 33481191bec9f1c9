//! Headless core of the HFRL feedback hub: model catalog, credential
//! store adapter, generation controller with an offline fallback, and
//! the feedback/quality-metric aggregator. Presentation is external and
//! reached only through [`ui::UiSink`].

pub mod api;
pub mod config;
pub mod connection;
pub mod credentials;
pub mod error;
pub mod feedback;
pub mod generate;
pub mod mock;
pub mod registry;
pub mod ui;

// Application layer - Use cases, collaborator traits and the polling loops
pub mod advisory_provider;
pub mod dashboard_service;
pub mod feed_provider;
pub mod monitor_state;
pub mod orchestrator;

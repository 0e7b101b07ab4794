// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod consentium_client;
pub mod gemini_advisor;

pub mod converter;
pub mod debounce;
pub mod rate_provider;
pub mod refresh_service;
pub mod widget;

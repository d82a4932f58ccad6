//! Utility modules: developer trace sink, logger.
pub mod devlog;
pub mod logger;

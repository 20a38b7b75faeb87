//! Process bootstrap helpers used once at startup.

pub mod logger;

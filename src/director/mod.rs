pub(crate) mod audio;
pub(crate) mod cast;
pub(crate) mod config;
pub(crate) mod engine;

pub(crate) mod attempt_builder;
pub(crate) mod errors;
pub(crate) mod scoring;
pub(crate) mod statistics;

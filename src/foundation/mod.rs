pub(crate) mod artifacts;
pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod process;

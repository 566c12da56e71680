pub(crate) mod descriptor;
pub(crate) mod regions;
pub(crate) mod viewport;

pub(crate) mod results;
pub(crate) mod upload;

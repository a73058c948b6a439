pub(crate) mod buffer;
pub(crate) mod filter;
pub(crate) mod mask;

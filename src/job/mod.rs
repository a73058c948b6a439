pub(crate) mod control;
pub(crate) mod file;
pub(crate) mod settings;

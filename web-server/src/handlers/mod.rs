pub(crate) mod generate;
pub(crate) mod help;
pub(crate) mod status;

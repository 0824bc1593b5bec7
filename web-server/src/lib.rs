pub mod err;
mod handlers;
pub mod page;
pub mod response;
pub mod spec;

pub mod server;

// Room for the text fields on top of the largest accepted upload
const FORM_FIELDS_BYTES: usize = 1024 * 1024;

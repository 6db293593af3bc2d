mod admin_create;
mod config_gen;
mod link_add;

pub use admin_create::{create_admin, read_password};
pub use config_gen::config_generate;
pub use link_add::add_link;

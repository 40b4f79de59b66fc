mod loader;
mod schema;

pub use loader::{config_path, data_dir, load_config, load_config_or_default, save_config};
pub use schema::Config;

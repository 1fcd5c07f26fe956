pub mod text_loader;

pub use text_loader::{file_name_of, list_text_files, load_text_file};

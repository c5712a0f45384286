pub mod path_normalizer;

pub use path_normalizer::{
    NormalizedFile, SiteFile, normalize_files, normalize_path, resolve_publish_dir,
};

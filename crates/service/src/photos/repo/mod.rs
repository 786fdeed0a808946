pub mod postgrest;

pub use postgrest::PostgrestPhotoRepository;

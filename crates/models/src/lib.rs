pub mod errors;
pub mod photo;

pub use photo::{NewPhoto, Photo};

pub mod base;
pub mod bucket;
pub mod configs;
pub mod dial;
pub mod image_options;
pub mod utils;

#[cfg(test)]
pub mod mock;

//! Multimodal workflows against an AI DIAL gateway: stage a local image and
//! ask a vision deployment about it, or ask an image-generation deployment
//! for pictures and save them locally.
pub mod config;
pub mod errors;
pub mod materialize;
pub mod models;
pub mod providers;
pub mod workflow;

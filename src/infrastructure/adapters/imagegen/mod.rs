//! Image Generation Adapters

mod fake_image_client;
mod http_image_client;

pub use fake_image_client::FakeImageGenClient;
pub use http_image_client::{HttpImageGenClient, HttpImageGenClientConfig};

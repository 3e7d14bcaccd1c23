pub mod client;
pub mod dto;
pub mod repo;

pub use client::{ApiClient, DEFAULT_SERVER_URL};
pub use repo::HttpProManageRepository;

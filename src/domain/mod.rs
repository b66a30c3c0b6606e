pub mod clock;
pub mod export;
pub mod listing;
pub mod models;
pub mod moderation;

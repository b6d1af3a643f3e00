pub mod auth;
pub mod avatars;
pub mod health;
pub mod players;

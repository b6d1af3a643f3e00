pub mod auth_service;
pub mod player_service;
pub mod token_service;

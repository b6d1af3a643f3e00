pub mod db;
pub mod minotar;

pub mod diagnosis;
pub mod health;

pub mod mint;
pub mod pdf;

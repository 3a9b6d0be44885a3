pub mod booking;
pub mod series;

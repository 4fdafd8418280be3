pub mod collection;
pub mod marketplace;
pub mod uploads;

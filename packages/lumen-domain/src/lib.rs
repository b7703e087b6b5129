pub mod analysis;
pub mod bullets;
pub mod day;
pub mod insight;
pub mod meal_signals;
pub mod narrative;
pub mod records;
pub mod summary;

pub mod balance_sheet;
pub mod column;
pub mod date_range;
pub mod price;

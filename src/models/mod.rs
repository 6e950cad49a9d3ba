pub mod invoice;
pub mod price_schedule;
pub mod reading;
pub mod report;

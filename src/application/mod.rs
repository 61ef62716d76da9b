pub mod admission;
pub mod fulfillment;

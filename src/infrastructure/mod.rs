pub mod models;
pub mod order_repo;
pub mod paystack;
pub mod resend;
pub mod ticket_repo;

#[cfg(test)]
pub mod memory;

pub mod category;
pub mod order;
pub mod otp;
pub mod snack;

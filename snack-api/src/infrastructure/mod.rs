pub mod database;
pub mod sms;
pub mod storage;

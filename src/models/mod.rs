pub mod booking;
pub mod courier;
pub mod history;
pub mod order;
pub mod parent;

pub mod library;
pub mod review;

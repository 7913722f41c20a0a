pub mod account;
pub mod auth;
pub mod collections;
pub mod library;
pub mod profile;
pub mod review;
pub mod verses;

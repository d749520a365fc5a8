//! Request middleware.

pub mod origin_check;

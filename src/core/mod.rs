// Core modules implementing storage and error modeling.
pub mod catalog;
pub mod error;

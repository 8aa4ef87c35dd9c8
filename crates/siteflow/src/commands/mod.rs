pub mod deploy;
pub mod upload;
pub mod validate;

pub mod allocation;
pub mod import;
pub mod transfer;

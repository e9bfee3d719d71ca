pub mod errors;
pub mod intake;

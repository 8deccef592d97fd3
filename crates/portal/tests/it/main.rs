mod gateway;
mod portal;
pub mod utils;

mod core;
mod utils;

pub use core::CodeExchanger;
pub use utils::sanitize_code;

pub mod parser;
pub mod raw;

pub use parser::ImuParser;
pub use raw::{RawScale, RAW_BLOCK_LEN};

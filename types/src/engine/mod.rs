mod codec;
mod constants;
mod house;
mod round;
mod session;
mod stats;

pub use codec::{read_string, string_encode_size, write_string};
pub use constants::*;
pub use house::*;
pub use round::*;
pub use session::*;
pub use stats::*;

#[cfg(test)]
mod tests;

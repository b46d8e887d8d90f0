/// Decoding of dynamic `Value` responses into plain Rust data
pub mod composite;
pub mod fixed;
pub mod primitive;

pub use composite::{into_list, unwrap_envelope, Record};
pub use fixed::decode_price;
pub use primitive::{
    bytes_to_hex, decode_address, decode_bool, decode_byte_vec,
    decode_text, decode_u128, decode_u16, decode_u64,
};

mod bcrypt_hasher;
mod json_session_codec;
mod shared_flag_codec;

pub use bcrypt_hasher::{BcryptPasswordHasher, DEFAULT_BCRYPT_COST};
pub use json_session_codec::JsonSessionCodec;
pub use shared_flag_codec::SharedFlagCodec;

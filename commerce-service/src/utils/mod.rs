pub mod password;
pub mod serialize;

pub use password::{hash_password, verify_password, Password, PasswordHashString};
pub use serialize::{api_document, now_bson};

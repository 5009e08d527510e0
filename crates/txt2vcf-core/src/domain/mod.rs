pub mod contact;
pub mod phone;

pub use contact::{build_contacts, ContactRecord};
pub use phone::extract_phone_numbers;

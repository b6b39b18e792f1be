pub mod handlers;

pub use handlers::{
    bearer_token, me_handler, request_magic_link_handler, verify_magic_link_handler,
};

pub mod init;
pub mod lists;
pub mod play;
pub mod validate;

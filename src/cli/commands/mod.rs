pub mod init;
pub mod seed;

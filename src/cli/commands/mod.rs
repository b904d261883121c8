pub mod config;
pub mod db;
pub mod hash_password;
pub mod init;
pub mod serve;

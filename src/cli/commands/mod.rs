//! One module per subcommand, each exposing an `execute` entry point.

pub mod create;
pub mod delete;
pub mod init;
pub mod keygen;
pub mod list;
pub mod read;
pub mod share;
pub mod unshare;
pub mod update;
pub mod user;

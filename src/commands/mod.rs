pub mod comment;
pub mod create;
pub mod department;
pub mod export;
pub mod init;
pub mod kb;
pub mod list;
pub mod reply;
pub mod serve;
pub mod show;
pub mod sla;
pub mod status;
pub mod survey;
pub mod user;

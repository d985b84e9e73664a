//! CLI command implementations.

mod ask;
mod config;
mod discover;
mod doctor;
mod download;
mod export;
mod index;
mod init;
mod list;
mod process;
mod search;
mod summarize;

pub use ask::run_ask;
pub use config::run_config;
pub use discover::run_discover;
pub use doctor::run_doctor;
pub use download::run_download;
pub use export::run_export;
pub use index::run_index;
pub use init::run_init;
pub use list::run_list;
pub use process::run_process;
pub use search::run_search;
pub use summarize::run_summarize;

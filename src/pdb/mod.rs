//! Reader for the per-player hand-history logs (`pdb.<player>` files)
//! of the IRC poker database.

pub mod reader;

pub use reader::{find_log_files, parse_line, read_dir_records, read_pdb_file, read_period};

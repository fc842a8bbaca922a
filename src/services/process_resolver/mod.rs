mod process_table;
mod resolver;

pub use self::process_table::{ProcessNode, ProcessTable, ProcfsTable};
pub use self::resolver::{ProcessResolver, WindowIdState};

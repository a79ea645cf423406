mod check;
mod latest;

pub use check::cmd_check;
pub use latest::cmd_latest;

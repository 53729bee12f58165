mod convert;
mod fetch;
mod inspect;
mod run;
mod unpack;

pub use convert::cmd_convert;
pub use fetch::cmd_fetch;
pub use inspect::cmd_inspect;
pub use run::cmd_run;
pub use unpack::cmd_unpack;

mod cleanup;
mod equalize;
mod resave;

pub use cleanup::cmd_cleanup;
pub use equalize::cmd_equalize;
pub use resave::cmd_resave;

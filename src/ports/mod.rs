//! Port traits for the collaborators around the decision core.

pub mod config_port;
pub mod data_port;
pub mod execution_port;
pub mod report_port;

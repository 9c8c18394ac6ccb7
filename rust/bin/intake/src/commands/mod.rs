pub mod form;
pub mod remote;

pub(crate) mod action;
pub(crate) mod compositor;
pub(crate) mod gesture;
pub(crate) mod history;

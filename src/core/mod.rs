pub mod time_space;
pub mod timeline_snap;
pub mod transport;
pub mod inspector;

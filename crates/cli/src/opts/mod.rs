mod portal;
pub use portal::PortalOpts;

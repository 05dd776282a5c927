mod client;
mod network;
mod scan_session;

pub use client::ClientRepository;
pub use network::NetworkRepository;
pub use scan_session::ScanSessionRepository;

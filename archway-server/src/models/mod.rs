mod client;
mod network;
mod scan_session;

pub use client::{ClientRow, ClientTable};
pub use network::{NetworkRow, NetworkTable};
pub use scan_session::{ScanSessionRow, ScanSessionTable};

pub trait Table {
    /// The name of the table
    fn name(&self) -> &'static str;

    /// The SQL statement to create the table
    fn create(&self) -> String;

    /// The SQL statement to dispose the table
    fn dispose(&self) -> String;

    /// The dependencies of the table
    fn dependencies(&self) -> Vec<&'static str>;
}

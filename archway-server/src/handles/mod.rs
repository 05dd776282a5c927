mod analytics_handle;
mod demo_handle;
mod health_handle;
mod interface_handle;
mod network_handle;
mod scan_handle;
mod sse_handle;

pub use analytics_handle::*;
pub use demo_handle::*;
pub use health_handle::*;
pub use interface_handle::*;
pub use network_handle::*;
pub use scan_handle::*;
pub use sse_handle::*;

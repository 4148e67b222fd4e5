pub mod countdown;
pub mod diagnostics;
pub mod feedback;
pub mod ipc;
pub mod media_clock;
pub mod session;
pub mod transport;

pub use countdown::*;
pub use diagnostics::*;
pub use feedback::*;
pub use ipc::*;
pub use media_clock::*;
pub use session::*;
pub use transport::*;

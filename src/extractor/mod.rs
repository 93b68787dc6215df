pub mod models;
pub mod traits;
pub mod ytdlp;

pub use models::OutputLine;
pub use traits::MediaBackend;
pub use ytdlp::{find_ytdlp, YtDlp};

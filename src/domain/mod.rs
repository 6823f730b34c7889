pub mod error;
pub mod model;

pub use error::{BindError, DownloadError, SubmitError};
pub use model::{
    Destination, DoneState, DownloadItem, ItemId, ProgressBar, SessionEvent, SubscriptionId,
};

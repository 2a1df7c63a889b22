mod dispatcher;
mod vapid;
mod webpush_dispatcher;

pub use dispatcher::{DispatchError, NotificationDispatcher};
pub use vapid::VapidCredentials;
pub use webpush_dispatcher::WebPushDispatcher;

pub mod dispatcher;
pub mod request_queue;

pub use dispatcher::Dispatcher;
pub use request_queue::RequestQueue;

pub mod consult;
pub mod entry;
pub mod filter;
pub mod store;

pub use consult::{
    generate_user_id, ConsultError, ConsultEvent, ConsultRequest, ConsultService, ConsultStream,
};
pub use entry::{render_header, SessionEntry};
pub use filter::filter_history;
pub use store::{LogStore, StoreError};

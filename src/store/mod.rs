pub mod row_store;
pub mod schema;
pub mod table;
pub mod transport;

pub use row_store::RowStore;
pub use table::{Table, parse_bool, parse_yes_no};
pub use transport::{MemoryTransport, RestTransport, SheetsTransport, StoreError};

// Flat-file adapters for the batch tables
pub mod cable_codes_adapter;
pub mod order_table_adapter;

pub use cable_codes_adapter::read_cable_codes;
pub use order_table_adapter::{read_orders, write_shipments};

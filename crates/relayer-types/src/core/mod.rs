pub mod ics02_client;
pub mod ics03_connection;
pub mod ics04_channel;
pub mod ics23_commitment;
pub mod ics24_host;
pub mod ics33_multihop;

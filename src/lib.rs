pub mod graph;
pub mod cust_error;
pub mod progress;
pub mod config;
pub mod vc_instance;
pub mod kernelization;
pub mod bounded_search;
pub mod heuristics;
pub mod connectivity;
pub mod worker;

pub mod aggregation;
pub mod assignment;
pub mod queue;
pub mod workload;

//! File formats read and written by the pipeline jobs.

pub mod dataset;

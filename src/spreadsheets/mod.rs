pub mod neighborhood_report;

pub use neighborhood_report::export_neighborhood_report;

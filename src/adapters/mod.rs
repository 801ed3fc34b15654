pub mod csv_report_adapter;
pub mod file_config_adapter;
pub mod typst_report;

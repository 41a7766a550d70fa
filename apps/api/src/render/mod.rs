// PDF report rendering.
// Report text is built in `reports`, laid out with static font metrics and written with
// printpdf builtin fonts. Rendering is CPU-bound and runs inside spawn_blocking.

pub mod metrics;
pub mod pdf;
pub mod reports;

pub use reports::{
    candidate_report_names, global_report_body, global_report_name, write_reports, ReportJob,
};

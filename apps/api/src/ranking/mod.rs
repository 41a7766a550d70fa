// Ranking table, CSV persistence and the ranking pages.

pub mod csv_store;
pub mod handlers;
pub mod table;

pub use table::{build_rows, sort_rows, RankingFilter, RankingRow};

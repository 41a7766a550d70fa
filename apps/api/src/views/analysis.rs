use crate::analysis::pipeline::{AnalysisMode, AnalysisOutcome};
use crate::auth::CurrentUser;
use crate::config::Limits;
use crate::views::{escape, layout, ranking::ranking_table, url_encode};

/// GET /: upload form.
pub fn upload_page(user: &CurrentUser, limits: &Limits) -> String {
    let body = format!(
        r#"<form method="post" action="/analyze" enctype="multipart/form-data">
            <p>
                <label><input type="radio" name="analysis_type" value="individual" checked>
                    Individual analysis (up to {max_cvs} CVs)</label><br>
                <label><input type="radio" name="analysis_type" value="comparison">
                    Comparison (up to {max_compare} CVs)</label>
            </p>
            <p><label>Target position (comparison only)
                <input name="job_position" placeholder="e.g. Backend engineer"></label></p>
            <p><input type="file" name="cv_files" accept="application/pdf,.pdf" multiple required></p>
            <p><button type="submit">Analyze</button></p>
        </form>"#,
        max_cvs = limits.max_cvs,
        max_compare = limits.max_cvs_compare,
    );
    layout("Analyze CVs", Some(user), &body)
}

/// POST /analyze result: ranking of this run plus download links.
pub fn results_page(user: &CurrentUser, outcome: &AnalysisOutcome) -> String {
    let mode = match outcome.mode {
        AnalysisMode::Individual => "Individual analysis",
        AnalysisMode::Comparison => "Comparison",
    };

    let global = outcome
        .global_report
        .as_deref()
        .map(|name| {
            format!(
                r#"<li>Global report: <a href="/download/reports/{url}">{name}</a></li>"#,
                url = url_encode(name),
                name = escape(name),
            )
        })
        .unwrap_or_default();

    let body = format!(
        r#"<p>{mode} of {count} CV(s) finished.</p>
        <ul>
            <li>Ranking CSV: <a href="/download/rankings/{csv_url}">{csv}</a>
                (<a href="/ranking?file={csv_url}">view</a>)</li>
            {global}
        </ul>
        {table}"#,
        count = outcome.rows.len(),
        csv_url = url_encode(&outcome.ranking_file),
        csv = escape(&outcome.ranking_file),
        table = ranking_table(&outcome.rows),
    );
    layout("Analysis results", Some(user), &body)
}

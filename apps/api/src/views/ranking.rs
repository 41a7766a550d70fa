//! Ranking table, score chart, filter form and history pages.

use crate::auth::CurrentUser;
use crate::ranking::{RankingFilter, RankingRow};
use crate::views::{escape, layout, url_encode};

const CHART_JS_URL: &str = "https://cdn.jsdelivr.net/npm/chart.js";

/// The ranking table shared by the results, ranking and filter pages.
pub fn ranking_table(rows: &[RankingRow]) -> String {
    if rows.is_empty() {
        return "<p>No candidates to show.</p>".to_string();
    }

    let mut html = String::from(
        r#"<table>
            <thead>
                <tr>
                    <th>#</th><th>Name</th><th>Score</th><th>Industry</th><th>MBTI</th>
                    <th>Skills</th><th>Pros</th><th>Cons</th><th>Experience</th>
                    <th>Education</th><th>Recommended positions</th><th>Suggested courses</th>
                    <th>Report</th>
                </tr>
            </thead>
            <tbody>"#,
    );

    for (i, row) in rows.iter().enumerate() {
        let report = if row.pdf.is_empty() {
            "N/A".to_string()
        } else {
            format!(
                r#"<a href="/download/results/{}">PDF</a>"#,
                url_encode(&row.pdf)
            )
        };
        html.push_str(&format!(
            r#"
                <tr>
                    <td>{rank}</td>
                    <td title="{profile}">{name}</td>
                    <td>{score}</td>
                    <td>{industry}</td>
                    <td title="{mbti_explanation} ({mbti_confidence})">{mbti}</td>
                    <td>{skills}</td>
                    <td>{pros}</td>
                    <td>{cons}</td>
                    <td>{experience}</td>
                    <td>{education}</td>
                    <td>{positions}</td>
                    <td>{courses}</td>
                    <td>{report}</td>
                </tr>"#,
            rank = i + 1,
            profile = escape(&row.professional_profile),
            name = escape(&row.name),
            score = row.score_label(),
            industry = escape(&row.industry),
            mbti_explanation = escape(&row.mbti_explanation),
            mbti_confidence = escape(&row.mbti_confidence),
            mbti = escape(&row.mbti),
            skills = escape(&row.skills),
            pros = escape(&row.pros),
            cons = escape(&row.cons),
            experience = escape(&row.experience),
            education = escape(&row.education),
            positions = escape(&row.recommended_positions),
            courses = escape(&row.suggested_courses),
        ));
    }

    html.push_str(
        r#"
            </tbody>
        </table>"#,
    );
    html
}

/// Picker for the user's ranking files; submits `?file=` to `action`.
fn ranking_picker(action: &str, current: &str, available: &[String]) -> String {
    if available.len() < 2 {
        return String::new();
    }
    let options: String = available
        .iter()
        .map(|name| {
            let selected = if name == current { " selected" } else { "" };
            format!(
                r#"<option value="{v}"{selected}>{v}</option>"#,
                v = escape(name)
            )
        })
        .collect();
    format!(
        r#"<form class="inline" method="get" action="{action}">
            <label>Ranking <select name="file">{options}</select></label>
            <button type="submit">Show</button>
        </form>"#
    )
}

/// Embeds a value in an inline `<script>` as JSON.
fn script_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

/// GET /ranking: table plus a bar chart of the scores.
pub fn ranking_page(
    user: &CurrentUser,
    file_name: &str,
    rows: &[RankingRow],
    available: &[String],
) -> String {
    let labels: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    let scores: Vec<Option<f64>> = rows.iter().map(|r| r.score).collect();

    let body = format!(
        r#"{picker}
        <p>Ranking file: <a href="/download/rankings/{file_url}">{file}</a>
           (<a href="/api/rankings?file={file_url}">JSON</a>)</p>
        <canvas id="scores" height="120"></canvas>
        {table}
        <script src="{CHART_JS_URL}"></script>
        <script>
            new Chart(document.getElementById('scores'), {{
                type: 'bar',
                data: {{
                    labels: {labels},
                    datasets: [{{ label: 'Score', data: {scores} }}]
                }},
                options: {{ scales: {{ y: {{ min: 0, max: 100 }} }} }}
            }});
        </script>"#,
        picker = ranking_picker("/ranking", file_name, available),
        file_url = url_encode(file_name),
        file = escape(file_name),
        table = ranking_table(rows),
        labels = script_json(&labels),
        scores = script_json(&scores),
    );
    layout("Candidate ranking", Some(user), &body)
}

/// GET /filtered_ranking: filter form and the matching rows.
pub fn filtered_page(
    user: &CurrentUser,
    file_name: &str,
    filter: &RankingFilter,
    industries: &[String],
    rows: &[RankingRow],
) -> String {
    let industry_options: String = industries
        .iter()
        .map(|industry| {
            let selected = if filter.industry.as_deref() == Some(industry.as_str()) {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{v}"{selected}>{v}</option>"#,
                v = escape(industry)
            )
        })
        .collect();

    let body = format!(
        r#"<form class="inline" method="get" action="/filtered_ranking">
            <input type="hidden" name="file" value="{file}">
            <label>Min score <input name="min_score" type="number" step="any" value="{min}"></label>
            <label>Max score <input name="max_score" type="number" step="any" value="{max}"></label>
            <label>Industry
                <select name="industry">
                    <option value="">Any</option>
                    {industry_options}
                </select>
            </label>
            <label>Skill <input name="skills" value="{skills}"></label>
            <button type="submit">Filter</button>
        </form>
        <p>{count} candidate(s) in {file}</p>
        {table}"#,
        file = escape(file_name),
        min = filter.min(),
        max = filter.max(),
        skills = escape(filter.skills.as_deref().unwrap_or_default()),
        count = rows.len(),
        table = ranking_table(rows),
    );
    layout("Filter candidates", Some(user), &body)
}

fn file_list(kind: &str, names: &[String], extra: impl Fn(&str) -> String) -> String {
    if names.is_empty() {
        return "<p>Nothing yet.</p>".to_string();
    }
    let items: String = names
        .iter()
        .map(|name| {
            format!(
                r#"<li><a href="/download/{kind}/{url}">{name}</a>{extra}</li>"#,
                url = url_encode(name),
                name = escape(name),
                extra = extra(name),
            )
        })
        .collect();
    format!("<ul>{items}</ul>")
}

/// GET /history: links to every ranking CSV and global report of the user.
pub fn history_page(user: &CurrentUser, rankings: &[String], reports: &[String]) -> String {
    let ranking_links = |name: &str| {
        format!(
            r#" (<a href="/ranking?file={url}">view</a>, <a href="/filtered_ranking?file={url}">filter</a>)"#,
            url = url_encode(name)
        )
    };

    let body = format!(
        r#"<h2>Rankings</h2>
        {rankings}
        <h2>Global reports</h2>
        {reports}"#,
        rankings = file_list("rankings", rankings, ranking_links),
        reports = file_list("reports", reports, |_| String::new()),
    );
    layout("History", Some(user), &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> CurrentUser {
        CurrentUser {
            username: "alice".into(),
            display_name: "Alice".into(),
        }
    }

    fn row(name: &str, score: Option<f64>, pdf: &str) -> RankingRow {
        RankingRow {
            score,
            pdf: pdf.into(),
            ..RankingRow::unreadable(name)
        }
    }

    #[test]
    fn test_table_escapes_and_links_reports() {
        let html = ranking_table(&[row("<b>Eve</b>", Some(80.0), "Eve_analysis_1.pdf")]);
        assert!(html.contains("&lt;b&gt;Eve&lt;/b&gt;"));
        assert!(html.contains(r#"href="/download/results/Eve_analysis_1.pdf""#));
        assert!(html.contains("<td>80</td>"));
    }

    #[test]
    fn test_table_without_report() {
        let html = ranking_table(&[row("cv.pdf", None, "")]);
        assert!(html.contains("<td>N/A</td>"));
        assert!(!html.contains("/download/results/"));
    }

    #[test]
    fn test_ranking_page_embeds_chart_data() {
        let rows = vec![row("Ana", Some(90.0), ""), row("x</script>", None, "")];
        let html = ranking_page(&user(), "cv_ranking_1.csv", &rows, &[]);
        assert!(html.contains(r#"labels: ["Ana","x<\/script>"]"#));
        assert!(html.contains("data: [90.0,null]"));
    }

    #[test]
    fn test_history_lists_files() {
        let html = history_page(
            &user(),
            &["cv_ranking_2.csv".to_string()],
            &["global_report_2.pdf".to_string()],
        );
        assert!(html.contains(r#"href="/download/rankings/cv_ranking_2.csv""#));
        assert!(html.contains(r#"href="/ranking?file=cv_ranking_2.csv""#));
        assert!(html.contains(r#"href="/download/reports/global_report_2.pdf""#));
    }
}

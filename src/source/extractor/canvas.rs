use scraper::{ElementRef, Html, Selector};

use super::generic::{normalize, visible_text};

/// Course-list pages (`/courses`) carry enrollments in two tables; render each row
/// as a sentence so the chunker can split on it. `None` when neither table exists.
pub fn extract(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    let mut lines: Vec<String> = Vec::new();
    for (table, label) in [("#my_courses_table", "Current"), ("#past_enrollments_table", "Past")] {
        let Some(table) = select_first(&doc, table) else { continue };
        let Ok(rows) = Selector::parse("tbody tr") else { continue };
        lines.extend(table.select(&rows).filter_map(|row| course_line(row, label)));
    }

    if lines.is_empty() { None } else { Some(lines.join("\n")) }
}

fn course_line(row: ElementRef<'_>, label: &str) -> Option<String> {
    let name = cell_text(row, ".course-list-course-title-column a .name")?;
    let term = cell_text(row, ".course-list-term-column").unwrap_or_else(|| "Unknown".into());
    let role = cell_text(row, ".course-list-enrolled-as-column").unwrap_or_else(|| "Unknown".into());
    let published = cell_text(row, ".course-list-published-column")
        .map(|s| s.contains("Yes"))
        .unwrap_or(false);

    let mut line = format!("{label} course: {name}. Term: {term}. Enrolled as: {role}.");
    if let Some(id) = course_id(row) {
        line.push_str(&format!(" Course id: {id}."));
    }
    if !published {
        line.push_str(" Not published.");
    }
    Some(line)
}

// the numeric id in the title link, e.g. /courses/12345
fn course_id(row: ElementRef<'_>) -> Option<String> {
    let sel = Selector::parse(".course-list-course-title-column a").ok()?;
    let href = row.select(&sel).next()?.value().attr("href")?;
    let rest = href.split("/courses/").nth(1)?;
    let id: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if id.is_empty() { None } else { Some(id) }
}

fn cell_text(row: ElementRef<'_>, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let node = row.select(&sel).next()?;
    let s = normalize(&visible_text(node)).replace('\n', " ");
    if s.is_empty() { None } else { Some(s) }
}

fn select_first<'a>(doc: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel).next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, href: &str, term: &str, role: &str, published: &str) -> String {
        format!(
            r#"<tr>
                 <td class="course-list-course-title-column"><a href="{href}"><span class="name">{name}</span></a></td>
                 <td class="course-list-term-column">{term}</td>
                 <td class="course-list-enrolled-as-column">{role}</td>
                 <td class="course-list-published-column">{published}</td>
               </tr>"#
        )
    }

    #[test]
    fn renders_current_and_past_enrollments() {
        let html = format!(
            r#"<html><body>
                 <table id="my_courses_table"><tbody>{}</tbody></table>
                 <table id="past_enrollments_table"><tbody>{}</tbody></table>
               </body></html>"#,
            row("COMP_SCI 101 Intro", "/courses/4521", "Fall 2024", "Student", "Yes"),
            row("MATH 230 Calculus", "https://canvas.example.edu/courses/3990/", "Spring 2024", "TA", "No"),
        );
        let got = extract(&html).unwrap();
        let lines: Vec<&str> = got.lines().collect();
        assert_eq!(
            lines[0],
            "Current course: COMP_SCI 101 Intro. Term: Fall 2024. Enrolled as: Student. Course id: 4521."
        );
        assert_eq!(
            lines[1],
            "Past course: MATH 230 Calculus. Term: Spring 2024. Enrolled as: TA. Course id: 3990. Not published."
        );
    }

    #[test]
    fn rows_without_a_name_are_skipped() {
        let html = format!(
            r#"<table id="my_courses_table"><tbody>{}<tr><td>header-ish</td></tr></tbody></table>"#,
            row("HIST 110", "/courses/7", "", "", "Yes"),
        );
        assert_eq!(
            extract(&html).unwrap(),
            "Current course: HIST 110. Term: Unknown. Enrolled as: Unknown. Course id: 7."
        );
    }

    #[test]
    fn none_without_course_tables() {
        assert!(extract("<html><body><div id=\"content\"><p>Syllabus.</p></div></body></html>").is_none());
    }
}

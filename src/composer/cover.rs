//! Bordered cover (title) page.

use chrono::Datelike;

use crate::models::{AuthorInfo, Mode};

/// Width of the rule lines
pub const COVER_WIDTH: usize = 60;

const INSTITUTION_PLACEHOLDER: &str = "[EDUCATIONAL INSTITUTION]";

/// Build a cover page dated with the current calendar year
pub fn compose_cover_page(topic: &str, author: &AuthorInfo, mode: Mode) -> String {
    compose_cover_page_in_year(topic, author, mode, chrono::Local::now().year())
}

/// Build a cover page for an explicit year.
///
/// Optional fields that are empty are left out entirely, so the page never
/// carries a label without a value.
pub fn compose_cover_page_in_year(
    topic: &str,
    author: &AuthorInfo,
    mode: Mode,
    year: i32,
) -> String {
    let outer = "=".repeat(COVER_WIDTH);
    let inner = "-".repeat(COVER_WIDTH);

    let institution = author.institution.trim();
    let institution = if institution.is_empty() {
        INSTITUTION_PLACEHOLDER.to_string()
    } else {
        institution.to_uppercase()
    };

    let grade = author.grade.trim();
    let completed_by = if grade.is_empty() {
        format!("Completed by: {}", author.edu_type.label())
    } else {
        format!(
            "Completed by: {}, {}",
            author.edu_type.label(),
            author.edu_type.grade_phrase(grade)
        )
    };

    let mut lines = vec![
        outer.clone(),
        String::new(),
        institution,
        String::new(),
        inner.clone(),
        String::new(),
        work_type_label(mode).to_string(),
        String::new(),
        "on the topic:".to_string(),
        format!("«{}»", topic.trim()),
        String::new(),
        inner.clone(),
        String::new(),
        completed_by,
    ];

    let name = author.name.trim();
    if !name.is_empty() {
        lines.push(name.to_string());
    }

    let group = author.group.trim();
    if !group.is_empty() {
        lines.push(format!("Group: {}", group));
    }

    let teacher = author.teacher.trim();
    if !teacher.is_empty() {
        lines.push(String::new());
        lines.push(format!("Teacher: {}", teacher));
    }

    lines.extend([
        String::new(),
        inner,
        String::new(),
        year.to_string(),
        String::new(),
        outer,
    ]);

    lines.join("\n")
}

fn work_type_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Doklad => "DOKLAD",
        Mode::Essay => "ESSAY",
        _ => "REFERAT",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EduType;

    fn pupil() -> AuthorInfo {
        AuthorInfo {
            edu_type: EduType::Pupil,
            grade: "9".to_string(),
            include_title_page: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_cover_page_layout() {
        let author = AuthorInfo {
            edu_type: EduType::Student,
            grade: "2".to_string(),
            name: "Anna Petrova".to_string(),
            institution: "Moscow State University".to_string(),
            group: "BIO-21".to_string(),
            teacher: "Prof. Ivanov".to_string(),
            include_title_page: true,
        };

        let page = compose_cover_page_in_year("Photosynthesis", &author, Mode::Essay, 2026);
        let lines: Vec<&str> = page.lines().collect();

        assert_eq!(lines[0], "=".repeat(COVER_WIDTH));
        assert_eq!(lines[2], "MOSCOW STATE UNIVERSITY");
        assert!(lines.contains(&"ESSAY"));
        assert!(lines.contains(&"«Photosynthesis»"));
        assert!(lines.contains(&"Completed by: Student, year 2"));
        assert!(lines.contains(&"Anna Petrova"));
        assert!(lines.contains(&"Group: BIO-21"));
        assert!(lines.contains(&"Teacher: Prof. Ivanov"));
        assert!(lines.contains(&"2026"));
        assert_eq!(*lines.last().unwrap(), "=".repeat(COVER_WIDTH));
    }

    #[test]
    fn test_cover_page_omits_blank_fields() {
        let page = compose_cover_page_in_year("Volcanoes", &pupil(), Mode::Referat, 2026);

        assert!(page.contains("[EDUCATIONAL INSTITUTION]"));
        assert!(page.contains("Completed by: Pupil, grade 9"));
        assert!(!page.contains("Group:"));
        assert!(!page.contains("Teacher:"));
        for line in page.lines() {
            assert!(!line.trim_end().ends_with(':') || line == "on the topic:", "{:?}", line);
        }
    }

    #[test]
    fn test_cover_page_without_grade() {
        let author = AuthorInfo::default();
        let page = compose_cover_page_in_year("Volcanoes", &author, Mode::Doklad, 2026);
        assert!(page.contains("DOKLAD"));
        assert!(page.contains("Completed by: Student\n"));
        assert!(!page.contains("year \n"));
    }

    #[test]
    fn test_work_type_label_falls_back_to_referat() {
        for mode in [Mode::Conspect, Mode::Question, Mode::Retell, Mode::Referat] {
            let page = compose_cover_page_in_year("X", &pupil(), mode, 2026);
            assert!(page.lines().any(|l| l == "REFERAT"));
        }
    }

    #[test]
    fn test_current_year_is_used() {
        let page = compose_cover_page("X", &pupil(), Mode::Referat);
        let year = chrono::Local::now().year().to_string();
        assert!(page.lines().any(|l| l == year));
    }
}

//! Printable HTML documents (certificate, attendance sheet).

use chrono::{DateTime, Utc};
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::db::{Certificate, Course, User};
use crate::services::reports::AttendanceSheet;

const STYLE: &str = r#"
body { font-family: "Noto Sans KR", sans-serif; margin: 2rem; color: #222; }
.certificate { border: 6px double #2b4a7a; padding: 3rem; text-align: center; }
.certificate h1 { letter-spacing: 0.5rem; }
.certificate .number { color: #666; font-size: 0.9rem; }
table.attendance { border-collapse: collapse; width: 100%; font-size: 0.85rem; }
table.attendance th, table.attendance td { border: 1px solid #999; padding: 0.25rem; text-align: center; }
td.zero { color: #bbb; }
@media print { body { margin: 0; } }
"#;

fn document(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="ko" {
            head {
                meta charset="utf-8";
                title { (title) " - SkillBridge" }
                style { (PreEscaped(STYLE)) }
            }
            body { (body) }
        }
    }
}

fn korean_date(at: DateTime<Utc>) -> String {
    at.format("%Y년 %m월 %d일").to_string()
}

pub fn certificate_document(
    certificate: &Certificate,
    learner: &User,
    course: &Course,
    completed_at: Option<DateTime<Utc>>,
) -> Markup {
    let body = html! {
        div."certificate" {
            p."number" { "제 " (certificate.certificate_number) " 호" }
            h1 { "수 료 증" }
            p { strong { (learner.display_name()) } }
            p {
                "위 사람은 SkillBridge에서 운영하는 "
                strong { (course.title) }
                " 과정을 성실히 이수하였기에 이 증서를 수여합니다."
            }
            dl {
                dt { "학습 시간" } dd { (course.estimated_time) "시간" }
                dt { "이수 학점" } dd { (course.credit) "학점" }
                @if let Some(completed_at) = completed_at {
                    dt { "수료일" } dd { (korean_date(completed_at)) }
                }
            }
            p { (korean_date(certificate.issued_at)) }
            p { strong { "SkillBridge" } }
        }
    };

    document(&format!("수료증 {}", certificate.certificate_number), body)
}

pub fn attendance_document(sheet: &AttendanceSheet) -> Markup {
    let body = html! {
        h1 { (sheet.course_title) " 출석부" }
        p { (sheet.window.start.to_string()) " ~ " (sheet.window.end.to_string()) }
        table."attendance" {
            thead {
                tr {
                    th { "수강생" }
                    th { "진도율" }
                    th { "상태" }
                    @for day in &sheet.days {
                        th { (day.format("%m/%d").to_string()) }
                    }
                }
            }
            tbody {
                @for row in &sheet.rows {
                    tr {
                        td { (row.username) }
                        td { (row.progress_percentage) "%" }
                        td { (row.status.as_str()) }
                        @for count in &row.daily_counts {
                            @if *count == 0 {
                                td."zero" { "0" }
                            } @else {
                                td { (*count) }
                            }
                        }
                    }
                }
                @if sheet.rows.is_empty() {
                    tr { td colspan=(sheet.days.len() + 3) { "수강생이 없습니다" } }
                }
            }
        }
    };

    document(&format!("{} 출석부", sheet.course_title), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::reports::AttendanceRow;
    use chrono::{NaiveDate, TimeZone};
    use skillbridge_core::attendance::AttendanceWindow;
    use skillbridge_core::{Difficulty, EnrollmentStatus};

    fn course() -> Course {
        Course {
            id: 1,
            title: "Rust <입문>".into(),
            description: String::new(),
            short_description: String::new(),
            difficulty_level: Difficulty::Beginner,
            estimated_time: 40,
            credit: 3,
            price: 50_000,
            instructor_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_certificate_document() {
        let issued_at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let certificate = Certificate {
            id: 7,
            user_id: 2,
            enrollment_id: 3,
            certificate_number: "SB-20250301-0A1B2C3D".into(),
            issued_at,
            document_html: None,
        };
        let learner = User {
            id: 2,
            username: "kim".into(),
            full_name: "김학생".into(),
            is_admin: false,
            created_at: issued_at,
        };

        let html = certificate_document(&certificate, &learner, &course(), Some(issued_at)).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("SB-20250301-0A1B2C3D"));
        assert!(html.contains("김학생"));
        assert!(html.contains("2025년 03월 01일"));
        // 과정명은 escape
        assert!(html.contains("Rust &lt;입문&gt;"));
    }

    #[test]
    fn test_attendance_document() {
        let window = AttendanceWindow::current(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
        let mut counts = vec![0; 14];
        counts[2] = 3;
        let sheet = AttendanceSheet {
            course_id: 1,
            course_title: "Rust 입문".into(),
            window,
            days: window.days(),
            rows: vec![AttendanceRow {
                user_id: 2,
                username: "kim".into(),
                progress_percentage: 40,
                status: EnrollmentStatus::Enrolled,
                daily_counts: counts,
                total: 3,
            }],
            periods: Vec::new(),
        };

        let html = attendance_document(&sheet).into_string();
        assert!(html.contains("2025-03-03 ~ 2025-03-16"));
        assert!(html.contains("03/05"));
        assert!(html.contains("<td>3</td>"));
        assert!(html.contains("enrolled"));
    }
}

//! End-to-end checks of the response post-processor on realistic agent output.

use ask_yonsei::subsystems::agents::postprocess::{LinkKind, MAX_LINKS, process};

const PHONE_ANSWER: &str = "직통 번호가 없어 상위 부서인 [학생복지처](https://welfare.yonsei.ac.kr/contact)의 연락처를 \
안내해 드립니다: 02-2123-XXXX\n\n||SOURCE:https://welfare.yonsei.ac.kr/contact";

#[test]
fn test_phone_answer_dedups_source() {
    let answer = process(PHONE_ANSWER);
    assert!(answer.text.starts_with("직통 번호가 없어 상위 부서인 학생복지처의 연락처를"));
    assert!(answer.text.ends_with("02-2123-XXXX"));
    assert_eq!(answer.links.len(), 1);
    assert_eq!(answer.links[0].label, "학생복지처");
    assert_eq!(answer.links[0].kind, LinkKind::OfficialSite);
}

#[test]
fn test_mixed_links_are_ordered_filtered_and_capped() {
    let raw = "송도학사 입사 안내입니다. [신청서](https://docs.google.com/forms/d/abc) 작성 후 \
               [포털 로그인](https://portal.yonsei.ac.kr/login)에서 확인하세요. \
               [위치](https://map.naver.com/v5/entry/place/1) \
               [공지](https://yicdorm.yonsei.ac.kr/notice) \
               [블로그](https://blog.example.com/dorm) \
               ||SOURCE:https://yicdorm.yonsei.ac.kr/main";
    let answer = process(raw);

    assert_eq!(answer.links.len(), MAX_LINKS);
    let urls: Vec<&str> = answer.links.iter().map(|l| l.url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "https://docs.google.com/forms/d/abc",
            "https://map.naver.com/v5/entry/place/1",
            "https://yicdorm.yonsei.ac.kr/notice",
            "https://blog.example.com/dorm",
        ]
    );
    assert!(answer.links.iter().all(|l| !l.url.contains("login")));
    assert_eq!(answer.links[0].kind, LinkKind::ApplicationForm);
    assert_eq!(answer.links[1].kind, LinkKind::Location);
    assert_eq!(answer.links[3].kind, LinkKind::Related);
    assert!(!answer.text.contains("]("));
    assert!(!answer.text.contains("||SOURCE"));
}

#[test]
fn test_every_display_label_is_short() {
    let raw = "[연세대학교 국제캠퍼스 송도학사 입사 공지](https://yicdorm.yonsei.ac.kr/a) \
               [Underwood International College](https://uic.yonsei.ac.kr)";
    for link in process(raw).links {
        let label = link.display_label();
        assert!(label.chars().count() <= 12, "label too long: {label}");
        assert!(label.ends_with(".."));
    }
}

#[test]
fn test_no_output_without_marker_or_links() {
    let answer = process("죄송합니다. 공개된 이메일 정보를 찾을 수 없습니다.");
    assert_eq!(answer.text, "죄송합니다. 공개된 이메일 정보를 찾을 수 없습니다.");
    assert!(answer.links.is_empty());
}

use super::*;

fn control(current_page: u32, total: u64, page_size: u32) -> Option<PaginationControl> {
    PaginationControl::build(PaginationSpec {
        current_page,
        total,
        page_size,
        route: "/category/design",
        sub_route: PAGE_SUB_ROUTE,
    })
}

#[test]
fn page_number_defaults_to_first_page() {
    assert_eq!(parse_page_number(None), 1);
    assert_eq!(parse_page_number(Some("")), 1);
    assert_eq!(parse_page_number(Some("abc")), 1);
    assert_eq!(parse_page_number(Some("0")), 1);
    assert_eq!(parse_page_number(Some("-3")), 1);
    assert_eq!(parse_page_number(Some(" 7 ")), 7);
}

#[test]
fn window_matches_inclusive_offset_range() {
    let first = OffsetWindow::for_page(1, 4);
    assert_eq!((first.start, first.end), (0, 3));
    assert_eq!(first.limit(), 4);

    let third = OffsetWindow::for_page(3, 4);
    assert_eq!((third.start, third.end), (8, 11));
    assert_eq!(third.offset(), 8);
}

#[test]
fn consecutive_windows_tile_without_overlap() {
    for page in 1..50u32 {
        let current = OffsetWindow::for_page(page, 7);
        let next = OffsetWindow::for_page(page + 1, 7);
        assert_eq!(current.end + 1, next.start);
        assert_eq!(current.limit(), 7);
    }
}

#[test]
fn total_pages_rounds_up() {
    assert_eq!(total_pages(0, 4), 0);
    assert_eq!(total_pages(4, 4), 1);
    assert_eq!(total_pages(5, 4), 2);
    assert_eq!(total_pages(10, 4), 3);
    assert_eq!(total_pages(10, 0), 0);
}

#[test]
fn no_control_without_items() {
    assert!(control(1, 0, 4).is_none());
}

#[test]
fn exact_page_size_yields_single_page_without_next() {
    let control = control(1, 4, 4).expect("control");
    assert_eq!(control.total_pages, 1);
    assert!(control.previous.is_none());
    assert!(control.next.is_none());
    let pages: Vec<u32> = control.pages().map(|link| link.page).collect();
    assert_eq!(pages, vec![1]);
}

#[test]
fn links_follow_route_and_sub_route() {
    let control = control(2, 10, 4).expect("control");
    assert_eq!(
        control.previous.as_ref().map(|l| l.href.as_str()),
        Some("/category/design/page/1")
    );
    assert_eq!(
        control.next.as_ref().map(|l| l.href.as_str()),
        Some("/category/design/page/3")
    );
    let current: Vec<_> = control.pages().filter(|l| l.is_current).collect();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].page, 2);
}

#[test]
fn current_page_is_clamped_to_range() {
    let past_end = control(9, 10, 4).expect("control");
    assert_eq!(past_end.current_page, 3);
    assert!(past_end.next.is_none());

    let before_start = control(0, 10, 4).expect("control");
    assert_eq!(before_start.current_page, 1);
    assert!(before_start.previous.is_none());
}

#[test]
fn long_ranges_collapse_into_gaps() {
    let control = control(10, 200, 10).expect("control");
    assert_eq!(control.total_pages, 20);
    let pages: Vec<u32> = control.pages().map(|link| link.page).collect();
    assert_eq!(pages, vec![1, 8, 9, 10, 11, 12, 20]);
    let gaps = control
        .entries
        .iter()
        .filter(|entry| matches!(entry, PaginationEntry::Gap))
        .count();
    assert_eq!(gaps, 2);
}

#[test]
fn adjacent_window_has_no_gap() {
    let control = control(3, 40, 10).expect("control");
    let pages: Vec<u32> = control.pages().map(|link| link.page).collect();
    assert_eq!(pages, vec![1, 2, 3, 4]);
    assert!(!control
        .entries
        .iter()
        .any(|entry| matches!(entry, PaginationEntry::Gap)));
}

#[test]
fn category_route_encodes_code_as_one_segment() {
    assert_eq!(category_route("design"), "/category/design");
    assert_eq!(category_route("café"), "/category/caf%C3%A9");
    assert_eq!(category_route("dev/ops?#1"), "/category/dev%2Fops%3F%231");
    assert_eq!(category_route("50% off"), "/category/50%25%20off");
}

#[test]
fn decoded_segment_recovers_code() {
    for code in ["design", "café", "dev/ops?#1", "50% off"] {
        assert_eq!(decode_path_segment(&encode_path_segment(code)).as_deref(), Some(code));
    }
    assert_eq!(decode_path_segment("%FF"), None);
}

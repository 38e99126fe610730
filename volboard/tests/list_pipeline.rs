use std::fs;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde_json::json;
use tempfile::TempDir;

use volboard::{
    CategoryRules, FetchOutcome, FilterCriteria, ListQuery, ListView, PageLimits, Record, Settings, evaluate,
    filter_records, match_percentage, normalize_json, normalize_payload, paginate, record_match,
};

fn opportunities(n: usize) -> Vec<Record> {
    let payload = json!({
        "data": (1..=n)
            .map(|i| json!({
                "id": i,
                "title": format!("Shift {i}"),
                "location": if i % 2 == 0 { "Portland, OR" } else { "Seattle, WA" },
                "start_date": format!("2024-07-{:02}", (i % 28) + 1),
                "skills_required": if i % 3 == 0 { "Driving, Spanish" } else { "Driving" },
            }))
            .collect::<Vec<_>>()
    });
    normalize_payload(payload, &CategoryRules::default())
}

#[test]
fn category_filter_keeps_matching_records_in_order() {
    let records = normalize_json(
        r#"[
            {"id": "a", "title": "Beach day", "category": "Environmental"},
            {"id": "b", "title": "Homework club", "category": "Education"},
            {"id": "c", "title": "Tree planting", "category": "Environmental"}
        ]"#,
        &CategoryRules::default(),
    )
    .unwrap();

    let criteria = FilterCriteria::new().with_category("Environmental");
    let matched = filter_records(Some(records.as_slice()), &criteria);
    let ids: Vec<&str> = matched.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[test]
fn default_criteria_match_everything() {
    let records = opportunities(12);
    let criteria = FilterCriteria::default();
    assert!(records.iter().all(|record| evaluate(record, &criteria)));
    assert_eq!(filter_records(Some(records.as_slice()), &criteria).len(), 12);
}

#[test]
fn skill_filter_is_a_subset_test() {
    let record = Record {
        skills: vec!["First Aid".to_string(), "Leadership".to_string()],
        ..Default::default()
    };

    assert!(evaluate(&record, &FilterCriteria::new().with_skills(Vec::<String>::new())));
    assert!(evaluate(&record, &FilterCriteria::new().with_skills(["first aid"])));
    assert!(evaluate(&record, &FilterCriteria::new().with_skills(["LEADERSHIP", "First Aid"])));
    assert!(!evaluate(&record, &FilterCriteria::new().with_skills(["First Aid", "Cooking"])));
}

#[test]
fn match_percentage_scenarios() {
    assert_eq!(match_percentage(0, 0), 0);
    assert_eq!(match_percentage(1, 3), 33);
    assert_eq!(match_percentage(2, 3), 67);

    let record = Record {
        skills: vec!["First Aid".to_string(), "Cooking".to_string()],
        ..Default::default()
    };
    let result = record_match(&record, &["First Aid", "Leadership"]);
    assert_eq!((result.matched, result.required, result.percentage), (1, 2, 50));
    assert_eq!(result.missing, vec!["Cooking".to_string()]);
}

#[test]
fn third_page_of_twenty_five() {
    let items: Vec<u32> = (1..=25).collect();
    let page = paginate(Some(items.as_slice()), 3, 10);
    assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
    assert_eq!(page.total_count, 25);
    assert_eq!(page.total_pages, 3);
    assert!(!page.has_next);
    assert!(page.has_prev);
}

#[test]
fn missing_collection_paginates_to_empty() {
    let page = paginate::<Record>(None, 1, 10);
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 0);
    assert_eq!(page.total_pages, 0);
}

#[test]
fn pages_reconstruct_the_filtered_list() {
    let records = opportunities(23);
    let request = ListQuery {
        filter: vec!["location:contains:portland".to_string()],
        page_size: Some(4),
        ..Default::default()
    }
    .into_request(&PageLimits::default())
    .unwrap();

    let first = request.run(Some(records.as_slice()));
    assert_eq!(first.total_count, 11);

    let mut seen = Vec::new();
    for page in 1..=first.total_pages {
        let current = request.clone().with_page(page, 4).run(Some(records.as_slice()));
        assert!(current.items.len() <= 4);
        seen.extend(current.items.iter().map(|r| r.id.clone()));
    }

    let expected: Vec<String> = {
        let mut matched = filter_records(Some(records.as_slice()), &request.criteria);
        volboard::sort_records(&mut matched, &request.sort);
        matched.iter().map(|r| r.id.clone()).collect()
    };
    assert_eq!(seen, expected);
}

#[test]
fn query_combines_filters_and_sort() {
    let records = opportunities(30);
    let request = ListQuery {
        sort_by: Some("-start_date".to_string()),
        filter: vec![
            "skills:all:spanish".to_string(),
            "start_date:range:2024-07-05,2024-07-20".to_string(),
        ],
        ..Default::default()
    }
    .into_request(&PageLimits::default())
    .unwrap();

    let page = request.run(Some(records.as_slice()));
    let dates: Vec<NaiveDate> = page.items.iter().filter_map(|r| r.start_date).collect();
    assert!(!dates.is_empty());
    assert!(dates.windows(2).all(|pair| pair[0] >= pair[1]));
    assert!(page.items.iter().all(|r| r.has_skill("Spanish")));
}

#[test]
fn bad_query_parameters_are_rejected() {
    let limits = PageLimits::default();
    let bad_sort = ListQuery {
        sort_by: Some("salary".to_string()),
        ..Default::default()
    };
    assert!(bad_sort.into_request(&limits).is_err());

    let bad_filter = ListQuery {
        filter: vec!["category".to_string()],
        ..Default::default()
    };
    assert!(bad_filter.into_request(&limits).is_err());
}

#[test]
fn list_view_debounces_and_drops_stale_responses() {
    let start = Instant::now();
    let mut view = ListView::new(5, Duration::from_millis(250));

    let slow = view.begin_fetch();
    let fast = view.begin_fetch();
    assert_eq!(view.receive(fast, Some(opportunities(12))), FetchOutcome::Applied);
    assert_eq!(view.receive(slow, Some(Vec::new())), FetchOutcome::Stale);
    assert_eq!(view.current_page().total_count, 12);

    view.set_page(3);
    assert_eq!(view.page(), 3);

    view.set_search_input("portland", start);
    assert!(!view.poll(start + Duration::from_millis(100)));
    assert_eq!(view.page(), 3);
    assert!(view.poll(start + Duration::from_millis(250)));
    assert_eq!(view.page(), 1);
    assert_eq!(view.current_page().total_count, 6);
}

#[test]
fn settings_are_found_in_ancestor_directories() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("volboard.toml"),
        r#"
        [listing]
        default_page_size = 5
        max_page_size = 50
        search_debounce_ms = 400

        [categories]
        fallback = "community"

        [categories.keywords]
        animals = ["shelter", "pet"]
        "#,
    )
    .unwrap();
    let nested = temp.path().join("exports").join("2024");
    fs::create_dir_all(&nested).unwrap();

    let (settings, path) = Settings::find(&nested).unwrap();
    assert_eq!(path, Some(temp.path().join("volboard.toml")));
    assert_eq!(settings.search_debounce(), Duration::from_millis(400));

    let rules = settings.category_rules().unwrap();
    let records = normalize_json(
        r#"[{"id": 1, "title": "Pet adoption day"}, {"id": 2, "title": "Bake sale"}]"#,
        &rules,
    )
    .unwrap();
    assert_eq!(records[0].category, "animals");
    assert_eq!(records[1].category, "community");

    let request = ListQuery::default().into_request(&settings.page_limits()).unwrap();
    assert_eq!(request.page_size, 5);
    let request = ListQuery {
        page_size: Some(500),
        ..Default::default()
    }
    .into_request(&settings.page_limits())
    .unwrap();
    assert_eq!(request.page_size, 50);
}

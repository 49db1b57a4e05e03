use dashview::DashError;
use dashview::aggregate::{Bins, Bucket, Rank, RankingEntry, count_by, distribute, top_n};
use dashview::browser::{Browser, SortDirection};
use dashview::export::export_filtered;
use dashview::record::{ColumnDescriptor, Record, Value};

const STATUSES: [&str; 3] = ["Active", "Idle", "Maintenance"];

fn locomotives() -> Vec<Record> {
    (0..48)
        .map(|i| {
            Record::new()
                .with("locomotiveId", format!("MARC {}", 8020 + i))
                .with("ptcActivePercentage", 60.0 + f64::from((i * 7) % 40))
                .with("status", STATUSES[(i % 3) as usize])
                .with("routes", vec!["Penn".to_string(), "Camden".to_string()])
        })
        .collect()
}

fn faults() -> Vec<Record> {
    [
        ("MARC 8050", "Brake"),
        ("MARC 8021", "Radio"),
        ("MARC 8050", "GPS"),
        ("MARC 8033", "Radio"),
        ("MARC 8050", "Radio"),
        ("MARC 8021", "Brake"),
    ]
    .into_iter()
    .map(|(loco, kind)| Record::new().with("locomotiveId", loco).with("faultType", kind))
    .collect()
}

fn columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("locomotiveId", "Locomotive"),
        ColumnDescriptor::new("ptcActivePercentage", "PTC Active")
            .with_render(|v| format!("{v}%")),
        ColumnDescriptor::new("status", "Status"),
    ]
}

fn id(record: &Record) -> String {
    record.get("locomotiveId").map(Value::display).unwrap_or_default()
}

#[test]
fn locomotive_scenario() {
    let mut browser = Browser::new("locomotives", locomotives(), columns());
    assert_eq!(browser.view().total_pages, 5);

    browser.set_search_term("805");
    let matched: Vec<String> = browser.filtered_records().into_iter().map(id).collect();
    let expected: Vec<String> = (8050..8060).map(|n| format!("MARC {n}")).collect();
    assert_eq!(matched, expected);

    browser.set_search_term("");
    browser.set_page(3);
    browser.set_sort("ptcActivePercentage");
    assert_eq!(browser.view().sort, Some(("ptcActivePercentage", SortDirection::Asc)));
    browser.set_sort("ptcActivePercentage");
    assert_eq!(browser.view().sort, Some(("ptcActivePercentage", SortDirection::Desc)));
    assert_eq!(browser.state().page_index, 3);

    let first = browser.filtered_records()[0];
    assert_eq!(first.get("ptcActivePercentage"), Some(&Value::Number(99.0)));

    browser.set_page_size(5).unwrap();
    let view = browser.view();
    assert_eq!(view.current_page, 0);
    assert_eq!(view.total_pages, 10);
    assert_eq!(view.records.len(), 5);
}

#[test]
fn search_term_shrinking_the_set_clamps_page() {
    let mut browser = Browser::new("locomotives", locomotives(), columns());
    browser.set_page(4);
    browser.set_search_term("maintenance");
    let view = browser.view();
    assert_eq!(view.total_filtered, 16);
    assert_eq!(view.total_pages, 2);
    assert_eq!(view.current_page, 0);
}

#[test]
fn list_fields_are_searchable() {
    let mut browser = Browser::new("locomotives", locomotives(), columns());
    browser.set_search_term("camden");
    assert_eq!(browser.view().total_filtered, 48);
    browser.set_search_term("brunswick");
    assert_eq!(browser.view().total_pages, 0);
}

#[test]
fn fault_counts_come_from_the_fault_collection() {
    let faults = faults();
    let per_loco = count_by(&faults, id);
    let ranking = top_n(&per_loco, |e| e.value, |e| e.name.clone(), 2, Rank::Top);
    assert_eq!(
        ranking,
        vec![
            RankingEntry { name: "MARC 8050".into(), value: 3.0 },
            RankingEntry { name: "MARC 8021".into(), value: 2.0 },
        ]
    );

    let kinds = distribute(
        &faults,
        |f| f.get("faultType").map(Value::display).unwrap_or_default(),
        &["Brake", "GPS", "Radio"],
    )
    .unwrap();
    assert_eq!(kinds.iter().map(|b| b.count).sum::<usize>(), faults.len());
    assert_eq!(kinds[2], Bucket { label: "Radio".into(), count: 3 });
}

#[test]
fn ptc_distribution_in_percentage_bins() {
    let locos = locomotives();
    let ptc = |r: &Record| {
        r.get("ptcActivePercentage")
            .and_then(Value::as_number)
            .unwrap_or_default()
    };
    let bins = Bins::percentage(20);
    let buckets = bins.distribute(&locos, ptc).unwrap();
    assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 48);
    assert_eq!(buckets[0].count, 0);
    assert_eq!(buckets[1].count, 0);

    let status = |r: &Record| r.get("status").map(Value::display).unwrap_or_default();
    let wrong = distribute(&locos, status, &["Active", "Idle"]);
    assert!(matches!(wrong, Err(DashError::UnknownBucketLabel(l)) if l == "Maintenance"));
}

#[test]
fn browsers_share_one_collection() {
    let records = std::sync::Arc::new(locomotives());
    let mut active = Browser::new("active", records.clone(), columns());
    let idle = Browser::new("idle", records.clone(), columns());
    active.set_search_term("active");
    assert_eq!(active.view().total_filtered, 16);
    assert_eq!(idle.view().total_filtered, 48);
    assert_eq!(std::sync::Arc::strong_count(&records), 3);
}

#[test]
fn export_uses_descriptors_over_filtered_records() {
    let mut browser = Browser::new("locomotives", locomotives(), columns());
    browser.set_search_term("MARC 8020");
    assert_eq!(
        export_filtered(&browser),
        "Locomotive,\"PTC Active\",Status\n\"MARC 8020\",60%,Active"
    );
}

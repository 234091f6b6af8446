//! Listing evaluations through the client against an in-memory server

mod common;

use common::{client, error_xml, evaluations_xml, segment_u64, server, Row};
use openml_evaluations::frame::to_dicts;
use openml_evaluations::{
    Error, EvaluationListing, EvaluationQuery, HttpResponse, OutputFormat, SortOrder,
};
use serde_json::json;

fn rows(n: u64) -> Vec<Row> {
    (1..=n).map(|i| (i, i % 7 + 1, i % 3 + 1, i as f64 / 1000.0)).collect()
}

#[test]
fn test_object_listing_keyed_by_run() {
    let client = client(server(rows(5), vec![]));
    let listing = client
        .list_evaluations_as(&EvaluationQuery::new("predictive_accuracy"), "object")
        .unwrap();

    let EvaluationListing::Objects(map) = listing else {
        panic!("expected objects");
    };
    assert_eq!(map.run_ids(), &[1, 2, 3, 4, 5]);
    assert_eq!(map.get(3).unwrap().flow_name(), "flow-1");
    assert_eq!(client.transport().calls().len(), 1);
}

#[test]
fn test_dict_and_frame_listings() {
    let client = client(server(rows(4), vec![]));
    let query = EvaluationQuery::new("predictive_accuracy");

    let dicts = client.list_evaluations_as(&query, "dict").unwrap();
    let EvaluationListing::Dicts(dicts) = dicts else {
        panic!("expected dicts");
    };
    assert_eq!(dicts.len(), 4);
    assert_eq!(dicts[0].0, 1);
    assert_eq!(dicts[0].1["data_name"], "iris");

    let frame = client.list_evaluations_as(&query, "dataframe").unwrap();
    assert_eq!(frame.format(), OutputFormat::DataFrame);
    assert_eq!(frame.len(), 4);
}

#[test]
fn test_invalid_format_rejected_before_network() {
    let client = client(server(rows(3), vec![]));
    let err = client
        .list_evaluations_as(&EvaluationQuery::new("predictive_accuracy"), "csv")
        .unwrap_err();

    assert!(matches!(err, Error::InvalidOutputFormat(ref f) if f == "csv"));
    assert!(err.to_string().contains("Invalid output format selected"));
    assert!(client.transport().calls().is_empty());
}

#[test]
fn test_invalid_filters_rejected_before_network() {
    let client = client(server(rows(3), vec![]));
    let query = EvaluationQuery::new("predictive_accuracy").tasks(Vec::<u64>::new());
    assert!(matches!(
        client.list_evaluations(&query),
        Err(Error::InvalidInput(_))
    ));
    assert!(client.transport().calls().is_empty());
}

#[test]
fn test_filters_reach_the_path() {
    let client = client(server(rows(2), vec![]));
    let query = EvaluationQuery::new("area_under_roc_curve")
        .tasks([59, 60])
        .flows([3])
        .tag("study_14")
        .per_fold(false)
        .sort_order(SortOrder::Descending)
        .size(50);
    client.list_evaluations(&query).unwrap();

    assert_eq!(
        client.transport().calls(),
        vec![
            "evaluation/list/function/area_under_roc_curve/limit/50/offset/0/tag/study_14\
             /per_fold/false/task/59,60/flow/3/sort_order/desc"
                .to_string()
        ]
    );
}

#[test]
fn test_size_bounds_result_across_pages() {
    let client = client(server(rows(30), vec![])).with_batch_size(10);
    let map = client
        .list_evaluations(&EvaluationQuery::new("predictive_accuracy").offset(3).size(25))
        .unwrap();

    assert_eq!(map.len(), 25);
    assert_eq!(map.run_ids().first(), Some(&4));
    let pages: Vec<(Option<u64>, Option<u64>)> = client
        .transport()
        .calls()
        .iter()
        .map(|c| (segment_u64(c, "limit"), segment_u64(c, "offset")))
        .collect();
    assert_eq!(
        pages,
        vec![(Some(10), Some(3)), (Some(10), Some(13)), (Some(5), Some(23))]
    );
}

#[test]
fn test_unbounded_listing_stops_on_no_results() {
    let client = client(server(rows(20), vec![])).with_batch_size(10);
    let map = client
        .list_evaluations(&EvaluationQuery::new("predictive_accuracy"))
        .unwrap();
    assert_eq!(map.len(), 20);
    assert_eq!(client.transport().calls().len(), 3);
}

#[test]
fn test_no_results_is_empty_listing() {
    let client = client(server(Vec::new(), vec![]));
    let listing = client
        .list_evaluations_as(&EvaluationQuery::new("predictive_accuracy"), "dataframe")
        .unwrap();
    assert!(listing.is_empty());
}

#[test]
fn test_server_error_propagates() {
    let client = client(|_| HttpResponse::new(412, error_xml(541, "Unknown evaluation measure")));
    let err = client
        .list_evaluations(&EvaluationQuery::new("not_a_measure"))
        .unwrap_err();
    assert!(matches!(err, Error::Server { code: 541, .. }));
}

#[test]
fn test_wrong_root_reports_payload() {
    let client = client(|_| HttpResponse::ok("<oml:runs></oml:runs>"));
    let err = client
        .list_evaluations(&EvaluationQuery::new("predictive_accuracy"))
        .unwrap_err();
    match err {
        Error::MissingTag { expected, payload } => {
            assert_eq!(expected, "oml:evaluations");
            assert!(payload.contains("oml:runs"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_duplicate_runs_collapse() {
    let body = evaluations_xml(&[(1, 1, 1, 0.1), (2, 1, 1, 0.2), (1, 9, 1, 0.3)]);
    let client = client(move |_| HttpResponse::ok(body.clone()));
    let map = client
        .list_evaluations(&EvaluationQuery::new("predictive_accuracy"))
        .unwrap();
    assert_eq!(map.run_ids(), &[1, 2]);
    assert_eq!(map.get(1).unwrap().setup_id(), 9);
}

#[test]
fn test_list_measures() {
    let client = client(|endpoint| {
        assert_eq!(endpoint, "evaluationmeasure/list");
        HttpResponse::ok(
            r#"<oml:evaluation_measures xmlns:oml="http://openml.org/openml">
                 <oml:measures>
                   <oml:measure>area_under_roc_curve</oml:measure>
                   <oml:measure>predictive_accuracy</oml:measure>
                 </oml:measures>
               </oml:evaluation_measures>"#,
        )
    });
    assert_eq!(
        client.list_evaluation_measures().unwrap(),
        vec!["area_under_roc_curve", "predictive_accuracy"]
    );
}

#[test]
fn test_list_measures_wrong_root() {
    let client = client(|_| HttpResponse::ok("<oml:measures/>"));
    assert!(matches!(
        client.list_evaluation_measures(),
        Err(Error::MissingTag { .. })
    ));
}

#[test]
fn test_non_finite_values_agree_across_views() {
    let body = evaluations_xml(&[
        (1, 1, 1, f64::NAN),
        (2, 1, 1, f64::INFINITY),
        (3, 1, 1, f64::NEG_INFINITY),
        (4, 1, 1, 0.5),
    ]);
    let client = client(move |_| HttpResponse::ok(body.clone()));
    let query = EvaluationQuery::new("predictive_accuracy");
    let expected = [json!("NaN"), json!("inf"), json!("-inf"), json!(0.5)];

    let EvaluationListing::Objects(map) = client.list_evaluations_as(&query, "object").unwrap()
    else {
        panic!("expected objects");
    };
    assert!(map.get(1).and_then(|e| e.value()).is_some_and(f64::is_nan));
    assert_eq!(map.get(2).and_then(|e| e.value()), Some(f64::INFINITY));

    let EvaluationListing::Dicts(dicts) = client.list_evaluations_as(&query, "dict").unwrap()
    else {
        panic!("expected dicts");
    };
    for ((_, row), want) in dicts.iter().zip(&expected) {
        assert_eq!(&row["value"], want);
    }

    let EvaluationListing::Frame(batch) = client.list_evaluations_as(&query, "dataframe").unwrap()
    else {
        panic!("expected a frame");
    };
    let frame_rows = to_dicts(&batch).unwrap();
    for (index, evaluation) in map.iter().enumerate() {
        assert_eq!(frame_rows[&index], evaluation.to_row(), "row {index}");
        assert_eq!(&frame_rows[&index]["value"], &expected[index]);
    }
}

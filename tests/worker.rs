//! Integration tests: run requests on the background worker and check the message stream.

use cover_engine::config::{CoverMode, EngineConfig};
use cover_engine::graph::{AdjacencyMatrix, Edge};
use cover_engine::worker::{Request, Response, Worker};
use std::thread;
use std::time::Duration;

fn clique(n: usize) -> AdjacencyMatrix {
    AdjacencyMatrix::generate_random(n, 1.0).unwrap()
}

fn assert_stream(responses: &[Response]) {
    let (last, progress) = responses.split_last().expect("at least the final message");
    assert!(last.is_final());
    let values: Vec<f64> = progress
        .iter()
        .map(|r| match r {
            Response::Progress { value } => *value,
            other => panic!("final message {:?} before the end", other),
        })
        .collect();
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
    assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
}

#[test]
fn exact_cover_stream() {
    let request = Request::ComputeVertexCover {
        matrix: clique(5).to_raw(),
        target_size: 4,
        mode: CoverMode::Exact,
    };
    let responses = Worker::spawn(request, &EngineConfig::default()).join();
    assert_stream(&responses);
    match responses.last() {
        Some(Response::Done { cover: Some(cover) }) => {
            assert_eq!(cover.len(), 4);
            assert!(clique(5).validate_cover(cover));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn exact_cover_too_small() {
    for mode in [CoverMode::Exact, CoverMode::ExactKernelized] {
        let request = Request::ComputeVertexCover { matrix: clique(5).to_raw(), target_size: 3, mode };
        let responses = Worker::spawn(request, &EngineConfig::default()).join();
        assert_stream(&responses);
        assert_eq!(responses.last(), Some(&Response::Done { cover: None }));
    }
}

#[test]
fn approximate_cover_stream() {
    let matrix = AdjacencyMatrix::generate_random(40, 0.3).unwrap();
    let request = Request::ComputeVertexCover { matrix: matrix.to_raw(), target_size: 0, mode: CoverMode::Approximate };
    let responses = Worker::spawn(request, &EngineConfig::default()).join();
    assert_stream(&responses);
    match responses.last() {
        Some(Response::Done { cover: Some(cover) }) => assert!(matrix.validate_cover(cover)),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn make_connected_request() {
    let matrix = AdjacencyMatrix::from_vertices_and_edges(
        &["a", "b", "c", "d"],
        &[Edge::new("a", "b"), Edge::new("c", "d")],
    ).unwrap();
    let responses = Worker::spawn(Request::MakeConnected { matrix: matrix.to_raw() }, &EngineConfig::default()).join();
    match responses.as_slice() {
        [Response::Matrix { matrix }] => {
            let repaired = AdjacencyMatrix::from_raw(matrix).unwrap();
            assert!(repaired.is_connected());
            assert!(repaired.has_edge(&Edge::new("a", "c")));
            assert_eq!(repaired.edge_count(), 3);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn generate_request() {
    let request = Request::GenerateRandomGraph { vertex_count: 10, density: 1.0 };
    let responses = Worker::spawn(request, &EngineConfig::default()).join();
    match responses.as_slice() {
        [Response::Matrix { matrix }] => {
            assert_eq!(matrix.len(), 10);
            assert_eq!(AdjacencyMatrix::from_raw(matrix).unwrap().edge_count(), 45);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn cancel_long_search() {
    // No cover of size 30 exists in a 60-clique, the search would run for ages.
    let request = Request::ComputeVertexCover { matrix: clique(60).to_raw(), target_size: 30, mode: CoverMode::Exact };
    let handle = Worker::spawn(request, &EngineConfig::default());
    let first = handle.id();
    thread::sleep(Duration::from_millis(50));
    handle.cancel();

    let other = Worker::spawn(Request::GenerateRandomGraph { vertex_count: 1, density: 0.0 }, &EngineConfig::default());
    assert_ne!(other.id(), first);
}

#[test]
fn json_request() {
    let json = r#"{"kind": "computeVertexCover", "matrix": {}, "targetSize": 0, "mode": "exact"}"#;
    let request: Request = serde_json::from_str(json).unwrap();
    let responses = Worker::spawn(request, &EngineConfig::default()).join();
    let last = serde_json::to_value(responses.last().unwrap()).unwrap();
    assert_eq!(last, serde_json::json!({"kind": "done", "cover": []}));
}
